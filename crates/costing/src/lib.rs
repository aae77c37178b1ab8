//! Techno-economic parameter tables for zero-order unit models.
//!
//! Each unit process (pump, bioreactor, brine concentrator, ...) has a YAML
//! table giving its electricity intensity, a power-law capital cost curve,
//! its water recovery, and the fraction of each solute it removes.
//! Tables are validated on load and exposed both as the on-disk
//! [`TechnoEconomicTable`] and as typed [`UnitParameters`].

mod cost;
mod database;
mod error;
mod table;
mod technology;

pub use cost::{CapitalCost, CapitalCostFunction};
pub use database::TechnoEconomicDb;
pub use error::CostingError;
pub use table::{RemovalParameter, SpecificCapitalCost, TechnoEconomicTable, UnitParameters};
pub use technology::{DEFAULT_SUBTYPE, Technology};
