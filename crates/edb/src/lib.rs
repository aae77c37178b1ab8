//! Electrolyte database (EDB) client.
//!
//! The EDB stores three kinds of documents:
//!
//! - [`Base`]: a named thermo or reaction configuration template
//! - [`ComponentRecord`]: a chemical species and its property data
//! - [`ReactionRecord`]: an equilibrium reaction and its reference data
//!
//! A caller fetches a base, fetches the components and reactions relevant to
//! its system, and merges them into the base with [`Base::add`].
//! The resulting configuration serializes with serde for a downstream
//! property package.
//!
//! Storage is reached only through the [`Repository`] trait.
//! [`MemoryStore`] is the provided implementation; it can be seeded from the
//! bundled dataset or loaded from a directory of YAML/JSON collections.
//!
//! # Example
//!
//! ```
//! use aquifer_edb::{ElectrolyteDb, MemoryStore, Phase};
//!
//! let db = ElectrolyteDb::new(MemoryStore::bootstrap().unwrap());
//! let components = ["H2O", "Ca[OH]2", "H_+", "OH_-", "Ca_2+"];
//!
//! let mut base = db.get_base("thermo_Liq_Sol_FpcTP").unwrap();
//! for component in db.get_components(components).unwrap() {
//!     base.add(component).unwrap();
//! }
//!
//! let reactions = db.get_reactions(components, [Phase::Liq, Phase::Sol]).unwrap();
//! let names: Vec<_> = reactions.iter().map(|r| r.name.as_str()).collect();
//! assert_eq!(names, ["CaOH2_Ksp", "H2O_Kw"]);
//! ```

mod base;
mod client;
mod component;
mod error;
mod param;
mod phase;
mod reaction;
mod repository;
mod store;

pub use aquifer_core::Param;
pub use base::{
    Base, BaseConfig, BaseUnits, ComponentConfig, PhaseConfig, ReactionConfig, ReactionEntry,
    Record, StateBound, ThermoConfig,
};
pub use client::{DEFAULT_DATABASE, DEFAULT_URL, EdbConfig, ElectrolyteDb};
pub use component::{ComponentKind, ComponentRecord};
pub use error::{EdbError, RecordKind};
pub use param::ParameterValue;
pub use phase::{Phase, PhasePair, PhaseType, UnknownPhase};
pub use reaction::{ReactionParameters, ReactionQuery, ReactionRecord};
pub use repository::Repository;
pub use store::MemoryStore;
