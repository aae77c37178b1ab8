//! Zero-order water treatment unit models.
//!
//! A zero-order unit applies fixed performance parameters from a
//! techno-economic table to an inlet [`WaterStream`]:
//!
//! - [`SisoUnit`] passes its inlet through and reports electricity demand.
//! - [`SidoUnit`] splits its inlet into treated and byproduct streams using
//!   the table's water recovery and solute removal fractions.
//!
//! Both implement [`aquifer_core::Model`].

mod error;
mod sido;
mod siso;
mod stream;

pub use error::UnitModelError;
pub use sido::{SidoOutput, SidoUnit};
pub use siso::{SisoOutput, SisoUnit};
pub use stream::{WATER, WaterStream, water_density};

/// Technology names of the bundled techno-economic tables.
pub mod technology {
    pub const BIOREACTOR: &str = "bioreactor";
    pub const BRINE_CONCENTRATOR: &str = "brine_concentrator";
    pub const PUMP: &str = "pump";
    pub const STATIC_MIXER: &str = "static_mixer";
    pub const STORAGE_TANK: &str = "storage_tank";
    pub const VFA_RECOVERY: &str = "vfa_recovery";

    /// Returns the solutes a technology's inlet must carry.
    ///
    /// The brine concentrator's energy use is tied to total dissolved solids,
    /// so its inlet must list `tds`.
    #[must_use]
    pub fn required_solutes(technology: &str) -> &'static [&'static str] {
        match technology {
            BRINE_CONCENTRATOR => &["tds"],
            _ => &[],
        }
    }
}

/// Options applied when loading a unit's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Use the table's default removal fraction for solutes it does not list.
    ///
    /// When `false`, an unlisted solute in the inlet is an error.
    pub use_default_removal: bool,
}
