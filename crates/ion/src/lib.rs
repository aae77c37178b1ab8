//! Property package for water carrying dissolved ions.
//!
//! An [`IonPropertyPackage`] holds per-solute data (molecular weight, charge,
//! Stokes radius, diffusivity) and solvent properties. Calling it with an
//! [`IonState`] of component mole flows, temperature, and pressure yields
//! [`IonProperties`]: mass and mole fractions, mass and molar concentrations,
//! molalities, activity coefficients, and the van 't Hoff osmotic pressure.
//!
//! Electroneutrality is checked separately with
//! [`IonProperties::assert_electroneutrality`].
//!
//! # Example
//!
//! ```
//! use aquifer_core::Model;
//! use aquifer_ion::{IonPropertyPackage, IonState, MolarFlow, Solute};
//! use uom::si::{
//!     catalytic_activity::mole_per_second,
//!     f64::{MolarMass, Pressure, ThermodynamicTemperature},
//!     molar_mass::kilogram_per_mole,
//!     pressure::pascal,
//!     thermodynamic_temperature::kelvin,
//! };
//!
//! let mw = |value| MolarMass::new::<kilogram_per_mole>(value);
//! let mut package = IonPropertyPackage::default();
//! package.add_solute("Na_+", Solute::new(mw(23e-3), 1).unwrap()).unwrap();
//! package.add_solute("Cl_-", Solute::new(mw(35e-3), -1).unwrap()).unwrap();
//!
//! let mut state = IonState::new(
//!     ThermodynamicTemperature::new::<kelvin>(298.15),
//!     Pressure::new::<pascal>(101_325.0),
//! )
//! .unwrap();
//! for (component, flow) in [("H2O", 50.0), ("Na_+", 0.5), ("Cl_-", 0.5)] {
//!     state.insert(component, MolarFlow::new::<mole_per_second>(flow)).unwrap();
//! }
//!
//! let properties = package.call(&state).unwrap();
//! assert!(properties.assert_electroneutrality(None).is_ok());
//! ```

mod activity;
mod error;
mod package;
mod state;

pub use activity::ActivityCoefficientModel;
pub use error::{ElectroneutralityError, IonError};
pub use package::{IonConfig, IonPropertyPackage, Solute};
pub use state::{IonProperties, IonState, MolarFlow, SOLVENT};
