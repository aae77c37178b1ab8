use aquifer_core::{ConstraintError, units::UnitError};
use thiserror::Error;

/// Errors that may occur when building an ion property package or state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IonError {
    /// The solvent was listed as a solute.
    #[error("`H2O` is the solvent and cannot be added as a solute")]
    SolventAsSolute,

    /// A component has no molecular weight.
    #[error("no molecular weight for `{component}`")]
    MissingMolecularWeight { component: String },

    /// A solute has no charge.
    #[error("no charge for solute `{solute}`")]
    MissingCharge { solute: String },

    /// A molecular weight carries a unit that is not a molar mass.
    #[error("invalid units for `{component}`")]
    UnitMismatch {
        component: String,
        #[source]
        source: UnitError,
    },

    /// A parameter violates its sign constraint.
    #[error("invalid `{name}`")]
    InvalidParameter {
        name: String,
        #[source]
        source: ConstraintError,
    },

    /// A state names a component the package does not define.
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    /// A component mole flow is negative or not a number.
    #[error("invalid mole flow for `{component}`")]
    InvalidFlow {
        component: String,
        #[source]
        source: ConstraintError,
    },

    /// The state carries no solvent.
    #[error("state has no H2O flow")]
    MissingWater,

    /// A state variable lies outside the range the package supports.
    #[error("{name} {value} is outside [{min}, {max}]")]
    OutOfBounds {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// The net charge flow of a state exceeds the tolerance.
///
/// `net_charge` is `Σ z_j·n_j` over the solutes, in mol/s.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("electroneutrality violated: net charge flow {net_charge} exceeds tolerance {tolerance}")]
pub struct ElectroneutralityError {
    pub net_charge: f64,
    pub tolerance: f64,
}
