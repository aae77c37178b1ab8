use aquifer_core::ConstraintError;
use aquifer_costing::CostingError;
use thiserror::Error;

/// Errors that may occur when building or calling a zero-order unit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnitModelError {
    /// A solute in the inlet has no removal fraction and defaults are disabled.
    #[error("no removal fraction for solute `{solute}` in `{technology}`")]
    MissingRemoval { technology: String, solute: String },

    /// A solute the technology depends on is absent from the inlet.
    #[error("`{technology}` requires solute `{solute}` in its inlet")]
    MissingSolute { technology: String, solute: String },

    /// The inlet stream carries no water.
    #[error("inlet stream has no H2O flow")]
    MissingWater,

    /// A component mass flow is negative or not a number.
    #[error("invalid mass flow for `{component}`")]
    InvalidFlow {
        component: String,
        #[source]
        source: ConstraintError,
    },

    /// Loading the unit's parameters failed.
    #[error(transparent)]
    Costing(#[from] CostingError),
}
