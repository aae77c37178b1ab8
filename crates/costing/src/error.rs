use std::path::PathBuf;

use aquifer_core::{ConstraintError, units::UnitError};
use thiserror::Error;

/// Errors that may occur when loading or validating techno-economic tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CostingError {
    /// A required key is absent from a table.
    ///
    /// Nested keys are reported with dotted paths, such as
    /// `specific_capital_cost_flow_vol_inlet.cap_basis_par`.
    #[error("missing required key `{key}`")]
    MissingKey { key: String },

    /// A field carries a unit of the wrong dimension, or one that is not recognized.
    #[error("invalid units for `{key}`")]
    UnitMismatch {
        key: String,
        #[source]
        source: UnitError,
    },

    /// A fraction lies outside `[0, 1]`.
    #[error("`{key}` must lie in [0, 1], got {value}")]
    OutOfRange { key: String, value: f64 },

    /// A cost-function parameter that must be strictly positive and finite is not.
    #[error("`{key}` must be strictly positive")]
    NotPositive {
        key: String,
        #[source]
        source: ConstraintError,
    },

    /// A parameter that must be non-negative and finite is not.
    #[error("`{key}` must not be negative")]
    Negative {
        key: String,
        #[source]
        source: ConstraintError,
    },

    /// A parameter is infinite or `NaN`.
    #[error("`{key}` must be finite, got {value}")]
    NotFinite { key: String, value: f64 },

    /// No table exists for the technology.
    #[error("unknown technology `{0}`")]
    UnknownTechnology(String),

    /// The technology has no table for the requested subtype.
    #[error("technology `{technology}` has no subtype `{subtype}`")]
    UnknownSubtype { technology: String, subtype: String },

    /// A table file could not be read.
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table file is not valid YAML, or does not match the table schema.
    #[error("failed to parse table for `{technology}`")]
    Yaml {
        technology: String,
        #[source]
        source: serde_yaml::Error,
    },
}
