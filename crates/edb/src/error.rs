use std::{fmt, path::PathBuf};

use aquifer_core::units::UnitError;
use thiserror::Error;

/// The kind of document a lookup or validation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Base,
    Component,
    Reaction,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Base => "base",
            RecordKind::Component => "component",
            RecordKind::Reaction => "reaction",
        })
    }
}

/// Errors that may occur when querying the electrolyte database or building
/// configurations from it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EdbError {
    /// No document with the given name exists.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: RecordKind, name: String },

    /// The record cannot be merged into this kind of base.
    ///
    /// For example, a component added to a reaction base.
    #[error("cannot add {kind} `{name}` to base `{base}`")]
    IncompatibleRecord {
        kind: RecordKind,
        name: String,
        base: String,
    },

    /// A document failed validation.
    #[error("invalid {kind} `{name}`: {reason}")]
    InvalidRecord {
        kind: RecordKind,
        name: String,
        reason: String,
    },

    /// The database at `url` could not be reached or opened.
    #[error("cannot connect to `{url}`: {reason}")]
    Connection { url: String, reason: String },

    /// Reading a collection file failed.
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file or bundled collection is not valid YAML/JSON for its schema.
    #[error("failed to parse {collection} collection")]
    Parse {
        collection: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A parameter carries a unit of the wrong dimension.
    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl EdbError {
    pub(crate) fn not_found(kind: RecordKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn invalid(
        kind: RecordKind,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRecord {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}
