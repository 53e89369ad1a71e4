use std::{io, path::PathBuf};

use thiserror::Error;

use crate::schema::Layer;

/// Failures that abort a profiling call.
///
/// Sampling shortfalls (empty sample, no unique key, no date in the file
/// name) are not errors; they are reported as
/// [`Diagnostic`](crate::profile::Diagnostic)s on the returned profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The source file could not be opened or read.
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bounded prefix could not be parsed as delimited records.
    #[error("Malformed delimited data in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A field could not be decoded with the configured encoding.
    #[error("Failed to decode {path:?} as {encoding}")]
    Encoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// A reserved metadata column shares its name with a data column.
    #[error("Metadata column '{column}' collides with a data column in the {layer} schema")]
    SchemaConflict { column: String, layer: Layer },

    /// Two differently written source columns normalize to the same identifier.
    #[error("Column '{0}' appears more than once after normalization")]
    DuplicateColumn(String),

    #[error("Unique key column '{0}' is not part of the column set")]
    UnknownKeyColumn(String),

    #[error("Column '{0}' has no type profile")]
    MissingProfile(String),

    /// Raised only when strict key discovery was requested.
    #[error("No column prefix uniquely identifies the {rows} sampled row(s)")]
    NoUniqueKey { rows: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProfileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProfileError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        ProfileError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for profiling operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
