use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sales report pipeline.
///
/// Only structural problems surface as errors: a source that cannot be read
/// at all, or a header row in which none of the expected columns appear.
/// Individual malformed rows are never fatal; they are recorded as
/// [`Issue`](crate::models::Issue)s instead.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The source file could not be opened or read from disk.
    #[error("Failed to read source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row contained none of the expected columns.
    #[error("Unrecognized schema in {}: no expected column found among [{headers}]", path.display())]
    SchemaUnrecognized { path: PathBuf, headers: String },

    /// A structural CSV failure (not a single bad row).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
