//! Dataset source trait definitions.

use std::path::PathBuf;

use polars::prelude::*;
use qdl_primitives::{CharQuery, FactorQuery};

/// Errors that can occur while reading a raw dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The resolved file does not exist.
    #[error("file not found: {} (available: {})", .path.display(), format_available(.available))]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
        /// File names actually present in the target directory.
        available: Vec<String>,
    },

    /// IO error while opening or listing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error while parsing the file.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),
}

impl SourceError {
    /// Returns whether this error reports a missing file.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() { "none".to_string() } else { available.join(", ") }
}

/// Reads raw datasets by their coordinates.
///
/// Implementations return the file contents verbatim: no renaming and no type
/// coercion beyond what the file format requires.
pub trait DatasetSource: Send + Sync {
    /// Read one factor-return file.
    ///
    /// # Errors
    /// Returns `SourceError` if the file is missing or unreadable.
    fn read_factors(&self, query: &FactorQuery) -> Result<DataFrame, SourceError>;

    /// Read one characteristics file.
    ///
    /// # Errors
    /// Returns `SourceError` if the file is missing or unreadable.
    fn read_chars(&self, query: &CharQuery) -> Result<DataFrame, SourceError>;
}
