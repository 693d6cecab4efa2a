//! Error types for shape transformations.

use qdl_primitives::{Date, PanelError};

/// Errors that can occur while reshaping data.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Panel construction error.
    #[error("panel error: {0}")]
    Panel(#[from] PanelError),

    /// Required columns are absent.
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A key column holds a null.
    #[error("null key in column '{column}' at row {row}")]
    NullKey {
        /// Key column.
        column: String,
        /// Zero-based row.
        row: usize,
    },

    /// A time-key value could not be read as a date.
    #[error("cannot read '{value}' in column '{column}' as a date")]
    UnparseableTime {
        /// Time-key column.
        column: String,
        /// Offending value.
        value: String,
    },

    /// A time-key column has a type that cannot hold dates.
    #[error("column '{column}' of type {dtype} cannot be used as a time key")]
    UnsupportedTimeType {
        /// Time-key column.
        column: String,
        /// Its data type.
        dtype: String,
    },

    /// The same (time, entity) pair appears twice under `DuplicatePolicy::Error`.
    #[error("duplicate observation for ({time}, {entity})")]
    Duplicate {
        /// Time key.
        time: Date,
        /// Entity key.
        entity: String,
    },
}
