//! Error types for metric computation.

/// Errors that can occur while computing metrics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Non-finite input (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}
