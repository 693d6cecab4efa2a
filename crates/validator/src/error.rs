//! Error types for validation.

use qdl_primitives::PanelError;
use qdl_stats::StatsError;
use qdl_traits::RenderError;
use qdl_transform::TransformError;

/// Errors that can occur while validating a factor.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// No join keys were given for long-form alignment.
    #[error("long-form validation requires at least one join key")]
    NoJoinKeys,

    /// A table lacks required columns.
    #[error("{table} is missing columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Which input (`user` or `reference`).
        table: &'static str,
        /// Absent columns.
        columns: Vec<String>,
    },

    /// The grouping key is not one of the join keys.
    #[error("group key '{0}' must be one of the join keys")]
    InvalidGroupKey(String),

    /// The value column holds no number at all after coercion.
    #[error("{table} column '{column}' has no numeric values")]
    NoNumericValues {
        /// Which input (`user` or `reference`).
        table: &'static str,
        /// Value column.
        column: String,
    },

    /// The inputs share no keys.
    #[error("no overlap between user and reference: {0}")]
    NoOverlap(String),

    /// The inputs overlap, but every aligned pair has a missing value.
    #[error("user and reference overlap on {rows} rows but every pair has a missing value")]
    AllMissing {
        /// Rows in the overlap.
        rows: usize,
    },

    /// Unknown threshold name.
    #[error("invalid threshold '{name}': expected one of {{{}}}", .allowed.join(", "))]
    UnknownThreshold {
        /// Rejected name.
        name: String,
        /// Accepted names.
        allowed: Vec<&'static str>,
    },

    /// Threshold entry not of the form `name=value`.
    #[error("invalid threshold entry '{0}': expected name=value")]
    InvalidThresholdEntry(String),

    /// Shape transformation error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Metric error.
    #[error("metric error: {0}")]
    Stats(#[from] StatsError),

    /// Panel error.
    #[error("panel error: {0}")]
    Panel(#[from] PanelError),

    /// Rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl ValidationError {
    /// Returns whether this error comes from aligning the two inputs.
    #[must_use]
    pub const fn is_alignment(&self) -> bool {
        matches!(self, Self::NoOverlap(_) | Self::AllMissing { .. })
    }

    /// Returns whether this error reports a schema problem in the inputs.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(
            self,
            Self::NoJoinKeys
                | Self::MissingColumns { .. }
                | Self::InvalidGroupKey(_)
                | Self::NoNumericValues { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::MissingColumns { table: "user", columns: vec!["ret".into()] };
        assert_eq!(err.to_string(), "user is missing columns: ret");
        assert!(err.is_schema());

        let err = ValidationError::AllMissing { rows: 4 };
        assert!(err.to_string().contains("overlap on 4 rows"));
        assert!(err.is_alignment());
    }

    #[test]
    fn overlap_errors_are_distinguished() {
        let none = ValidationError::NoOverlap("no common dates".into());
        let invalid = ValidationError::AllMissing { rows: 2 };
        assert!(none.to_string().starts_with("no overlap"));
        assert!(!invalid.to_string().starts_with("no overlap"));
    }
}
