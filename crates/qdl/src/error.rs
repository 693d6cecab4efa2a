//! Error types for the facade.

use qdl_primitives::{PanelError, ParseKeyError};
use qdl_traits::SourceError;
use qdl_transform::TransformError;
use qdl_validator::ValidationError;

/// Errors that can occur in facade operations.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// A request parameter is outside its closed enumeration.
    #[error("configuration error: {0}")]
    Config(#[from] ParseKeyError),

    /// The dataset could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Reshaping failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Panel selection failed.
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// Validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A requested projection names absent columns.
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A single series was given without a usable name.
    #[error(
        "cannot infer the factor name: the series has no label; pass factor_name explicitly"
    )]
    AmbiguousIdentity,

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl FacadeError {
    /// Returns whether this error names absent columns in a caller-supplied table or request.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        match self {
            Self::MissingColumns(_)
            | Self::Panel(PanelError::MissingColumns(_))
            | Self::Transform(TransformError::MissingColumns(_)) => true,
            Self::Validation(e) => e.is_schema(),
            _ => false,
        }
    }

    /// Returns whether this error comes from aligning user and reference data.
    #[must_use]
    pub const fn is_alignment(&self) -> bool {
        matches!(self, Self::Validation(e) if e.is_alignment())
    }

    /// Returns whether the requested file does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Source(e) if e.is_not_found())
    }
}
