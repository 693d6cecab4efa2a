//! Figure rendering trait definitions.

use std::fmt;

use qdl_primitives::{AlignedObservations, Figure, PlotOptions};

/// Errors that can occur while rendering a figure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Nothing to draw.
    #[error("empty input data")]
    EmptyData,

    /// Backend drawing failure.
    #[error("drawing error: {0}")]
    Drawing(String),
}

/// An optional plotting capability.
///
/// The validator holds at most one renderer. Charts are side artifacts of a
/// validation and never affect its numbers.
pub trait FigureRenderer: fmt::Debug + Send + Sync {
    /// Render aligned observations into a figure.
    ///
    /// # Errors
    /// Returns `RenderError` if the backend fails.
    fn render(
        &self,
        observations: &AlignedObservations,
        options: &PlotOptions,
    ) -> Result<Figure, RenderError>;

    /// Returns the name of this renderer.
    fn name(&self) -> &str;
}
