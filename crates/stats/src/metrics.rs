//! The metric bundle reported per comparison.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::{StatsError, mae, mse, pearson, spearman};

/// Error and correlation metrics for one aligned pair of series.
///
/// `mse`, `rmse` and `mae` are in percentage points (see [`crate::PCT_SCALE`]).
/// `corr` and `ic` are `None` when either series is constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Pearson correlation.
    pub corr: Option<f64>,
    /// Rank correlation (information coefficient).
    pub ic: Option<f64>,
}

impl ErrorMetrics {
    /// Compute every metric for `user` against `reference`.
    ///
    /// # Errors
    /// Returns `StatsError` if lengths differ, inputs are empty or non-finite.
    pub fn compute(
        user: ArrayView1<'_, f64>,
        reference: ArrayView1<'_, f64>,
    ) -> Result<Self, StatsError> {
        let mse = mse(user, reference)?;
        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae: mae(user, reference)?,
            corr: pearson(user, reference),
            ic: spearman(user, reference),
        })
    }
}
