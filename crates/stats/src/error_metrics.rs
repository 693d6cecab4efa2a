//! Percentage-point error metrics.

use ndarray::{Array1, ArrayView1, Zip};

use crate::StatsError;

/// Multiplier applied to differences before squaring or averaging.
///
/// Inputs are fractional returns; errors are reported in percentage points.
pub const PCT_SCALE: f64 = 100.0;

fn check_pair(user: &ArrayView1<'_, f64>, reference: &ArrayView1<'_, f64>) -> Result<(), StatsError> {
    if user.len() != reference.len() {
        return Err(StatsError::DimensionMismatch { expected: user.len(), actual: reference.len() });
    }
    if user.is_empty() {
        return Err(StatsError::EmptyData);
    }
    if user.iter().chain(reference.iter()).any(|v| !v.is_finite()) {
        return Err(StatsError::NumericalInstability("non-finite input".to_string()));
    }
    Ok(())
}

/// Differences `(user - reference) * PCT_SCALE`.
///
/// # Errors
/// Returns `StatsError` if lengths differ, inputs are empty or non-finite.
pub fn pct_differences(
    user: ArrayView1<'_, f64>,
    reference: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, StatsError> {
    check_pair(&user, &reference)?;
    Ok(Zip::from(&user).and(&reference).map_collect(|u, r| (u - r) * PCT_SCALE))
}

/// Mean squared percentage-point difference.
///
/// # Errors
/// Returns `StatsError` if lengths differ, inputs are empty or non-finite.
pub fn mse(user: ArrayView1<'_, f64>, reference: ArrayView1<'_, f64>) -> Result<f64, StatsError> {
    let diff = pct_differences(user, reference)?;
    Ok(diff.mapv(|d| d * d).mean().unwrap_or(0.0))
}

/// Root mean squared percentage-point difference.
///
/// # Errors
/// Returns `StatsError` if lengths differ, inputs are empty or non-finite.
pub fn rmse(user: ArrayView1<'_, f64>, reference: ArrayView1<'_, f64>) -> Result<f64, StatsError> {
    mse(user, reference).map(f64::sqrt)
}

/// Mean absolute percentage-point difference.
///
/// # Errors
/// Returns `StatsError` if lengths differ, inputs are empty or non-finite.
pub fn mae(user: ArrayView1<'_, f64>, reference: ArrayView1<'_, f64>) -> Result<f64, StatsError> {
    let diff = pct_differences(user, reference)?;
    Ok(diff.mapv(f64::abs).mean().unwrap_or(0.0))
}
