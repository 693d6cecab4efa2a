//! Pass/fail bounds on aggregate metrics.

use qdl_stats::ErrorMetrics;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Optional bounds on the aggregate metrics.
///
/// A correlation bound whose metric is undefined counts as failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Upper bound on MSE (percentage points squared).
    pub mse_max: Option<f64>,
    /// Upper bound on RMSE (percentage points).
    pub rmse_max: Option<f64>,
    /// Upper bound on MAE (percentage points).
    pub mae_max: Option<f64>,
    /// Lower bound on Pearson correlation.
    pub corr_min: Option<f64>,
    /// Lower bound on rank correlation.
    pub ic_min: Option<f64>,
}

impl Thresholds {
    /// Accepted bound names.
    pub const NAMES: [&'static str; 5] = ["mse_max", "rmse_max", "mae_max", "corr_min", "ic_min"];

    /// True if no bound is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mse_max.is_none()
            && self.rmse_max.is_none()
            && self.mae_max.is_none()
            && self.corr_min.is_none()
            && self.ic_min.is_none()
    }

    /// Set one bound by name.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownThreshold` for an unknown name.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ValidationError> {
        let slot = match name {
            "mse_max" => &mut self.mse_max,
            "rmse_max" => &mut self.rmse_max,
            "mae_max" => &mut self.mae_max,
            "corr_min" => &mut self.corr_min,
            "ic_min" => &mut self.ic_min,
            other => {
                return Err(ValidationError::UnknownThreshold {
                    name: other.to_string(),
                    allowed: Self::NAMES.to_vec(),
                });
            }
        };
        *slot = Some(value);
        Ok(())
    }

    /// Parse `name=value` entries.
    ///
    /// # Errors
    /// Returns `ValidationError` for malformed entries or unknown names.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut thresholds = Self::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .and_then(|(n, v)| v.trim().parse::<f64>().ok().map(|v| (n.trim(), v)))
                .ok_or_else(|| ValidationError::InvalidThresholdEntry(pair.to_string()))?;
            thresholds.set(name, value)?;
        }
        Ok(thresholds)
    }

    /// Names of the bounds `metrics` violates.
    #[must_use]
    pub fn failures(&self, metrics: &ErrorMetrics) -> Vec<&'static str> {
        let upper = |bound: Option<f64>, value: f64| bound.is_some_and(|b| value > b);
        let lower = |bound: Option<f64>, value: Option<f64>| {
            bound.is_some_and(|b| value.is_none_or(|v| v < b))
        };

        let mut failed = Vec::new();
        if upper(self.mse_max, metrics.mse) {
            failed.push("mse_max");
        }
        if upper(self.rmse_max, metrics.rmse) {
            failed.push("rmse_max");
        }
        if upper(self.mae_max, metrics.mae) {
            failed.push("mae_max");
        }
        if lower(self.corr_min, metrics.corr) {
            failed.push("corr_min");
        }
        if lower(self.ic_min, metrics.ic) {
            failed.push("ic_min");
        }
        failed
    }

    /// True if `metrics` satisfies every bound.
    #[must_use]
    pub fn evaluate(&self, metrics: &ErrorMetrics) -> bool {
        self.failures(metrics).is_empty()
    }
}
