//! The comparison entry point.

use std::collections::BTreeMap;

use ndarray::ArrayView1;
use polars::prelude::DataFrame;
use qdl_primitives::{PlotOptions, WidePanel};
use qdl_stats::ErrorMetrics;
use qdl_traits::FigureRenderer;
use tracing::{info, warn};

use crate::{
    LongValidation, Thresholds, ValidationError, ValidationReport,
    align::{Alignment, align_long, align_wide},
};

/// Opt-in extras for one validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOptions {
    /// Bounds evaluated against the aggregate metrics.
    pub thresholds: Option<Thresholds>,
    /// Chart request; needs a renderer on the validator.
    pub plot: Option<PlotOptions>,
}

impl ValidationOptions {
    /// No thresholds, no chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `thresholds`.
    #[must_use]
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Request a chart.
    #[must_use]
    pub fn plot(mut self, plot: PlotOptions) -> Self {
        self.plot = Some(plot);
        self
    }
}

/// Compares user data with reference data.
///
/// Charting is a capability injected through [`Validator::with_renderer`];
/// a validator without a renderer still computes every metric.
#[derive(Debug, Default)]
pub struct Validator {
    renderer: Option<Box<dyn FigureRenderer>>,
}

impl Validator {
    /// A validator without a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator that renders charts with `renderer`.
    #[must_use]
    pub fn with_renderer(renderer: Box<dyn FigureRenderer>) -> Self {
        Self { renderer: Some(renderer) }
    }

    /// Whether charts can be produced.
    #[must_use]
    pub const fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Compare two long frames joined on explicit keys.
    ///
    /// # Arguments
    /// * `user` - Frame holding the user's values
    /// * `reference` - Frame holding the reference values
    /// * `spec` - Join keys, value column and optional grouping key
    /// * `options` - Thresholds and chart request
    ///
    /// # Returns
    /// Aggregate metrics, per-entity metrics when an entity key exists, and diagnostics.
    ///
    /// # Errors
    /// Returns a schema error if a key or the value column is absent or non-numeric,
    /// and an alignment error if the join is empty or every joined pair has a
    /// missing value.
    pub fn validate_long(
        &self,
        user: &DataFrame,
        reference: &DataFrame,
        spec: &LongValidation,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, ValidationError> {
        let alignment = align_long(user, reference, spec)?;
        self.finish(alignment, options)
    }

    /// Compare two wide panels over their shared dates and columns.
    ///
    /// Every shared column becomes an entity of the per-factor breakdown.
    ///
    /// # Errors
    /// Returns an alignment error if the panels share no dates, no columns, or
    /// no pair of non-missing values.
    pub fn validate_wide(
        &self,
        user: &WidePanel,
        reference: &WidePanel,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, ValidationError> {
        let alignment = align_wide(user, reference)?;
        self.finish(alignment, options)
    }

    fn finish(
        &self,
        alignment: Alignment,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, ValidationError> {
        let Alignment { observations, diagnostics } = alignment;
        let metrics = ErrorMetrics::compute(
            ArrayView1::from(observations.user.as_slice()),
            ArrayView1::from(observations.reference.as_slice()),
        )?;

        let (per_factor_metrics, per_factor_n_obs) = match &observations.entity {
            Some(entity) => {
                let mut groups: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
                for ((e, u), r) in entity.iter().zip(&observations.user).zip(&observations.reference) {
                    let group = groups.entry(e.as_str()).or_default();
                    group.0.push(*u);
                    group.1.push(*r);
                }
                let mut per = BTreeMap::new();
                let mut counts = BTreeMap::new();
                for (name, (u, r)) in groups {
                    let m = ErrorMetrics::compute(
                        ArrayView1::from(u.as_slice()),
                        ArrayView1::from(r.as_slice()),
                    )?;
                    per.insert(name.to_string(), m);
                    counts.insert(name.to_string(), u.len());
                }
                (Some(per), Some(counts))
            }
            None => (None, None),
        };

        let thresholds = options.thresholds.filter(|t| !t.is_empty());
        let failed_thresholds = thresholds.map(|t| t.failures(&metrics));
        let pass_thresholds = failed_thresholds.as_ref().map(Vec::is_empty);

        let figure = match (&options.plot, &self.renderer) {
            (Some(plot), Some(renderer)) => Some(renderer.render(&observations, plot)?),
            (Some(_), None) => {
                warn!("chart requested but the validator has no renderer");
                None
            }
            (None, _) => None,
        };

        let dates = observations.time.as_deref().unwrap_or_default();
        let report = ValidationReport {
            mse: metrics.mse,
            rmse: metrics.rmse,
            mae: metrics.mae,
            corr: metrics.corr,
            ic: metrics.ic,
            n_obs: observations.len(),
            date_start: dates.iter().min().copied(),
            date_end: dates.iter().max().copied(),
            pass_thresholds,
            failed_thresholds,
            per_factor_metrics,
            per_factor_n_obs,
            diagnostics,
            figure,
        };
        info!(
            n_obs = report.n_obs,
            mse = report.mse,
            mae = report.mae,
            corr = ?report.corr,
            pass = ?report.pass_thresholds,
            "validation complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};
    use polars::prelude::*;
    use qdl_primitives::Date;

    use super::*;

    fn d(m: u32) -> Date {
        Date::from_ymd_opt(2021, m, 28).unwrap()
    }

    fn panel(values: Array2<f64>) -> WidePanel {
        let index = (1..=values.nrows() as u32).map(d).collect();
        let columns = (0..values.ncols()).map(|j| format!("f{j}")).collect();
        WidePanel::new(index, columns, values).unwrap()
    }

    #[test]
    fn self_validation_is_exact() {
        let p = panel(array![[0.01, 0.02], [-0.01, 0.03], [0.02, -0.02]]);
        let report = Validator::new().validate_wide(&p, &p, &ValidationOptions::new()).unwrap();

        assert_eq!(report.mse, 0.0);
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.mae, 0.0);
        assert_relative_eq!(report.corr.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(report.n_obs, 6);
        assert_eq!(report.date_start, Some(d(1)));
        assert_eq!(report.date_end, Some(d(3)));
        assert_eq!(report.pass_thresholds, None);
        assert_eq!(report.diagnostics.columns_equal, Some(true));
    }

    #[test]
    fn per_entity_offset() {
        let delta = 0.005;
        let reference = panel(array![[0.01, 0.02], [-0.01, 0.03], [0.02, -0.02]]);
        let mut shifted = reference.values().clone();
        shifted.column_mut(1).mapv_inplace(|v| v + delta);
        let user = panel(shifted);

        let report =
            Validator::new().validate_wide(&user, &reference, &ValidationOptions::new()).unwrap();
        let per = report.per_factor_metrics.as_ref().unwrap();
        assert_eq!(per["f0"].mae, 0.0);
        assert_relative_eq!(per["f1"].mae, 100.0 * delta, epsilon = 1e-9);
        assert_eq!(report.per_factor_n_obs.as_ref().unwrap()["f1"], 3);
    }

    #[test]
    fn constant_series_fails_correlation_bound() {
        let p = panel(array![[0.01], [0.01], [0.01]]);
        let thresholds = Thresholds { corr_min: Some(0.5), mae_max: Some(1.0), ..Thresholds::default() };
        let report = Validator::new()
            .validate_wide(&p, &p, &ValidationOptions::new().thresholds(thresholds))
            .unwrap();

        assert_eq!(report.corr, None);
        assert_eq!(report.pass_thresholds, Some(false));
        assert_eq!(report.failed_thresholds, Some(vec!["corr_min"]));
    }

    #[test]
    fn empty_thresholds_leave_pass_undefined() {
        let p = panel(array![[0.01], [0.02]]);
        let options = ValidationOptions::new().thresholds(Thresholds::default());
        let report = Validator::new().validate_wide(&p, &p, &options).unwrap();
        assert_eq!(report.pass_thresholds, None);
    }

    #[test]
    fn long_disjoint_dates_fail() {
        let user = df!("date" => ["2020-01-31", "2020-02-29"], "ret" => [0.1, 0.2]).unwrap();
        let reference = df!("date" => ["2021-01-31"], "ret" => [0.1]).unwrap();
        let err = Validator::new()
            .validate_long(
                &user,
                &reference,
                &LongValidation::new(["date"], "ret"),
                &ValidationOptions::new(),
            )
            .unwrap_err();
        assert!(err.is_alignment());
        assert!(err.to_string().starts_with("no overlap"));
    }

    #[test]
    fn plot_without_renderer_is_skipped() {
        let p = panel(array![[0.01], [0.02]]);
        let options = ValidationOptions::new().plot(PlotOptions::default());
        let report = Validator::new().validate_wide(&p, &p, &options).unwrap();
        assert!(report.figure.is_none());
        assert!(report.summary().contains("TOTAL"));
    }
}
