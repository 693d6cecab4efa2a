//! Validation results.

use std::{collections::BTreeMap, fmt::Write as _};

use qdl_primitives::{Date, Figure};
use qdl_stats::ErrorMetrics;
use serde::Serialize;

/// Which alignment protocol produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Explicit-key join of long frames.
    Long,
    /// Index/column intersection of wide panels.
    Wide,
}

/// Alignment bookkeeping recorded for every validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Alignment protocol.
    pub protocol: Protocol,
    /// Rows in the user input (dates, for a wide panel).
    pub user_rows: usize,
    /// Rows in the reference input (dates, for a wide panel).
    pub reference_rows: usize,
    /// Rows after the join (long) or cells in the intersection (wide).
    pub rows_after_join: usize,
    /// Rows left once pairs with a missing value are dropped.
    pub rows_after_dropna: usize,
    /// Join keys (long protocol).
    pub join_keys: Option<Vec<String>>,
    /// Key used for chronological ordering, if one was found.
    pub time_key: Option<String>,
    /// Key used for the per-entity breakdown, if any.
    pub entity_key: Option<String>,
    /// Whether the aligned data carries an entity dimension.
    pub entity_dimension: bool,
    /// Whether both wide inputs have the same column set (wide protocol).
    pub columns_equal: Option<bool>,
    /// Dates shared by both wide inputs (wide protocol).
    pub common_dates: Option<usize>,
    /// Columns shared by both wide inputs (wide protocol).
    pub common_columns: Option<usize>,
}

/// The result of one validation.
///
/// `mse`, `rmse` and `mae` are percentage-point magnitudes: differences of
/// fractional returns are multiplied by 100 before squaring or averaging.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Mean squared error.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Pearson correlation; `None` if either side is constant.
    pub corr: Option<f64>,
    /// Rank correlation; `None` if either side is constant.
    pub ic: Option<f64>,
    /// Aligned, non-missing pairs used for the aggregate metrics.
    pub n_obs: usize,
    /// First aligned date.
    pub date_start: Option<Date>,
    /// Last aligned date.
    pub date_end: Option<Date>,
    /// Threshold outcome; `None` when no thresholds were given.
    pub pass_thresholds: Option<bool>,
    /// Bounds that failed, when thresholds were given.
    pub failed_thresholds: Option<Vec<&'static str>>,
    /// Metrics per entity, when the data has an entity dimension.
    pub per_factor_metrics: Option<BTreeMap<String, ErrorMetrics>>,
    /// Observation count per entity, when the data has an entity dimension.
    pub per_factor_n_obs: Option<BTreeMap<String, usize>>,
    /// Alignment bookkeeping.
    pub diagnostics: Diagnostics,
    /// Diagnostic chart, if one was requested and a renderer is available.
    #[serde(skip)]
    pub figure: Option<Figure>,
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "nan".to_string(), |v| format!("{v:.3}"))
}

impl ValidationReport {
    /// Aggregate metrics as a bundle.
    #[must_use]
    pub const fn metrics(&self) -> ErrorMetrics {
        ErrorMetrics { mse: self.mse, rmse: self.rmse, mae: self.mae, corr: self.corr, ic: self.ic }
    }

    /// Human-readable summary table.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let span = match (self.date_start, self.date_end) {
            (Some(s), Some(e)) => format!("{s} to {e}"),
            _ => "n/a".to_string(),
        };
        let pass = match self.pass_thresholds {
            Some(true) => "pass",
            Some(false) => "FAIL",
            None => "n/a",
        };

        let _ = writeln!(out, "Observations: {}  Period: {span}  Thresholds: {pass}", self.n_obs);
        let _ = writeln!(
            out,
            "{:<20} {:>8} {:>10} {:>10} {:>10} {:>8} {:>8}",
            "Factor", "N", "MSE", "RMSE", "MAE", "Corr", "IC"
        );
        let _ = writeln!(out, "{:-<20} {:-^8} {:-^10} {:-^10} {:-^10} {:-^8} {:-^8}", "", "", "", "", "", "", "");
        if let (Some(per), Some(counts)) = (&self.per_factor_metrics, &self.per_factor_n_obs) {
            for (name, m) in per {
                let _ = writeln!(
                    out,
                    "{:<20} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>8} {:>8}",
                    name,
                    counts.get(name).copied().unwrap_or_default(),
                    m.mse,
                    m.rmse,
                    m.mae,
                    fmt_opt(m.corr),
                    fmt_opt(m.ic)
                );
            }
        }
        let _ = writeln!(
            out,
            "{:<20} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>8} {:>8}",
            "TOTAL",
            self.n_obs,
            self.mse,
            self.rmse,
            self.mae,
            fmt_opt(self.corr),
            fmt_opt(self.ic)
        );
        if let Some(failed) = self.failed_thresholds.as_ref().filter(|f| !f.is_empty()) {
            let _ = writeln!(out, "Failed thresholds: {}", failed.join(", "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(pass: Option<bool>) -> ValidationReport {
        let m = ErrorMetrics { mse: 0.25, rmse: 0.5, mae: 0.4, corr: Some(0.9), ic: None };
        ValidationReport {
            mse: m.mse,
            rmse: m.rmse,
            mae: m.mae,
            corr: m.corr,
            ic: m.ic,
            n_obs: 10,
            date_start: Date::from_ymd_opt(2020, 1, 31),
            date_end: Date::from_ymd_opt(2020, 10, 31),
            pass_thresholds: pass,
            failed_thresholds: pass.map(|p| if p { vec![] } else { vec!["ic_min"] }),
            per_factor_metrics: Some(BTreeMap::from([("at_gr1".to_string(), m)])),
            per_factor_n_obs: Some(BTreeMap::from([("at_gr1".to_string(), 10)])),
            diagnostics: Diagnostics {
                protocol: Protocol::Wide,
                user_rows: 10,
                reference_rows: 12,
                rows_after_join: 10,
                rows_after_dropna: 10,
                join_keys: None,
                time_key: Some("date".into()),
                entity_key: Some("factor".into()),
                entity_dimension: true,
                columns_equal: Some(false),
                common_dates: Some(10),
                common_columns: Some(1),
            },
            figure: None,
        }
    }

    #[test]
    fn summary_lists_entities_and_failures() {
        let text = report(Some(false)).summary();
        assert!(text.contains("at_gr1"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("Failed thresholds: ic_min"));
        assert!(text.contains("2020-01-31 to 2020-10-31"));
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(report(None)).unwrap();
        assert_eq!(json["n_obs"], 10);
        assert!(json["pass_thresholds"].is_null());
        assert!(json["ic"].is_null());
        assert_eq!(json["diagnostics"]["protocol"], "wide");
        assert_eq!(json["per_factor_metrics"]["at_gr1"]["rmse"], 0.5);
        assert!(json.get("figure").is_none());
    }

    #[test]
    fn metrics_round_trip() {
        let r = report(None);
        assert_eq!(r.metrics().corr, Some(0.9));
        assert_eq!(r.metrics().mae, 0.4);
    }
}
