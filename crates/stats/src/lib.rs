#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/qdl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error_metrics;
pub use error_metrics::{PCT_SCALE, mae, mse, pct_differences, rmse};

mod correlation;
pub use correlation::{average_ranks, has_variation, pearson, spearman};

mod metrics;
pub use metrics::ErrorMetrics;

mod error;
pub use error::StatsError;
