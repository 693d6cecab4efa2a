#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/qdl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod keys;
pub use keys::{Country, DatasetKind, Frequency, ParseKeyError, TimeKey, Vintage, Weighting};

mod query;
pub use query::{CharQuery, FactorQuery};

mod panel;
pub use panel::{PanelError, TimeSeries, WidePanel};

mod figure;
pub use figure::{AlignedObservations, Figure, PlotOptions};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
