#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/qdl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod align;
pub use align::LongValidation;

mod report;
pub use report::{Diagnostics, Protocol, ValidationReport};

mod thresholds;
pub use thresholds::Thresholds;

mod validator;
pub use validator::{ValidationOptions, Validator};

#[cfg(feature = "plot")]
mod plot;
#[cfg(feature = "plot")]
pub use plot::SvgRenderer;

mod error;
pub use error::ValidationError;
