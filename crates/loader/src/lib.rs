#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/qdl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{DATA_ROOT_ENV, LoaderConfig};

mod naming;
pub use naming::{chars_file_name, factors_file_name};

mod raw;
pub use raw::RawLoader;
