#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/qdl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod columns;
pub use columns::{
    entity_keys, is_temporal, numeric_values, parse_date, require_columns, time_keys,
};

mod reshape;
pub use reshape::{
    CHAR_ENTITY_COL, DuplicatePolicy, FACTOR_ENTITY_COL, FACTOR_TIME_COL, FACTOR_VALUE_COL,
    frame_to_panel, panel_to_frame, to_long, to_wide, to_wide_chars, to_wide_factors,
};

mod error;
pub use error::TransformError;
