//! On-disk file naming.

use qdl_primitives::{CharQuery, FactorQuery};

/// File name of a factor-return dataset.
///
/// The brackets are literal: `[usa]_[all_factors]_[monthly]_[ew].csv`.
#[must_use]
pub fn factors_file_name(query: &FactorQuery) -> String {
    format!(
        "[{}]_[{}]_[{}]_[{}].csv",
        query.country,
        query.dataset.file_token(),
        query.frequency,
        query.weighting
    )
}

/// File name of a characteristics dataset, e.g. `jkp_2020-_usa.parquet`.
#[must_use]
pub fn chars_file_name(query: &CharQuery) -> String {
    format!("jkp_{}_{}.parquet", query.vintage, query.country)
}
