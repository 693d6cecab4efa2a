//! Long <-> wide reshaping.

use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;
use polars::prelude::*;
use qdl_primitives::{Date, TimeKey, WidePanel};
use tracing::{debug, warn};

use crate::{TransformError, entity_keys, numeric_values, require_columns, time_keys};

/// Time column of published factor files.
pub const FACTOR_TIME_COL: &str = "date";
/// Entity column of published factor files.
pub const FACTOR_ENTITY_COL: &str = "name";
/// Return column of published factor files.
pub const FACTOR_VALUE_COL: &str = "ret";
/// Entity column of published characteristics files.
pub const CHAR_ENTITY_COL: &str = "id";

/// How to resolve two rows mapping to the same (time, entity) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first non-missing value in row order. A missing earlier value
    /// does not block a later present one.
    #[default]
    First,
    /// Fail on the first repeated pair.
    Error,
}

/// Pivot a long frame into a date x entity panel.
///
/// # Arguments
/// * `df` - Long-form frame
/// * `time_col` - Column holding the time key
/// * `entity_col` - Column holding the entity key
/// * `value_col` - Column holding the values
/// * `policy` - Collision handling for repeated (time, entity) pairs
///
/// # Errors
/// Returns `TransformError` if a column is missing, a key is null or
/// unreadable, or a duplicate is found under `DuplicatePolicy::Error`.
pub fn to_wide(
    df: &DataFrame,
    time_col: &str,
    entity_col: &str,
    value_col: &str,
    policy: DuplicatePolicy,
) -> Result<WidePanel, TransformError> {
    require_columns(df, &[time_col, entity_col, value_col])?;

    let times = time_keys(df.column(time_col)?)?;
    let entities = entity_keys(df.column(entity_col)?)?;
    let values = numeric_values(df.column(value_col)?)?;

    let mut rows: Vec<(Date, String, Option<f64>)> = Vec::with_capacity(df.height());
    for (row, ((t, e), v)) in times.into_iter().zip(entities).zip(values).enumerate() {
        let t = t.ok_or_else(|| TransformError::NullKey { column: time_col.to_string(), row })?;
        let e =
            e.ok_or_else(|| TransformError::NullKey { column: entity_col.to_string(), row })?;
        rows.push((t, e, v));
    }

    let index: Vec<Date> =
        rows.iter().map(|(t, _, _)| *t).collect::<BTreeSet<_>>().into_iter().collect();
    let columns: Vec<String> = rows
        .iter()
        .map(|(_, e, _)| e.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();
    let row_of: HashMap<Date, usize> = index.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let col_of: HashMap<&str, usize> =
        columns.iter().enumerate().map(|(j, c)| (c.as_str(), j)).collect();

    let mut matrix = Array2::from_elem((index.len(), columns.len()), f64::NAN);
    let mut seen = Array2::from_elem((index.len(), columns.len()), false);
    let mut collisions = 0usize;
    for (t, e, v) in &rows {
        let cell = [row_of[t], col_of[e.as_str()]];
        if seen[cell] {
            if policy == DuplicatePolicy::Error {
                return Err(TransformError::Duplicate { time: *t, entity: e.clone() });
            }
            collisions += 1;
        }
        seen[cell] = true;
        if let Some(v) = v
            && matrix[cell].is_nan()
        {
            matrix[cell] = *v;
        }
    }

    if collisions > 0 {
        warn!(collisions, time_col, entity_col, "duplicate observations resolved first-wins");
    }
    debug!(rows = rows.len(), dates = index.len(), entities = columns.len(), "pivoted to wide");

    Ok(WidePanel::new(index, columns, matrix)?)
}

/// Stack a panel into a long frame with exactly three columns.
///
/// Every cell becomes a row, including missing ones (null value), ordered
/// by date then entity.
///
/// # Errors
/// Returns `TransformError::Polars` if the frame cannot be built.
pub fn to_long(
    panel: &WidePanel,
    time_col: &str,
    entity_col: &str,
    value_col: &str,
) -> Result<DataFrame, TransformError> {
    let (n_rows, n_cols) = panel.shape();
    let mut times: Vec<Date> = Vec::with_capacity(n_rows * n_cols);
    let mut entities: Vec<&str> = Vec::with_capacity(n_rows * n_cols);
    let mut values: Vec<Option<f64>> = Vec::with_capacity(n_rows * n_cols);

    for (i, date) in panel.index().iter().enumerate() {
        for (j, name) in panel.columns().iter().enumerate() {
            let v = panel.values()[[i, j]];
            times.push(*date);
            entities.push(name);
            values.push((!v.is_nan()).then_some(v));
        }
    }

    Ok(DataFrame::new(vec![
        Column::new(time_col.into(), times),
        Column::new(entity_col.into(), entities),
        Column::new(value_col.into(), values),
    ])?)
}

/// Pivot a factor-return frame (`date`, `name`, `ret`) into a panel.
///
/// # Errors
/// Returns `TransformError` as for [`to_wide`].
pub fn to_wide_factors(df: &DataFrame) -> Result<WidePanel, TransformError> {
    to_wide(df, FACTOR_TIME_COL, FACTOR_ENTITY_COL, FACTOR_VALUE_COL, DuplicatePolicy::First)
}

/// Pivot one characteristic of a characteristics frame into a date x id panel.
///
/// # Errors
/// Returns `TransformError` as for [`to_wide`].
pub fn to_wide_chars(
    df: &DataFrame,
    char_col: &str,
    time_key: TimeKey,
) -> Result<WidePanel, TransformError> {
    to_wide(df, &time_key.to_string(), CHAR_ENTITY_COL, char_col, DuplicatePolicy::First)
}

/// Render a panel as a wide frame: the time column followed by one column per entity.
///
/// # Errors
/// Returns `TransformError::Polars` if the frame cannot be built.
pub fn panel_to_frame(panel: &WidePanel, time_col: &str) -> Result<DataFrame, TransformError> {
    let mut columns = Vec::with_capacity(panel.columns().len() + 1);
    columns.push(Column::new(time_col.into(), panel.index().to_vec()));
    for (j, name) in panel.columns().iter().enumerate() {
        let values: Vec<Option<f64>> =
            panel.values().column(j).iter().map(|v| (!v.is_nan()).then_some(*v)).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// Read a wide frame (time column plus one numeric column per entity) into a panel.
///
/// # Errors
/// Returns `TransformError` if the time column is missing, null or unreadable.
pub fn frame_to_panel(df: &DataFrame, time_col: &str) -> Result<WidePanel, TransformError> {
    require_columns(df, &[time_col])?;
    let index = time_keys(df.column(time_col)?)?
        .into_iter()
        .enumerate()
        .map(|(row, t)| t.ok_or_else(|| TransformError::NullKey { column: time_col.to_string(), row }))
        .collect::<Result<Vec<_>, _>>()?;

    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|n| n.as_str() != time_col)
        .map(|n| n.to_string())
        .collect();

    let mut matrix = Array2::from_elem((index.len(), names.len()), f64::NAN);
    for (j, name) in names.iter().enumerate() {
        for (i, v) in numeric_values(df.column(name)?)?.into_iter().enumerate() {
            if let Some(v) = v {
                matrix[[i, j]] = v;
            }
        }
    }
    Ok(WidePanel::new(index, names, matrix)?)
}
