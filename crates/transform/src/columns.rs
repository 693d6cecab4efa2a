//! Column helpers: presence checks, time keys, entity labels, numeric values.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use qdl_primitives::Date;

use crate::TransformError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Fail with every requested column that `df` lacks.
///
/// # Errors
/// Returns `TransformError::MissingColumns` naming the absent columns.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), TransformError> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|c| df.column(c).is_err())
        .map(|c| (*c).to_string())
        .collect();
    if missing.is_empty() { Ok(()) } else { Err(TransformError::MissingColumns(missing)) }
}

/// True if the column's type is a calendar type.
#[must_use]
pub fn is_temporal(column: &Column) -> bool {
    matches!(column.dtype(), DataType::Date | DataType::Datetime(_, _))
}

/// Parse a date from the textual layouts found in published files.
#[must_use]
pub fn parse_date(s: &str) -> Option<Date> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

fn from_yyyymmdd(n: i64) -> Option<Date> {
    let year = i32::try_from(n / 10_000).ok()?;
    let month = u32::try_from((n / 100) % 100).ok()?;
    let day = u32::try_from(n % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalise a time-key column to dates; nulls stay `None`.
///
/// Accepts `Date`, `Datetime` (truncated), strings in common date layouts and
/// integers of the form `yyyymmdd`.
///
/// # Errors
/// Returns `TransformError` if a non-null value is not a date.
pub fn time_keys(column: &Column) -> Result<Vec<Option<Date>>, TransformError> {
    let name = column.name().to_string();
    match column.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let days = column.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_FROM_CE)))
                .collect())
        }
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| {
                v.map(|s| {
                    parse_date(s).ok_or_else(|| TransformError::UnparseableTime {
                        column: name.clone(),
                        value: s.to_string(),
                    })
                })
                .transpose()
            })
            .collect(),
        dtype if dtype.is_integer() => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| {
                v.map(|n| {
                    from_yyyymmdd(n).ok_or_else(|| TransformError::UnparseableTime {
                        column: name.clone(),
                        value: n.to_string(),
                    })
                })
                .transpose()
            })
            .collect(),
        other => Err(TransformError::UnsupportedTimeType { column: name, dtype: other.to_string() }),
    }
}

/// Entity labels as strings; nulls stay `None`.
///
/// # Errors
/// Returns `TransformError::Polars` if the column cannot be cast to text.
pub fn entity_keys(column: &Column) -> Result<Vec<Option<String>>, TransformError> {
    let text = column.cast(&DataType::String)?;
    Ok(text.str()?.into_iter().map(|v| v.map(ToString::to_string)).collect())
}

/// Values coerced to `f64`; nulls, `NaN` and non-numeric entries become `None`.
///
/// # Errors
/// Returns `TransformError::Polars` if the column type cannot be cast.
pub fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>, TransformError> {
    let floats = column.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
}
