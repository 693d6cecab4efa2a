//! Aligning user and reference data into paired observations.

use polars::prelude::*;
use qdl_primitives::{AlignedObservations, Date, WidePanel};
use qdl_transform::{entity_keys, is_temporal, numeric_values, time_keys};
use tracing::debug;

use crate::{
    ValidationError,
    report::{Diagnostics, Protocol},
};

/// Column names treated as time keys regardless of their type.
const TIME_KEY_NAMES: &[&str] = &["date", "eom", "time", "datetime", "timestamp", "month", "period"];

/// Label of the entity dimension synthesised from wide panel columns.
pub(crate) const WIDE_ENTITY_KEY: &str = "factor";

/// Label of the time dimension of wide panels.
pub(crate) const WIDE_TIME_KEY: &str = "date";

/// How to join two long frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongValidation {
    /// Join keys present in both frames.
    pub on: Vec<String>,
    /// Numeric column compared between the frames.
    pub value_col: String,
    /// Join key used for the per-entity breakdown.
    pub group_on: Option<String>,
}

impl LongValidation {
    /// Join on `on` and compare `value_col`.
    pub fn new<I, S>(on: I, value_col: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { on: on.into_iter().map(Into::into).collect(), value_col: value_col.into(), group_on: None }
    }

    /// Break the metrics down by `key`.
    #[must_use]
    pub fn group_on(mut self, key: impl Into<String>) -> Self {
        self.group_on = Some(key.into());
        self
    }
}

/// Paired observations plus the bookkeeping that produced them.
#[derive(Debug, Clone)]
pub(crate) struct Alignment {
    pub(crate) observations: AlignedObservations,
    pub(crate) diagnostics: Diagnostics,
}

fn is_time_like_name(name: &str) -> bool {
    TIME_KEY_NAMES.iter().any(|t| t.eq_ignore_ascii_case(name))
}

fn check_columns(
    df: &DataFrame,
    table: &'static str,
    spec: &LongValidation,
) -> Result<(), ValidationError> {
    let columns: Vec<String> = spec
        .on
        .iter()
        .chain(std::iter::once(&spec.value_col))
        .filter(|c| df.column(c).is_err())
        .cloned()
        .collect();
    if columns.is_empty() { Ok(()) } else { Err(ValidationError::MissingColumns { table, columns }) }
}

fn values_of(
    df: &DataFrame,
    table: &'static str,
    column: &str,
) -> Result<Vec<Option<f64>>, ValidationError> {
    let values = numeric_values(df.column(column)?)?;
    if values.iter().all(Option::is_none) {
        return Err(ValidationError::NoNumericValues { table, column: column.to_string() });
    }
    Ok(values)
}

type DateKeys = (Vec<Option<Date>>, Vec<Option<Date>>);

/// First join key that looks like time on either side and normalises to dates on both.
fn detect_time_key(
    user: &DataFrame,
    reference: &DataFrame,
    on: &[String],
) -> Result<Option<(usize, DateKeys)>, ValidationError> {
    for (pos, key) in on.iter().enumerate() {
        let (u, r) = (user.column(key)?, reference.column(key)?);
        if !(is_time_like_name(key) || is_temporal(u) || is_temporal(r)) {
            continue;
        }
        match (time_keys(u), time_keys(r)) {
            (Ok(ud), Ok(rd)) => return Ok(Some((pos, (ud, rd)))),
            _ => debug!(key = %key, "time-like key does not normalise to dates, joining as text"),
        }
    }
    Ok(None)
}

/// Value columns carried through the join.
const USER_VALUE: &str = "__qdl_user";
const REFERENCE_VALUE: &str = "__qdl_ref";

/// Dtype both sides of a non-time join key are cast to before joining.
fn common_key_dtype(user: &DataType, reference: &DataType) -> DataType {
    if user == reference {
        user.clone()
    } else if user.is_integer() && reference.is_integer() {
        DataType::Int64
    } else if (user.is_integer() || user.is_float())
        && (reference.is_integer() || reference.is_float())
    {
        DataType::Float64
    } else {
        DataType::String
    }
}

/// Join keys plus the compared values under `value_name`, ready to join.
fn keyed_frame(
    df: &DataFrame,
    on: &[String],
    key_dtypes: &[DataType],
    mut time: Option<(usize, Vec<Option<Date>>)>,
    value_name: &str,
    values: Vec<Option<f64>>,
) -> Result<DataFrame, ValidationError> {
    let mut columns = Vec::with_capacity(on.len() + 1);
    for (pos, (key, dtype)) in on.iter().zip(key_dtypes).enumerate() {
        let column = match time.take_if(|(time_pos, _)| *time_pos == pos) {
            Some((_, dates)) => Column::new(key.as_str().into(), dates),
            None => df.column(key)?.cast(dtype)?,
        };
        columns.push(column);
    }
    columns.push(Column::new(value_name.into(), values));
    Ok(DataFrame::new(columns)?)
}

/// Align two long frames on explicit keys.
pub(crate) fn align_long(
    user: &DataFrame,
    reference: &DataFrame,
    spec: &LongValidation,
) -> Result<Alignment, ValidationError> {
    if spec.on.is_empty() {
        return Err(ValidationError::NoJoinKeys);
    }
    if let Some(group) = spec.group_on.as_ref().filter(|g| !spec.on.contains(g)) {
        return Err(ValidationError::InvalidGroupKey(group.clone()));
    }
    check_columns(user, "user", spec)?;
    check_columns(reference, "reference", spec)?;

    let user_values = values_of(user, "user", &spec.value_col)?;
    let reference_values = values_of(reference, "reference", &spec.value_col)?;

    let time = detect_time_key(user, reference, &spec.on)?;
    let time_pos = time.as_ref().map(|(pos, _)| *pos);
    let time_key = time_pos.map(|pos| spec.on[pos].clone());
    let (user_time, reference_time) = match time {
        Some((pos, (ud, rd))) => (Some((pos, ud)), Some((pos, rd))),
        None => (None, None),
    };

    let key_dtypes = spec
        .on
        .iter()
        .map(|key| Ok(common_key_dtype(user.column(key)?.dtype(), reference.column(key)?.dtype())))
        .collect::<Result<Vec<_>, ValidationError>>()?;
    let user_keyed = keyed_frame(user, &spec.on, &key_dtypes, user_time, USER_VALUE, user_values)?;
    let reference_keyed = keyed_frame(
        reference,
        &spec.on,
        &key_dtypes,
        reference_time,
        REFERENCE_VALUE,
        reference_values,
    )?;

    let keys: Vec<Expr> = spec.on.iter().map(|k| col(k.as_str())).collect();
    let mut joined = user_keyed.lazy().join(
        reference_keyed.lazy(),
        keys.clone(),
        keys,
        JoinArgs::new(JoinType::Inner),
    );
    if let Some(key) = &time_key {
        joined = joined.sort([key.as_str()], SortMultipleOptions::new().with_maintain_order(true));
    }
    let joined = joined.collect()?;

    let rows_after_join = joined.height();
    if rows_after_join == 0 {
        return Err(ValidationError::NoOverlap(format!(
            "no rows share join keys [{}]",
            spec.on.join(", ")
        )));
    }

    let paired = joined
        .lazy()
        .filter(col(USER_VALUE).is_not_null().and(col(REFERENCE_VALUE).is_not_null()))
        .collect()?;
    let rows_after_dropna = paired.height();
    if rows_after_dropna == 0 {
        return Err(ValidationError::AllMissing { rows: rows_after_join });
    }

    let entity_key = spec.group_on.clone().or_else(|| {
        let mut rest = spec.on.iter().filter(|k| Some(*k) != time_key.as_ref());
        match (rest.next(), rest.next()) {
            (Some(key), None) => Some(key.clone()),
            _ => None,
        }
    });

    let observations = AlignedObservations {
        time: match &time_key {
            Some(key) => Some(time_keys(paired.column(key)?)?.into_iter().flatten().collect()),
            None => None,
        },
        entity: match &entity_key {
            Some(key) => Some(entity_keys(paired.column(key)?)?.into_iter().flatten().collect()),
            None => None,
        },
        user: paired.column(USER_VALUE)?.f64()?.into_iter().flatten().collect(),
        reference: paired.column(REFERENCE_VALUE)?.f64()?.into_iter().flatten().collect(),
    };

    let diagnostics = Diagnostics {
        protocol: Protocol::Long,
        user_rows: user.height(),
        reference_rows: reference.height(),
        rows_after_join,
        rows_after_dropna,
        join_keys: Some(spec.on.clone()),
        time_key,
        entity_dimension: entity_key.is_some(),
        entity_key,
        columns_equal: None,
        common_dates: None,
        common_columns: None,
    };
    debug!(?diagnostics, "aligned long frames");
    Ok(Alignment { observations, diagnostics })
}

/// Align two wide panels on their shared dates and columns.
pub(crate) fn align_wide(
    user: &WidePanel,
    reference: &WidePanel,
) -> Result<Alignment, ValidationError> {
    let (dates, columns) = user.intersect(reference);
    if dates.is_empty() {
        return Err(ValidationError::NoOverlap("no common dates".to_string()));
    }
    if columns.is_empty() {
        return Err(ValidationError::NoOverlap("no common columns".to_string()));
    }

    let u = user.restrict(&dates, &columns)?;
    let r = reference.restrict(&dates, &columns)?;
    let rows_after_join = dates.len() * columns.len();

    let mut observations = AlignedObservations {
        time: Some(Vec::new()),
        entity: Some(Vec::new()),
        user: Vec::new(),
        reference: Vec::new(),
    };
    for (i, date) in dates.iter().enumerate() {
        for (j, column) in columns.iter().enumerate() {
            let (uv, rv) = (u.values()[[i, j]], r.values()[[i, j]]);
            if uv.is_nan() || rv.is_nan() {
                continue;
            }
            if let Some(time) = observations.time.as_mut() {
                time.push(*date);
            }
            if let Some(entity) = observations.entity.as_mut() {
                entity.push(column.clone());
            }
            observations.user.push(uv);
            observations.reference.push(rv);
        }
    }
    if observations.is_empty() {
        return Err(ValidationError::AllMissing { rows: rows_after_join });
    }

    let diagnostics = Diagnostics {
        protocol: Protocol::Wide,
        user_rows: user.shape().0,
        reference_rows: reference.shape().0,
        rows_after_join,
        rows_after_dropna: observations.len(),
        join_keys: None,
        time_key: Some(WIDE_TIME_KEY.to_string()),
        entity_key: Some(WIDE_ENTITY_KEY.to_string()),
        entity_dimension: true,
        columns_equal: Some(user.columns() == reference.columns()),
        common_dates: Some(dates.len()),
        common_columns: Some(columns.len()),
    };
    debug!(?diagnostics, "aligned wide panels");
    Ok(Alignment { observations, diagnostics })
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    fn d(m: u32) -> Date {
        Date::from_ymd_opt(2020, m, 28).unwrap()
    }

    fn long(dates: &[&str], names: &[&str], values: &[Option<f64>]) -> DataFrame {
        df!(
            "date" => dates,
            "name" => names,
            "ret" => values,
        )
        .unwrap()
    }

    #[rstest]
    #[case("date", true)]
    #[case("EOM", true)]
    #[case("Period", true)]
    #[case("name", false)]
    fn time_key_names(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_time_like_name(name), expected);
    }

    #[test]
    fn long_inner_join_sorted_by_date() {
        let user = long(
            &["2020-03-28", "2020-01-28", "2020-02-28"],
            &["a", "a", "a"],
            &[Some(0.3), Some(0.1), Some(0.2)],
        );
        let reference = long(
            &["20200128", "20200228", "20200428"],
            &["a", "a", "a"],
            &[Some(0.1), Some(0.25), Some(0.4)],
        );
        let spec = LongValidation::new(["date", "name"], "ret");
        let aligned = align_long(&user, &reference, &spec).unwrap();

        assert_eq!(aligned.observations.time, Some(vec![d(1), d(2)]));
        assert_eq!(aligned.observations.user, vec![0.1, 0.2]);
        assert_eq!(aligned.observations.reference, vec![0.1, 0.25]);
        assert_eq!(aligned.diagnostics.rows_after_join, 2);
        assert_eq!(aligned.diagnostics.time_key.as_deref(), Some("date"));
        assert_eq!(aligned.diagnostics.entity_key.as_deref(), Some("name"));
    }

    #[test]
    fn long_drops_missing_pairs() {
        let user = long(&["2020-01-28", "2020-02-28"], &["a", "a"], &[Some(0.1), None]);
        let reference = long(&["2020-01-28", "2020-02-28"], &["a", "a"], &[Some(0.1), Some(0.2)]);
        let aligned = align_long(&user, &reference, &LongValidation::new(["date", "name"], "ret"))
            .unwrap();
        assert_eq!(aligned.diagnostics.rows_after_join, 2);
        assert_eq!(aligned.diagnostics.rows_after_dropna, 1);
    }

    #[test]
    fn long_all_missing_is_distinct_from_no_overlap() {
        let user = long(&["2020-01-28", "2020-02-28"], &["a", "a"], &[None, Some(0.1)]);
        let reference = long(&["2020-01-28", "2020-03-28"], &["a", "a"], &[Some(0.1), Some(0.2)]);
        let err = align_long(&user, &reference, &LongValidation::new(["date"], "ret")).unwrap_err();
        assert!(matches!(err, ValidationError::AllMissing { rows: 1 }));
    }

    #[test]
    fn long_schema_errors() {
        let user = long(&["2020-01-28"], &["a"], &[Some(0.1)]);
        let reference = user.clone();

        let err = align_long(&user, &reference, &LongValidation::new(Vec::<String>::new(), "ret"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NoJoinKeys));

        let err = align_long(&user, &reference, &LongValidation::new(["date", "id"], "ret"))
            .unwrap_err();
        assert_eq!(err.to_string(), "user is missing columns: id");

        let spec = LongValidation::new(["date"], "ret").group_on("name");
        let err = align_long(&user, &reference, &spec).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidGroupKey(_)));

        let text = df!("date" => ["2020-01-28"], "ret" => ["n/a"]).unwrap();
        let err = align_long(&text, &reference, &LongValidation::new(["date"], "ret")).unwrap_err();
        assert!(matches!(err, ValidationError::NoNumericValues { table: "user", .. }));
    }

    #[test]
    fn long_without_time_key_omits_dates() {
        let user = df!("id" => [1_i64, 2], "ret" => [0.1, 0.2]).unwrap();
        let reference = df!("id" => [2_i64, 3], "ret" => [0.25, 0.3]).unwrap();
        let aligned = align_long(&user, &reference, &LongValidation::new(["id"], "ret")).unwrap();
        assert_eq!(aligned.observations.time, None);
        assert_eq!(aligned.observations.entity, Some(vec!["2".to_string()]));
    }

    #[test]
    fn long_join_matches_mixed_numeric_keys() {
        let user = df!(
            "date" => ["2020-01-28", "2020-01-28", "2020-02-28"],
            "id" => [1_i64, 2, 1],
            "ret" => [0.1, 0.2, 0.3],
        )
        .unwrap();
        let reference = df!(
            "date" => ["2020-01-28", "2020-01-28", "2020-03-28"],
            "id" => [1.0_f64, 2.0, 1.0],
            "ret" => [0.15, 0.25, 0.35],
        )
        .unwrap();
        let spec = LongValidation::new(["date", "id"], "ret");
        let aligned = align_long(&user, &reference, &spec).unwrap();

        assert_eq!(aligned.diagnostics.rows_after_join, 2);
        assert_eq!(aligned.observations.time, Some(vec![d(1), d(1)]));
        let mut pairs: Vec<(f64, f64)> = aligned
            .observations
            .user
            .iter()
            .copied()
            .zip(aligned.observations.reference.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        assert_eq!(pairs, vec![(0.1, 0.15), (0.2, 0.25)]);
    }

    #[test]
    fn long_keys_of_unrelated_types_join_as_text() {
        let user = df!("code" => ["7", "8"], "ret" => [0.1, 0.2]).unwrap();
        let reference = df!("code" => [7_i32, 9], "ret" => [0.15, 0.3]).unwrap();
        let aligned = align_long(&user, &reference, &LongValidation::new(["code"], "ret")).unwrap();
        assert_eq!(aligned.observations.entity, Some(vec!["7".to_string()]));
        assert_eq!(aligned.observations.reference, vec![0.15]);
    }

    #[rstest]
    #[case(DataType::Int32, DataType::Int64, DataType::Int64)]
    #[case(DataType::Int64, DataType::Float64, DataType::Float64)]
    #[case(DataType::String, DataType::Int64, DataType::String)]
    #[case(DataType::Date, DataType::Date, DataType::Date)]
    fn key_dtypes_meet_on_a_common_type(
        #[case] user: DataType,
        #[case] reference: DataType,
        #[case] expected: DataType,
    ) {
        assert_eq!(common_key_dtype(&user, &reference), expected);
    }

    #[test]
    fn wide_intersection_is_date_major() {
        let user = WidePanel::new(
            vec![d(1), d(2)],
            vec!["a".into(), "b".into(), "c".into()],
            array![[0.1, 0.2, 0.3], [0.4, f64::NAN, 0.6]],
        )
        .unwrap();
        let reference = WidePanel::new(
            vec![d(2), d(3)],
            vec!["a".into(), "b".into()],
            array![[0.4, 0.5], [0.7, 0.8]],
        )
        .unwrap();

        let aligned = align_wide(&user, &reference).unwrap();
        assert_eq!(aligned.observations.user, vec![0.4]);
        assert_eq!(aligned.observations.entity, Some(vec!["a".to_string()]));
        assert_eq!(aligned.diagnostics.rows_after_join, 2);
        assert_eq!(aligned.diagnostics.user_rows, 2);
        assert_eq!(aligned.diagnostics.reference_rows, 2);
        assert_eq!(aligned.diagnostics.columns_equal, Some(false));
    }

    #[test]
    fn wide_disjoint_dates_fail() {
        let user = WidePanel::new(vec![d(1)], vec!["a".into()], array![[0.1]]).unwrap();
        let reference = WidePanel::new(vec![d(2)], vec!["a".into()], array![[0.1]]).unwrap();
        let err = align_wide(&user, &reference).unwrap_err();
        assert!(err.is_alignment());
        assert!(err.to_string().contains("no common dates"));
    }
}
