//! Wide-form panels and single named series.

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView1, Axis};

use crate::Date;

/// Errors raised while constructing or slicing a panel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    /// Values do not match the index/column lengths.
    #[error("shape mismatch: index x columns is {expected:?}, values are {actual:?}")]
    Shape {
        /// Shape implied by the labels.
        expected: (usize, usize),
        /// Shape of the value matrix.
        actual: (usize, usize),
    },

    /// A time key appears more than once.
    #[error("duplicate time key: {0}")]
    DuplicateIndex(Date),

    /// An entity label appears more than once.
    #[error("duplicate column label: {0}")]
    DuplicateColumn(String),

    /// Requested columns are not present.
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// A date x entity matrix of values.
///
/// Rows are indexed by a sorted, unique set of dates and columns by a sorted,
/// unique set of entity labels. Missing cells hold `NaN`; nothing is ever
/// zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct WidePanel {
    index: Vec<Date>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl WidePanel {
    /// Build a panel, sorting rows by date and columns by label.
    ///
    /// # Errors
    /// Returns `PanelError` if the shapes disagree or a label repeats.
    pub fn new(
        index: Vec<Date>,
        columns: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, PanelError> {
        let expected = (index.len(), columns.len());
        if values.dim() != expected {
            return Err(PanelError::Shape { expected, actual: values.dim() });
        }

        let mut row_order: Vec<usize> = (0..index.len()).collect();
        row_order.sort_by_key(|&i| index[i]);
        let index: Vec<Date> = row_order.iter().map(|&i| index[i]).collect();
        if let Some(w) = index.windows(2).find(|w| w[0] == w[1]) {
            return Err(PanelError::DuplicateIndex(w[0]));
        }

        let mut col_order: Vec<usize> = (0..columns.len()).collect();
        col_order.sort_by(|&a, &b| columns[a].cmp(&columns[b]));
        let columns: Vec<String> = col_order.iter().map(|&j| columns[j].clone()).collect();
        if let Some(w) = columns.windows(2).find(|w| w[0] == w[1]) {
            return Err(PanelError::DuplicateColumn(w[0].clone()));
        }

        let values = values.select(Axis(0), &row_order).select(Axis(1), &col_order);
        Ok(Self { index, columns, values })
    }

    /// Row labels.
    #[must_use]
    pub fn index(&self) -> &[Date] {
        &self.index
    }

    /// Column labels.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The value matrix (rows x columns).
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// (rows, columns).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// True if the panel has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells.
    #[must_use]
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Position of a column label.
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.binary_search_by(|c| c.as_str().cmp(name)).ok()
    }

    /// Position of a date.
    #[must_use]
    pub fn row_position(&self, date: Date) -> Option<usize> {
        self.index.binary_search(&date).ok()
    }

    /// A single column as a view.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_position(name).map(|j| self.values.column(j))
    }

    /// Value of one cell; `None` when the cell is absent or missing.
    #[must_use]
    pub fn get(&self, date: Date, name: &str) -> Option<f64> {
        let i = self.row_position(date)?;
        let j = self.column_position(name)?;
        let v = self.values[[i, j]];
        (!v.is_nan()).then_some(v)
    }

    /// Requested labels that are not columns of this panel, in request order.
    #[must_use]
    pub fn missing_columns<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| self.column_position(n).is_none())
            .map(ToString::to_string)
            .collect()
    }

    /// Restrict to the given columns.
    ///
    /// # Errors
    /// Returns `PanelError::MissingColumns` if any label is absent.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, PanelError> {
        let missing = self.missing_columns(names);
        if !missing.is_empty() {
            return Err(PanelError::MissingColumns(missing));
        }
        let wanted: BTreeSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let positions: Vec<usize> = wanted.iter().filter_map(|n| self.column_position(n)).collect();
        Ok(Self {
            index: self.index.clone(),
            columns: positions.iter().map(|&j| self.columns[j].clone()).collect(),
            values: self.values.select(Axis(1), &positions),
        })
    }

    /// Rows `start..end`, clamped to the panel.
    #[must_use]
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.index.len());
        let start = start.min(end);
        let rows: Vec<usize> = (start..end).collect();
        Self {
            index: self.index[start..end].to_vec(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }

    /// Dates and labels shared with `other`, both sorted.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> (Vec<Date>, Vec<String>) {
        let index = self.index.iter().filter(|d| other.row_position(**d).is_some()).copied();
        let columns =
            self.columns.iter().filter(|c| other.column_position(c).is_some()).cloned();
        (index.collect(), columns.collect())
    }

    /// Restrict to the given dates and columns, which must all be present.
    ///
    /// # Errors
    /// Returns `PanelError::MissingColumns` if a column label is absent.
    pub fn restrict(&self, index: &[Date], columns: &[String]) -> Result<Self, PanelError> {
        let rows: Vec<usize> = index.iter().filter_map(|d| self.row_position(*d)).collect();
        let sub = self.select_columns(columns)?;
        Ok(Self {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            columns: sub.columns,
            values: sub.values.select(Axis(0), &rows),
        })
    }
}

/// A single labelled series of dated values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Series label, if any.
    pub name: Option<String>,
    /// Observation dates.
    pub index: Vec<Date>,
    /// Observed values (`NaN` for missing).
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series.
    ///
    /// # Errors
    /// Returns `PanelError::Shape` if the lengths differ.
    pub fn new(
        name: Option<String>,
        index: Vec<Date>,
        values: Vec<f64>,
    ) -> Result<Self, PanelError> {
        if index.len() != values.len() {
            return Err(PanelError::Shape {
                expected: (index.len(), 1),
                actual: (values.len(), 1),
            });
        }
        Ok(Self { name, index, values })
    }

    /// The label, ignoring blank names.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Convert to a one-column panel under `name`.
    ///
    /// # Errors
    /// Returns `PanelError` if a date repeats.
    pub fn to_panel(&self, name: &str) -> Result<WidePanel, PanelError> {
        let values = Array2::from_shape_vec((self.values.len(), 1), self.values.clone())
            .map_err(|_| PanelError::Shape {
                expected: (self.index.len(), 1),
                actual: (self.values.len(), 1),
            })?;
        WidePanel::new(self.index.clone(), vec![name.to_string()], values)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn d(m: u32) -> Date {
        Date::from_ymd_opt(2024, m, 28).unwrap()
    }

    fn sample() -> WidePanel {
        WidePanel::new(
            vec![d(3), d(1), d(2)],
            vec!["b".into(), "a".into()],
            array![[3.0, 30.0], [1.0, 10.0], [2.0, f64::NAN]],
        )
        .unwrap()
    }

    #[test]
    fn new_sorts_rows_and_columns() {
        let panel = sample();
        assert_eq!(panel.index(), &[d(1), d(2), d(3)]);
        assert_eq!(panel.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(panel.get(d(1), "a"), Some(10.0));
        assert_eq!(panel.get(d(3), "b"), Some(3.0));
        assert_eq!(panel.get(d(2), "a"), None);
        assert_eq!(panel.n_missing(), 1);
    }

    #[test]
    fn new_rejects_duplicates_and_bad_shape() {
        let dup = WidePanel::new(vec![d(1), d(1)], vec!["a".into()], array![[1.0], [2.0]]);
        assert_eq!(dup.unwrap_err(), PanelError::DuplicateIndex(d(1)));

        let dup = WidePanel::new(vec![d(1)], vec!["a".into(), "a".into()], array![[1.0, 2.0]]);
        assert_eq!(dup.unwrap_err(), PanelError::DuplicateColumn("a".into()));

        let bad = WidePanel::new(vec![d(1)], vec!["a".into()], array![[1.0, 2.0]]);
        assert!(matches!(bad, Err(PanelError::Shape { .. })));
    }

    #[test]
    fn select_columns_reports_missing() {
        let panel = sample();
        let err = panel.select_columns(&["a", "zzz"]).unwrap_err();
        assert_eq!(err.to_string(), "missing columns: zzz");

        let only_b = panel.select_columns(&["b"]).unwrap();
        assert_eq!(only_b.shape(), (3, 1));
    }

    #[test]
    fn intersect_and_restrict() {
        let panel = sample();
        let other = WidePanel::new(
            vec![d(2), d(3), d(4)],
            vec!["b".into(), "c".into()],
            Array2::zeros((3, 2)),
        )
        .unwrap();

        let (index, columns) = panel.intersect(&other);
        assert_eq!(index, vec![d(2), d(3)]);
        assert_eq!(columns, vec!["b".to_string()]);

        let sub = panel.restrict(&index, &columns).unwrap();
        assert_eq!(sub.shape(), (2, 1));
        assert_eq!(sub.get(d(3), "b"), Some(3.0));
    }

    #[test]
    fn slice_rows_clamps() {
        let panel = sample();
        assert_eq!(panel.slice_rows(1, 10).index(), &[d(2), d(3)]);
        assert!(panel.slice_rows(5, 10).is_empty());
    }

    #[test]
    fn series_label_and_panel() {
        let series = TimeSeries::new(Some("  ".into()), vec![d(1)], vec![0.1]).unwrap();
        assert_eq!(series.label(), None);

        let panel = series.to_panel("at_gr1").unwrap();
        assert_eq!(panel.get(d(1), "at_gr1"), Some(0.1));

        assert!(TimeSeries::new(None, vec![d(1)], vec![]).is_err());
    }
}
