//! Request descriptions for facade operations.

use qdl_primitives::{
    CharQuery, Country, DatasetKind, FactorQuery, PlotOptions, TimeKey, TimeSeries, Vintage,
    WidePanel, Weighting,
};
use qdl_validator::Thresholds;

/// A factor-return dataset request with an optional column projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorRequest {
    /// File coordinates.
    pub query: FactorQuery,
    /// Columns to keep; `date` and `name` are always kept.
    pub columns: Option<Vec<String>>,
    /// Fail on absent columns instead of keeping the available ones.
    pub strict: bool,
}

impl FactorRequest {
    /// Request a monthly factor file, strict, without projection.
    #[must_use]
    pub fn new(country: Country, dataset: DatasetKind, weighting: Weighting) -> Self {
        Self { query: FactorQuery::new(country, dataset, weighting), columns: None, strict: true }
    }

    /// Keep only `columns` (plus the identifier pair).
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the strictness of the projection and factor subset.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A characteristics dataset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharRequest {
    /// File coordinates.
    pub query: CharQuery,
    /// Time-key column of the panel; `eom` unless set.
    pub time_key: TimeKey,
    /// Columns to keep; the time key and `id` are always kept.
    pub columns: Option<Vec<String>>,
    /// Fail on absent columns instead of keeping the available ones.
    pub strict: bool,
}

impl CharRequest {
    /// Request a characteristics file keyed by `eom`, strict, without projection.
    #[must_use]
    pub fn new(country: Country, vintage: Vintage) -> Self {
        Self {
            query: CharQuery::new(country, vintage),
            time_key: TimeKey::Eom,
            columns: None,
            strict: true,
        }
    }

    /// Use `time_key` as the time dimension.
    #[must_use]
    pub const fn time_key(mut self, time_key: TimeKey) -> Self {
        self.time_key = time_key;
        self
    }

    /// Keep only `columns` (plus the identifier pair).
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the strictness of the projection.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// User data handed to [`crate::Qdl::validate_factor`].
#[derive(Debug, Clone, PartialEq)]
pub enum FactorInput {
    /// One factor; its name comes from the request or the series label.
    Series(TimeSeries),
    /// Several factors, one per column.
    Panel(WidePanel),
}

impl From<TimeSeries> for FactorInput {
    fn from(series: TimeSeries) -> Self {
        Self::Series(series)
    }
}

impl From<WidePanel> for FactorInput {
    fn from(panel: WidePanel) -> Self {
        Self::Panel(panel)
    }
}

/// What to validate user factors against.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidateFactorRequest {
    /// Country of the reference file.
    pub country: Country,
    /// Dataset kind of the reference file.
    pub dataset: DatasetKind,
    /// Weighting of the reference file.
    pub weighting: Weighting,
    /// Name of a single-series input; overrides the series label.
    pub factor_name: Option<String>,
    /// Restrict a panel input to these factors.
    pub factors: Option<Vec<String>>,
    /// Reference panel to use instead of loading one.
    pub reference: Option<WidePanel>,
    /// Bounds on the aggregate metrics.
    pub thresholds: Option<Thresholds>,
    /// Chart request.
    pub plot: Option<PlotOptions>,
}

impl ValidateFactorRequest {
    /// Validate against the given reference file.
    #[must_use]
    pub const fn new(country: Country, dataset: DatasetKind, weighting: Weighting) -> Self {
        Self {
            country,
            dataset,
            weighting,
            factor_name: None,
            factors: None,
            reference: None,
            thresholds: None,
            plot: None,
        }
    }

    /// Name a single-series input.
    #[must_use]
    pub fn factor_name(mut self, name: impl Into<String>) -> Self {
        self.factor_name = Some(name.into());
        self
    }

    /// Restrict a panel input to `factors`.
    #[must_use]
    pub fn factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factors = Some(factors.into_iter().map(Into::into).collect());
        self
    }

    /// Compare against `reference` instead of loading it.
    #[must_use]
    pub fn reference(mut self, reference: WidePanel) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Evaluate `thresholds`.
    #[must_use]
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Request a chart.
    #[must_use]
    pub fn plot(mut self, plot: PlotOptions) -> Self {
        self.plot = Some(plot);
        self
    }

    /// Coordinates of the reference file.
    #[must_use]
    pub fn reference_request(&self) -> FactorRequest {
        FactorRequest::new(self.country, self.dataset, self.weighting)
    }
}
