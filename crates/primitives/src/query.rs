//! Fully specified dataset coordinates.

use serde::{Deserialize, Serialize};

use crate::{Country, DatasetKind, Frequency, Vintage, Weighting};

/// Coordinates of one factor-return file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorQuery {
    /// Country segment.
    pub country: Country,
    /// Dataset kind.
    pub dataset: DatasetKind,
    /// Weighting scheme.
    pub weighting: Weighting,
    /// Sampling frequency.
    #[serde(default)]
    pub frequency: Frequency,
}

impl FactorQuery {
    /// Create a monthly factor query.
    #[must_use]
    pub const fn new(country: Country, dataset: DatasetKind, weighting: Weighting) -> Self {
        Self { country, dataset, weighting, frequency: Frequency::Monthly }
    }
}

/// Coordinates of one characteristics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharQuery {
    /// Country segment.
    pub country: Country,
    /// Dataset vintage.
    pub vintage: Vintage,
}

impl CharQuery {
    /// Create a characteristics query.
    #[must_use]
    pub const fn new(country: Country, vintage: Vintage) -> Self {
        Self { country, vintage }
    }
}
