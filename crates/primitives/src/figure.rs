//! Aligned comparison data and rendered figures.

use serde::{Deserialize, Serialize};

use crate::Date;

/// Pairs of user and reference values that survived alignment.
///
/// All present vectors share one length, and neither value vector contains
/// missing entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedObservations {
    /// Time key of each pair, when the alignment carried a date-like key.
    pub time: Option<Vec<Date>>,
    /// Entity key of each pair, when the alignment carried an entity dimension.
    pub entity: Option<Vec<String>>,
    /// User values.
    pub user: Vec<f64>,
    /// Reference values.
    pub reference: Vec<f64>,
}

impl AlignedObservations {
    /// Number of aligned pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.user.len()
    }

    /// True if nothing survived alignment.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user.is_empty()
    }

    /// Distinct entity labels in first-seen order.
    #[must_use]
    pub fn entities(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for e in self.entity.iter().flatten() {
            if !seen.contains(&e.as_str()) {
                seen.push(e.as_str());
            }
        }
        seen
    }
}

/// Options for the diagnostic chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotOptions {
    /// Chart title.
    pub title: String,
    /// Maximum number of per-entity subplots.
    pub max_entities: usize,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: "Cumulative returns: user vs reference".to_string(),
            max_entities: 12,
            width: 1200,
            height: 900,
        }
    }
}

impl PlotOptions {
    /// Options with a custom title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }
}

/// A rendered chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    /// Title the chart was rendered with.
    pub title: String,
    /// SVG document.
    pub svg: String,
}
