//! Closed enumerations naming the on-disk datasets.
//!
//! Every enumeration displays as the exact token used in file names and
//! parses back from it. Parsing is the only place a free-form string enters
//! the system, so an unknown token fails here, before any file lookup.

use std::{fmt, str::FromStr};

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A string that is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {parameter} '{value}': expected one of {{{}}}", .allowed.join(", "))]
pub struct ParseKeyError {
    /// Name of the offending parameter.
    pub parameter: &'static str,
    /// The rejected value.
    pub value: String,
    /// Every accepted token.
    pub allowed: Vec<String>,
}

fn parse_token<T: Copy + fmt::Display>(
    parameter: &'static str,
    value: &str,
    all: &[T],
) -> Result<T, ParseKeyError> {
    all.iter().copied().find(|v| v.to_string() == value).ok_or_else(|| ParseKeyError {
        parameter,
        value: value.to_string(),
        allowed: all.iter().map(ToString::to_string).collect(),
    })
}

/// Country segment of a dataset file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    /// United States.
    #[display("usa")]
    Usa,
    /// South Korea.
    #[display("kor")]
    Kor,
}

impl Country {
    /// All countries.
    pub const ALL: [Self; 2] = [Self::Usa, Self::Kor];
}

impl FromStr for Country {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("country", s, &Self::ALL)
    }
}

/// Logical kind of factor dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Individual characteristic factors.
    #[display("factor")]
    Factor,
    /// Theme (cluster) factors.
    #[display("theme")]
    Theme,
    /// Market factor.
    #[display("mkt")]
    Mkt,
}

impl DatasetKind {
    /// All dataset kinds.
    pub const ALL: [Self; 3] = [Self::Factor, Self::Theme, Self::Mkt];

    /// Token used inside the file name.
    #[must_use]
    pub const fn file_token(&self) -> &'static str {
        match self {
            Self::Factor => "all_factors",
            Self::Theme => "all_themes",
            Self::Mkt => "mkt",
        }
    }
}

impl FromStr for DatasetKind {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("dataset", s, &Self::ALL)
    }
}

/// Portfolio weighting scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Equal weight.
    #[display("ew")]
    Ew,
    /// Value weight.
    #[display("vw")]
    Vw,
    /// Capped value weight.
    #[display("vw_cap")]
    VwCap,
}

impl Weighting {
    /// All weighting schemes.
    pub const ALL: [Self; 3] = [Self::Ew, Self::Vw, Self::VwCap];
}

impl FromStr for Weighting {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("weighting", s, &Self::ALL)
    }
}

/// Sampling frequency. Only monthly panels are published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Monthly observations.
    #[default]
    #[display("monthly")]
    Monthly,
}

impl Frequency {
    /// All frequencies.
    pub const ALL: [Self; 1] = [Self::Monthly];
}

impl FromStr for Frequency {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("frequency", s, &Self::ALL)
    }
}

/// Snapshot epoch of the characteristics dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Vintage {
    /// Observations from 1972 onwards.
    #[display("1972-")]
    #[serde(rename = "1972-")]
    From1972,
    /// Observations from 2000 onwards.
    #[display("2000-")]
    #[serde(rename = "2000-")]
    From2000,
    /// Observations from 2020 onwards.
    #[display("2020-")]
    #[serde(rename = "2020-")]
    From2020,
}

impl Vintage {
    /// All vintages.
    pub const ALL: [Self; 3] = [Self::From1972, Self::From2000, Self::From2020];
}

impl FromStr for Vintage {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("vintage", s, &Self::ALL)
    }
}

/// Which column of a characteristics file carries the time key.
///
/// `eom` is the date of the last available observation in the month and is
/// not necessarily a calendar month-end. `date` is the month-end stamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeKey {
    /// Last observation date within the month.
    #[default]
    #[display("eom")]
    Eom,
    /// Month-end timestamp.
    #[display("date")]
    Date,
}

impl TimeKey {
    /// All time keys.
    pub const ALL: [Self; 2] = [Self::Eom, Self::Date];
}

impl FromStr for TimeKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("time key", s, &Self::ALL)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Weighting::Ew, "ew")]
    #[case(Weighting::Vw, "vw")]
    #[case(Weighting::VwCap, "vw_cap")]
    fn weighting_tokens(#[case] weighting: Weighting, #[case] token: &str) {
        assert_eq!(weighting.to_string(), token);
        assert_eq!(token.parse::<Weighting>().unwrap(), weighting);
    }

    #[test]
    fn dataset_file_tokens() {
        assert_eq!(DatasetKind::Factor.file_token(), "all_factors");
        assert_eq!(DatasetKind::Theme.file_token(), "all_themes");
        assert_eq!(DatasetKind::Mkt.file_token(), "mkt");
        assert_eq!("theme".parse::<DatasetKind>().unwrap(), DatasetKind::Theme);
    }

    #[test]
    fn vintage_tokens() {
        assert_eq!(Vintage::From2020.to_string(), "2020-");
        assert_eq!("1972-".parse::<Vintage>().unwrap(), Vintage::From1972);
    }

    #[test]
    fn invalid_token_names_parameter_and_allowed_set() {
        let err = "jpn".parse::<Country>().unwrap_err();
        assert_eq!(err.parameter, "country");
        assert_eq!(err.to_string(), "invalid country 'jpn': expected one of {usa, kor}");

        let err = "weekly".parse::<Frequency>().unwrap_err();
        assert!(err.to_string().contains("monthly"));
    }

    #[test]
    fn conventional_time_key_is_eom() {
        assert_eq!(TimeKey::default(), TimeKey::Eom);
        assert_eq!("date".parse::<TimeKey>().unwrap(), TimeKey::Date);
    }
}
