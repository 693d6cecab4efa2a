//! The public entry point composing loader, transformer and validator.

use polars::prelude::*;
use qdl_loader::{LoaderConfig, RawLoader};
use qdl_primitives::WidePanel;
use qdl_traits::DatasetSource;
use qdl_transform::{CHAR_ENTITY_COL, FACTOR_ENTITY_COL, FACTOR_TIME_COL, to_wide_chars, to_wide_factors};
use qdl_validator::{LongValidation, ValidationOptions, ValidationReport, Validator};
use tracing::debug;

use crate::{CharRequest, FacadeError, FactorInput, FactorRequest, ValidateFactorRequest};

/// Data-access and validation facade.
///
/// Every call reads its files afresh; nothing is cached between calls.
#[derive(Debug)]
pub struct Qdl<S: DatasetSource = RawLoader> {
    source: S,
    validator: Validator,
}

impl Default for Qdl<RawLoader> {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl Qdl<RawLoader> {
    /// Create a facade reading from the directories in `config`.
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_source(RawLoader::new(config))
    }

    /// Create a facade rooted at `QDL_DATA_ROOT`, or the default layout.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LoaderConfig::from_env())
    }
}

/// Keep `requested` plus `keys`, keys first, without repeats.
fn project(
    df: DataFrame,
    requested: Option<&[String]>,
    keys: &[&str],
    strict: bool,
) -> Result<DataFrame, FacadeError> {
    let Some(requested) = requested else {
        return Ok(df);
    };

    let mut wanted: Vec<&str> = keys.to_vec();
    for c in requested {
        if !wanted.contains(&c.as_str()) {
            wanted.push(c);
        }
    }

    let (present, missing): (Vec<&str>, Vec<&str>) =
        wanted.into_iter().partition(|c| df.column(c).is_ok());
    if !missing.is_empty() {
        if strict {
            return Err(FacadeError::MissingColumns(
                missing.into_iter().map(ToString::to_string).collect(),
            ));
        }
        debug!(?missing, "dropping absent columns from projection");
    }
    Ok(df.select(present)?)
}

/// Restrict `panel` to `names`; absent names fail when `strict`, else are skipped.
fn subset<S: AsRef<str>>(
    panel: WidePanel,
    names: Option<&[S]>,
    strict: bool,
) -> Result<WidePanel, FacadeError> {
    let Some(names) = names else {
        return Ok(panel);
    };
    if strict {
        return Ok(panel.select_columns(names)?);
    }
    let present: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| panel.column_position(n).is_some())
        .collect();
    Ok(panel.select_columns(&present)?)
}

impl<S: DatasetSource> Qdl<S> {
    /// Create a facade over any dataset source.
    #[must_use]
    pub fn with_source(source: S) -> Self {
        Self { source, validator: Validator::new() }
    }

    /// Replace the validator, e.g. with one carrying a renderer.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Get the dataset source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Get the validator.
    #[must_use]
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Load a factor-return file in long form.
    ///
    /// With a projection, `date` and `name` are always kept.
    ///
    /// # Errors
    /// Returns `FacadeError` if the file is missing or, in strict mode, a
    /// projected column is absent.
    pub fn load_factor_dataset(&self, request: &FactorRequest) -> Result<DataFrame, FacadeError> {
        let df = self.source.read_factors(&request.query)?;
        project(
            df,
            request.columns.as_deref(),
            &[FACTOR_TIME_COL, FACTOR_ENTITY_COL],
            request.strict,
        )
    }

    /// Load a factor-return file as a date x factor panel.
    ///
    /// # Arguments
    /// * `request` - File coordinates, projection and strictness
    /// * `factors` - Optional subset of factor columns to keep
    ///
    /// # Errors
    /// Returns `FacadeError` if loading or pivoting fails, or if a requested
    /// factor is absent in strict mode.
    pub fn load_factors(
        &self,
        request: &FactorRequest,
        factors: Option<&[&str]>,
    ) -> Result<WidePanel, FacadeError> {
        let df = self.load_factor_dataset(request)?;
        let panel = to_wide_factors(&df)?;
        subset(panel, factors, request.strict)
    }

    /// Load a characteristics file in long form.
    ///
    /// With a projection, the request's time key and `id` are always kept.
    ///
    /// # Errors
    /// Returns `FacadeError` if the file is missing or, in strict mode, a
    /// projected column is absent.
    pub fn load_char_dataset(&self, request: &CharRequest) -> Result<DataFrame, FacadeError> {
        let df = self.source.read_chars(&request.query)?;
        let time_key = request.time_key.to_string();
        project(df, request.columns.as_deref(), &[&time_key, CHAR_ENTITY_COL], request.strict)
    }

    /// Load one characteristic as a date x id panel.
    ///
    /// # Errors
    /// Returns `FacadeError` if loading fails or the characteristic is absent.
    pub fn load_char(
        &self,
        request: &CharRequest,
        characteristic: &str,
    ) -> Result<WidePanel, FacadeError> {
        let mut request = request.clone();
        if let Some(columns) = request.columns.as_mut().filter(|c| !c.iter().any(|n| n == characteristic)) {
            columns.push(characteristic.to_string());
        }
        let df = self.load_char_dataset(&request)?;
        Ok(to_wide_chars(&df, characteristic, request.time_key)?)
    }

    /// Validate user factors against a reference factor panel.
    ///
    /// A single series is named by `factor_name`, else by its label. A panel
    /// may be restricted to `factors`, all of which must be present. The
    /// reference is loaded from the request coordinates unless supplied.
    ///
    /// # Errors
    /// Returns `FacadeError::AmbiguousIdentity` for an unnamed series, a schema
    /// error for absent factors, and alignment errors from the validator.
    pub fn validate_factor(
        &self,
        input: FactorInput,
        request: &ValidateFactorRequest,
    ) -> Result<ValidationReport, FacadeError> {
        let user = match input {
            FactorInput::Series(series) => {
                let name = request
                    .factor_name
                    .as_deref()
                    .or_else(|| series.label())
                    .ok_or(FacadeError::AmbiguousIdentity)?;
                series.to_panel(name)?
            }
            FactorInput::Panel(panel) => subset(panel, request.factors.as_deref(), true)?,
        };

        let loaded;
        let reference = match &request.reference {
            Some(reference) => reference,
            None => {
                let names: Vec<&str> = user.columns().iter().map(String::as_str).collect();
                loaded = self.load_factors(&request.reference_request().strict(false), Some(&names))?;
                &loaded
            }
        };
        debug!(
            user = ?user.shape(),
            reference = ?reference.shape(),
            "validating factor panel"
        );

        let options = ValidationOptions { thresholds: request.thresholds, plot: request.plot.clone() };
        Ok(self.validator.validate_wide(&user, reference, &options)?)
    }

    /// Validate long frames joined on explicit keys.
    ///
    /// # Errors
    /// Returns the validator's schema and alignment errors.
    pub fn validate_long(
        &self,
        user: &DataFrame,
        reference: &DataFrame,
        spec: &LongValidation,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, FacadeError> {
        Ok(self.validator.validate_long(user, reference, spec, options)?)
    }
}
