//! Verbatim file reader.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use polars::prelude::*;
use qdl_primitives::{CharQuery, FactorQuery};
use qdl_traits::{DatasetSource, SourceError};
use tracing::debug;

use crate::{LoaderConfig, chars_file_name, factors_file_name};

/// Reads datasets from the directories named by a `LoaderConfig`.
///
/// Stateless apart from the configuration: every call resolves, checks and
/// reads afresh.
#[derive(Debug, Clone, Default)]
pub struct RawLoader {
    config: LoaderConfig,
}

impl RawLoader {
    /// Create a loader over the given directories.
    #[must_use]
    pub const fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Full path of a factor-return file.
    #[must_use]
    pub fn factors_path(&self, query: &FactorQuery) -> PathBuf {
        self.config.factors_dir.join(factors_file_name(query))
    }

    /// Full path of a characteristics file.
    #[must_use]
    pub fn chars_path(&self, query: &CharQuery) -> PathBuf {
        self.config.chars_dir.join(chars_file_name(query))
    }
}

impl DatasetSource for RawLoader {
    fn read_factors(&self, query: &FactorQuery) -> Result<DataFrame, SourceError> {
        let path = existing(self.factors_path(query), "csv")?;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.clone()))?
            .finish()?;
        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read factor file");
        Ok(df)
    }

    fn read_chars(&self, query: &CharQuery) -> Result<DataFrame, SourceError> {
        let path = existing(self.chars_path(query), "parquet")?;
        let df = ParquetReader::new(File::open(&path)?).finish()?;
        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read chars file");
        Ok(df)
    }
}

fn existing(path: PathBuf, extension: &str) -> Result<PathBuf, SourceError> {
    if path.is_file() {
        return Ok(path);
    }
    let available = path.parent().map(|dir| list_files(dir, extension)).unwrap_or_default();
    Err(SourceError::NotFound { path, available })
}

fn list_files(dir: &Path, extension: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == extension))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use std::fs;

    use qdl_primitives::{Country, DatasetKind, Vintage, Weighting};

    use super::*;

    fn loader_in(root: &Path) -> RawLoader {
        let config = LoaderConfig::with_root(root);
        fs::create_dir_all(&config.factors_dir).unwrap();
        fs::create_dir_all(&config.chars_dir).unwrap();
        RawLoader::new(config)
    }

    #[test]
    fn reads_factor_csv_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_in(dir.path());
        let query = FactorQuery::new(Country::Usa, DatasetKind::Mkt, Weighting::Vw);
        fs::write(
            loader.factors_path(&query),
            "location,date,name,ret\nusa,2020-01-31,market,0.01\nusa,2020-02-29,market,-0.02\n",
        )
        .unwrap();

        let df = loader.read_factors(&query).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["location", "date", "name", "ret"]);
        // no date inference
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn missing_factor_file_lists_alternatives() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_in(dir.path());
        let vw = FactorQuery::new(Country::Usa, DatasetKind::Mkt, Weighting::Vw);
        fs::write(loader.factors_path(&vw), "date,name,ret\n").unwrap();

        let ew = FactorQuery::new(Country::Usa, DatasetKind::Mkt, Weighting::Ew);
        let err = loader.read_factors(&ew).unwrap_err();
        match err {
            SourceError::NotFound { path, available } => {
                assert!(path.ends_with("[usa]_[mkt]_[monthly]_[ew].csv"));
                assert_eq!(available, vec!["[usa]_[mkt]_[monthly]_[vw].csv".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_directory_reports_none() {
        let dir = tempfile::tempdir().unwrap();
        let loader = RawLoader::new(LoaderConfig::with_root(dir.path().join("absent")));
        let query = CharQuery::new(Country::Kor, Vintage::From2000);
        let err = loader.read_chars(&query).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("available: none"));
    }

    #[test]
    fn reads_chars_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_in(dir.path());
        let query = CharQuery::new(Country::Usa, Vintage::From2020);

        let mut df = df! {
            "id" => &[10001i64, 10002],
            "eom" => &["2020-01-31", "2020-01-31"],
            "me" => &[Some(1.5), None],
        }
        .unwrap();
        let file = File::create(loader.chars_path(&query)).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();

        let read = loader.read_chars(&query).unwrap();
        assert_eq!(read.shape(), (2, 3));
        assert_eq!(read.column("me").unwrap().null_count(), 1);
    }
}
