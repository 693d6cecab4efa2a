//! Base-path configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming the data root directory.
pub const DATA_ROOT_ENV: &str = "QDL_DATA_ROOT";

/// Where the loader looks for files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory holding factor-return CSV files.
    pub factors_dir: PathBuf,
    /// Directory holding characteristics Parquet files.
    pub chars_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::with_root("data")
    }
}

impl LoaderConfig {
    /// Use `<root>/factors` and `<root>/chars`.
    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self { factors_dir: root.join("factors"), chars_dir: root.join("chars") }
    }

    /// Read the root from `QDL_DATA_ROOT`, falling back to the default layout.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var_os(DATA_ROOT_ENV).map_or_else(Self::default, Self::with_root)
    }
}
