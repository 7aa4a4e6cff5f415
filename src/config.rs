use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Catalog search endpoint. The title is appended as the `title` query
/// parameter.
pub const DEFAULT_CATALOG_URL: &str = "https://openlibrary.org/search.json";
/// Host serving cover artwork by numeric id.
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org/b/id";
/// Prefix for work detail pages. The book key already starts with a slash.
pub const DEFAULT_DETAILS_URL: &str = "https://openlibrary.org";
/// Image shown for books the catalog has no cover for.
pub const DEFAULT_PLACEHOLDER_COVER: &str =
    "https://via.placeholder.com/150x220.png?text=No+Cover";
/// How many documents from a single response are kept for local filtering.
pub const DEFAULT_RESULT_LIMIT: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(limit) => limit,
    None => panic!("result limit must be at least one"),
};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-finder";
/// Log file written inside the data directory.
const LOG_FILE_NAME: &str = "book-finder.log";

/// Runtime settings for the finder. Defaults point at the public catalog;
/// `main` overrides individual fields from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_url: String,
    pub covers_url: String,
    pub details_url: String,
    pub placeholder_cover: String,
    /// At least one, so a successful search always has something to show.
    pub result_limit: NonZeroUsize,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            covers_url: DEFAULT_COVERS_URL.to_string(),
            details_url: DEFAULT_DETAILS_URL.to_string(),
            placeholder_cover: DEFAULT_PLACEHOLDER_COVER.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
            log_path: None,
        }
    }
}

impl Config {
    /// Where the log file goes: the explicit override if one was given,
    /// otherwise the default location in the data directory.
    pub fn resolved_log_path(&self) -> Result<PathBuf> {
        match &self.log_path {
            Some(path) => Ok(path.clone()),
            None => default_log_path(),
        }
    }
}

/// Resolve the default log file path inside the user's home.
pub fn default_log_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
