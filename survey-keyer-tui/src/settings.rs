//! Operator settings read from `survey-keyer.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use survey_keyer::{JsonFileStore, SessionConfig, StoreError};
use thiserror::Error;

/// Settings file looked up in the working directory when none is given.
pub const SETTINGS_FILE: &str = "survey-keyer.toml";

/// Error type for loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Cannot read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`].
    #[error("Invalid settings in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Operator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name written into every saved record.
    pub operator: String,

    /// Directory holding record stores and the entry log.
    pub data_dir: PathBuf,

    /// Second-digit window in milliseconds.
    pub digit_timeout_ms: u64,

    /// Start entry with every conditional question shown.
    pub show_all: bool,

    /// Refuse saves beyond this many records per questionnaire.
    pub max_records: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operator: String::new(),
            data_dir: PathBuf::from("./data"),
            digit_timeout_ms: 500,
            show_all: false,
            max_records: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Read `path` if given, else [`SETTINGS_FILE`] if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(SETTINGS_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Session settings derived from these settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            operator: self.operator.clone(),
            digit_timeout: Duration::from_millis(self.digit_timeout_ms),
            show_all: self.show_all,
        }
    }

    /// Open the record store of a questionnaire in the data directory.
    pub fn open_store(&self, storage_key: &str) -> Result<JsonFileStore, StoreError> {
        Ok(JsonFileStore::open(&self.data_dir, storage_key)?.with_capacity_limit(self.max_records))
    }
}
