//! User settings, read from `<config_dir>/gridboard/settings.json`.
//!
//! Every field has a default, so a missing or partial file is fine. A file
//! that cannot be parsed is reported and ignored.

use crate::constants::{
    APP_DIR_NAME, DEFAULT_DROP_ORIGIN, DEFAULT_STORAGE_KEY, SETTINGS_FILE_NAME, UPLOAD_STAGGER_STEP,
};
use crate::types::Position;
use crate::upload::{HttpUploader, LocalUploader, Uploader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding `api_base`
pub const API_BASE_ENV: &str = "GRIDBOARD_API_BASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the upload service; uploads stay local when unset
    pub api_base: Option<String>,
    /// Blob-store key the collection is saved under
    pub storage_key: String,
    /// Where the collection and local uploads are kept
    pub data_dir: Option<PathBuf>,
    pub drop_origin: (f64, f64),
    pub stagger_step: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: None,
            drop_origin: DEFAULT_DROP_ORIGIN,
            stagger_step: UPLOAD_STAGGER_STEP,
        }
    }
}

impl Settings {
    /// Settings from the default location with environment overrides applied.
    pub fn load() -> Self {
        let settings = match default_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        settings.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(api_base) = lookup(API_BASE_ENV) {
            self.api_base = Some(api_base);
        }
        self
    }

    /// The configured upload service base, if a non-blank one is set.
    pub fn api_base(&self) -> Option<&str> {
        self.api_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
    }

    /// Resolved data directory: configured, then platform default, then `./.gridboard`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR_NAME)))
    }

    pub fn drop_origin(&self) -> Position {
        self.drop_origin.into()
    }

    /// HTTP uploads when a service is configured, local copies otherwise.
    pub fn uploader(&self) -> Box<dyn Uploader> {
        match self.api_base() {
            Some(base) => Box::new(HttpUploader::new(base)),
            None => Box::new(LocalUploader::in_data_dir(&self.data_dir())),
        }
    }
}

/// `<config_dir>/gridboard/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}
