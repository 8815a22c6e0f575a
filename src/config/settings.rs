//! Application settings loaded from `pipeline-desk.toml`.
//!
//! ```toml
//! [backend]
//! kind = "remote"
//! api_url = "https://crm.example.com/api"
//!
//! [listing]
//! page_size = 100
//! ```
//!
//! Every section is optional; a missing file means the local store with
//! default paging.

use crate::backend::DEFAULT_PAGE_SIZE;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "pipeline-desk.toml";

/// The whole settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Which record backend to use
    #[serde(default)]
    pub backend: BackendSettings,
    /// List loading options
    #[serde(default)]
    pub listing: ListingSettings,
}

/// Record backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendSettings {
    /// Local `SQLite` store
    Local {
        /// Store URL; `DATABASE_URL` takes precedence
        #[serde(default)]
        database_url: Option<String>,
    },
    /// Hosted backend; credentials come from the environment
    Remote {
        /// Base URL of the backend API
        api_url: String,
    },
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self::Local { database_url: None }
    }
}

/// How much of each table the lists load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListingSettings {
    /// Records requested per table
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    fn validate(self) -> Result<Self> {
        if self.listing.page_size == 0 || self.listing.page_size > DEFAULT_PAGE_SIZE {
            return Err(Error::Config {
                message: format!(
                    "listing.page_size must be between 1 and {DEFAULT_PAGE_SIZE}, got {}",
                    self.listing.page_size
                ),
            });
        }
        if let BackendSettings::Remote { api_url } = &self.backend {
            if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
                return Err(Error::Config {
                    message: format!("backend.api_url must be an http(s) URL, got '{api_url}'"),
                });
            }
        }
        Ok(self)
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })?;
    settings.validate()
}

/// Loads settings from a file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// out-of-range values.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Loading settings from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads [`DEFAULT_SETTINGS_FILE`] if present, defaults otherwise.
pub fn load_default_settings() -> Result<Settings> {
    if Path::new(DEFAULT_SETTINGS_FILE).exists() {
        load_settings(DEFAULT_SETTINGS_FILE)
    } else {
        info!("No {} found, using the local store", DEFAULT_SETTINGS_FILE);
        Ok(Settings::default())
    }
}
