//! Persistent user settings.
//!
//! Settings are stored as TOML. A missing file is not an error: the defaults
//! are written in its place on first load.
//!
//! ```rust
//! use pdl::settings::Settings;
//!
//! # fn example() -> Result<(), pdl::Error> {
//! let dir = std::env::temp_dir().join("pdl-settings-doc");
//! let path = dir.join("settings.toml");
//! let settings = Settings::load_or_default(&path)?;
//! let task = settings.task("https://example.com/file.zip")?;
//! assert_eq!(task.worker_count(), settings.worker_count);
//! # Ok(())
//! # }
//! ```

use crate::download::DownloadTask;
use crate::error::{Error, Result};

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36 Edg/129.0.0.0";

/// Defaults applied to every new download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of parallel partitions.
    pub worker_count: usize,
    /// Directory receiving downloaded files.
    pub download_dir: PathBuf,
    /// Attempts per partition.
    pub retry_count: u32,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            worker_count: 5,
            download_dir: PathBuf::from("./Download"),
            retry_count: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Load the settings stored at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load the settings stored at `path`, writing the defaults there first
    /// when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No settings at {:?}, writing the defaults", path);
                let settings = Settings::default();
                settings.save(path)?;
                Ok(settings)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the settings to `path`, creating its parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Overwrite the file at `path` with the defaults and return them.
    pub fn reset(path: &Path) -> Result<Self> {
        let settings = Settings::default();
        settings.save(path)?;
        info!("Settings at {:?} reset to defaults", path);
        Ok(settings)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::Settings("worker_count must be at least 1".into()));
        }
        if self.retry_count == 0 {
            return Err(Error::Settings("retry_count must be at least 1".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Settings("user_agent must not be empty".into()));
        }
        HeaderValue::from_str(&self.user_agent)
            .map_err(|e| Error::Settings(format!("user_agent is not a valid header: {}", e)))?;
        Ok(())
    }

    /// Build a task for `url` using these settings.
    pub fn task(&self, url: &str) -> Result<DownloadTask> {
        let url = Url::parse(url).map_err(|e| {
            Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", url, e))
        })?;
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| Error::Settings(format!("user_agent is not a valid header: {}", e)))?;

        Ok(DownloadTask::in_directory(&url, &self.download_dir)?
            .workers(self.worker_count)
            .max_attempts(self.retry_count)
            .header(USER_AGENT, user_agent))
    }
}
