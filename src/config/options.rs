// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::error::Result;

/// Runtime knobs. Everything has a default; the file only needs the fields it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub api_base: String,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub workers: usize,
    /// Bump the usage counter before each fetch.
    pub count_usage: bool,
    /// Last page snapshot opened from the GUI.
    pub last_page: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            api_base: s!(API_BASE),
            debounce_ms: DEBOUNCE_MS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            workers: WORKERS,
            count_usage: true,
            last_page: None,
        }
    }
}

impl Options {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn store_dir() -> PathBuf {
        PathBuf::from(STORE_DIR)
    }

    pub fn default_path() -> PathBuf {
        Self::store_dir().join(OPTIONS_FILE)
    }

    /// Missing file → defaults. A file that exists but doesn't parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
