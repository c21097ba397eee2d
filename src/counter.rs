// src/counter.rs
// Usage counter, bumped once per prediction fetch. The free-tier limit is only
// reported; nothing is ever refused.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::consts::{COUNTER_FILE, FREE_TIER_LIMIT};
use crate::config::options::Options;
use crate::error::Result;

#[derive(Serialize, Deserialize)]
struct Stored {
    counter: u64,
}

#[derive(Clone, Debug)]
pub struct UsageCounter {
    path: PathBuf,
}

impl UsageCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        Options::store_dir().join(COUNTER_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First call ever stores and returns 1. After that, returns the stored value
    /// and stores value + 1.
    pub fn get_counter(&self) -> Result<u64> {
        let (seen, next) = match self.peek()? {
            Some(n) => (n, n + 1),
            None => (1, 1),
        };
        self.store(next)?;
        if seen > FREE_TIER_LIMIT {
            logf!("usage {seen} is past the free tier ({FREE_TIER_LIMIT}); not enforced");
        }
        Ok(seen)
    }

    pub fn peek(&self) -> Result<Option<u64>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let stored: Stored = serde_json::from_str(&text)?;
        Ok(Some(stored.counter))
    }

    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn store(&self, counter: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(&Stored { counter })?)?;
        Ok(())
    }
}
