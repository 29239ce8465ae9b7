//! Engine configuration

use crate::Allowlist;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How far back the selection snapshot reaches
    pub selection_window_secs: u64,
    /// How far back the permission probe reaches
    pub probe_window_secs: u64,
    /// Packages allowlisted on top of the built-in list
    pub extra_allowlisted: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection_window_secs: 1000,
            probe_window_secs: 24 * 60 * 60,
            extra_allowlisted: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        info!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Load the user config if one exists, otherwise defaults
    pub fn load_default() -> Result<Self> {
        let path = crate::config_path();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn selection_window_ms(&self) -> i64 {
        secs_to_ms(self.selection_window_secs)
    }

    pub fn probe_window_ms(&self) -> i64 {
        secs_to_ms(self.probe_window_secs)
    }

    /// Built-in allowlist merged with `extra_allowlisted`
    pub fn allowlist(&self) -> Allowlist {
        Allowlist::with_extra(self.extra_allowlisted.iter().cloned())
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)
}
