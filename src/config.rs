use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};

use crate::tracker::TrackerConfig;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Runtime configuration. Read once at startup; nothing is written back.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    /// Shortens the simulated night to half a second.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            request_timeout_secs: 20,
            debug: false,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("debug", &self.debug)
            .finish()
    }
}

impl AppConfig {
    /// `MOONI_CONFIG` (JSON file) if set, then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("MOONI_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config in {}", path.display()))
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty("MOONI_MODEL") {
            self.model = model;
        }
        if let Some(base) = non_empty("MOONI_API_BASE") {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = non_empty("MOONI_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(value) = non_empty("MOONI_DEBUG") {
            self.debug = value == "1" || value.eq_ignore_ascii_case("true");
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        if self.debug {
            TrackerConfig::debug()
        } else {
            TrackerConfig::default()
        }
    }
}
