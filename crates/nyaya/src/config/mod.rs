//! Application configuration.
//!
//! Loaded once at startup: an optional config file (TOML, YAML or JSON,
//! picked by extension) followed by environment overrides. The resulting
//! [`Config`] is passed explicitly to every component that needs it.
//!
//! Supported env vars:
//! - `OPENAI_API_KEY`, `GEMINI_API_KEY`, `GROQ_API_KEY`: provider credentials
//! - `NYAYA_<PROVIDER>_ENDPOINT`, `_MODEL`, `_VISION_MODEL`: per-provider overrides
//! - `NYAYA_PROBE_BACKENDS`: "true" or "1" to verify credentials remotely at startup
//! - `NYAYA_ANALYSIS_MAX_CHARS`: max document chars sent for analysis
//! - `NYAYA_ANALYSIS_PROMPT`: custom analysis instruction

mod providers;
mod stages;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::llm::BackendKind;

pub use providers::{ProviderConfig, ProvidersConfig};
pub use stages::{AnalysisConfig, DetectionConfig, TranslationConfig};

/// Base name searched for during discovery (`nyaya.toml`, `nyaya.yaml`, ...).
pub const CONFIG_NAME: &str = "nyaya";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings per backend
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Verify each credential against the provider API when the registry is built
    #[serde(default)]
    pub probe_on_startup: bool,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Where this config was loaded from, if anywhere
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or a discovered file, then apply
    /// environment overrides. A missing discovered file is not an error.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover().await,
        };

        let config = match path {
            Some(path) => Self::load_from_path(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        Ok(config.with_env_overrides())
    }

    /// Use prefer to find a `nyaya` config file in the standard locations.
    pub async fn discover() -> Option<PathBuf> {
        match prefer::load(CONFIG_NAME).await {
            Ok(found) => found.source_path().map(|p| p.to_path_buf()),
            Err(e) => {
                debug!("Config discovery found nothing: {}", e);
                None
            }
        }
    }

    /// Load configuration from a specific file path (no env overrides).
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "json" => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))
            }
            _ => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for kind in BackendKind::ALL {
            self.providers.get_mut(kind).apply_env(kind, &lookup);
        }

        if let Some(val) = lookup("NYAYA_PROBE_BACKENDS") {
            self.probe_on_startup = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Some(val) = lookup("NYAYA_ANALYSIS_MAX_CHARS") {
            if let Ok(n) = val.parse() {
                self.analysis.max_input_chars = n;
            }
        }
        if let Some(val) = lookup("NYAYA_ANALYSIS_PROMPT") {
            self.analysis.prompt = Some(val);
        }
        self
    }
}
