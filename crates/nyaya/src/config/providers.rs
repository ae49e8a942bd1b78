//! Per-provider connection settings.
//!
//! Everything is optional in the file; unset fields fall back to the
//! provider's built-in defaults (see [`BackendKind`]). Credentials normally
//! come from the environment and are never written back out.

use serde::{Deserialize, Serialize};

use crate::llm::BackendKind;

/// Connection settings for a single backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key. Blank values count as absent.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Model for text requests (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model for image requests (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_model: Option<String>,
    /// Treat the provider as text-only even if a vision model is known
    #[serde(default)]
    pub disable_vision: bool,
}

impl ProviderConfig {
    /// The credential, if present and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn endpoint_for(&self, kind: BackendKind) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| kind.default_endpoint().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn model_for(&self, kind: BackendKind) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| kind.default_model().to_string())
    }

    /// Vision model, or `None` when the provider cannot read images.
    pub fn vision_model_for(&self, kind: BackendKind) -> Option<String> {
        if self.disable_vision {
            return None;
        }
        self.vision_model
            .clone()
            .or_else(|| kind.default_vision_model().map(str::to_string))
    }

    /// Apply overrides for one provider from an environment lookup.
    ///
    /// Reads the provider's credential variable (e.g. `OPENAI_API_KEY`) and
    /// `NYAYA_<PROVIDER>_ENDPOINT`, `_MODEL`, `_VISION_MODEL`.
    pub(crate) fn apply_env<F>(&mut self, kind: BackendKind, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(kind.credential_var()) {
            self.api_key = Some(key);
        }

        let prefix = format!("NYAYA_{}", kind.as_str().to_uppercase());
        if let Some(val) = lookup(&format!("{}_ENDPOINT", prefix)) {
            self.endpoint = Some(val);
        }
        if let Some(val) = lookup(&format!("{}_MODEL", prefix)) {
            self.model = Some(val);
        }
        if let Some(val) = lookup(&format!("{}_VISION_MODEL", prefix)) {
            self.vision_model = Some(val);
        }
    }
}

/// Settings for every known backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub groq: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, kind: BackendKind) -> &ProviderConfig {
        match kind {
            BackendKind::OpenAi => &self.openai,
            BackendKind::Gemini => &self.gemini,
            BackendKind::Groq => &self.groq,
        }
    }

    pub fn get_mut(&mut self, kind: BackendKind) -> &mut ProviderConfig {
        match kind {
            BackendKind::OpenAi => &mut self.openai,
            BackendKind::Gemini => &mut self.gemini,
            BackendKind::Groq => &mut self.groq,
        }
    }
}
