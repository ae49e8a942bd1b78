//! Provider registry: which backends are usable, and handles to them.
//!
//! Built once at startup from [`Config`] and shared read-only (behind an
//! `Arc`) by every request. Initialization is never retried.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::backend::{Backend, BackendKind, LlmBackend, LlmError};
use super::gemini::GeminiBackend;
use super::openai::OpenAiCompatBackend;
use crate::config::{Config, ProviderConfig};

/// Errors resolving a backend.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("{backend} is not available: {reason}")]
    Unavailable { backend: BackendKind, reason: String },

    #[error("No AI backends are available:\n{}", .diagnostics.join("\n"))]
    NoBackends { diagnostics: Vec<String> },
}

/// Initialization outcome for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    /// No credential configured
    Missing,
    /// Credential present but the client could not be initialized
    Failed { reason: String },
    Ready,
}

impl ProviderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderStatus::Ready)
    }

    /// User-facing explanation for a backend that is not ready.
    pub fn diagnostic(&self, kind: BackendKind) -> Option<String> {
        match self {
            ProviderStatus::Ready => None,
            ProviderStatus::Missing => Some(format!(
                "{} API key is missing. Set {}.",
                kind.display_name(),
                kind.credential_var()
            )),
            ProviderStatus::Failed { reason } => Some(format!(
                "{} API key found, but client failed to initialize ({}). \
                 Please check if the key is valid and active.",
                kind.display_name(),
                reason
            )),
        }
    }
}

/// Read-only map of backend handles and their statuses.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    backends: HashMap<BackendKind, Backend>,
    statuses: HashMap<BackendKind, ProviderStatus>,
}

impl ProviderRegistry {
    /// Build a client for every backend with a credential.
    ///
    /// When `config.probe_on_startup` is set each client is also checked
    /// against its provider once; a rejected credential marks it failed.
    pub async fn initialize(config: &Config) -> Self {
        let mut registry = Self::default();

        for kind in BackendKind::ALL {
            let provider = config.providers.get(kind);
            if provider.api_key().is_none() {
                registry.statuses.insert(kind, ProviderStatus::Missing);
                continue;
            }

            let status = match build_backend(kind, provider) {
                Ok(client) => {
                    let probed = if config.probe_on_startup {
                        client.probe().await
                    } else {
                        Ok(())
                    };
                    match probed {
                        Ok(()) => {
                            info!("{} client initialized ({})", kind, client.model_name());
                            registry.backends.insert(kind, Backend::new(client));
                            ProviderStatus::Ready
                        }
                        Err(e) => failed(kind, e),
                    }
                }
                Err(e) => failed(kind, e),
            };
            registry.statuses.insert(kind, status);
        }

        registry
    }

    /// Build a registry from already-constructed clients.
    ///
    /// Backends not supplied are reported as missing.
    pub fn from_backends<I>(clients: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn LlmBackend>>,
    {
        let mut registry = Self::default();
        for kind in BackendKind::ALL {
            registry.statuses.insert(kind, ProviderStatus::Missing);
        }
        for client in clients {
            let backend = Backend::new(client);
            registry.statuses.insert(backend.kind(), ProviderStatus::Ready);
            registry.backends.insert(backend.kind(), backend);
        }
        registry
    }

    /// Usable backends in preference order.
    pub fn available_backends(&self) -> Vec<Backend> {
        BackendKind::ALL
            .iter()
            .filter_map(|kind| self.backends.get(kind).cloned())
            .collect()
    }

    pub fn status(&self, kind: BackendKind) -> ProviderStatus {
        self.statuses
            .get(&kind)
            .cloned()
            .unwrap_or(ProviderStatus::Missing)
    }

    /// Status of every known backend in preference order.
    pub fn statuses(&self) -> Vec<(BackendKind, ProviderStatus)> {
        BackendKind::ALL
            .iter()
            .map(|&kind| (kind, self.status(kind)))
            .collect()
    }

    /// Look up a usable backend by identifier or display name.
    pub fn resolve(&self, name: &str) -> Result<Backend, RegistryError> {
        let kind = BackendKind::from_str(name)
            .ok_or_else(|| RegistryError::UnknownBackend(name.to_string()))?;
        self.get(kind)
    }

    pub fn get(&self, kind: BackendKind) -> Result<Backend, RegistryError> {
        match self.backends.get(&kind) {
            Some(backend) => Ok(backend.clone()),
            None => Err(RegistryError::Unavailable {
                backend: kind,
                reason: self
                    .status(kind)
                    .diagnostic(kind)
                    .unwrap_or_else(|| "not initialized".to_string()),
            }),
        }
    }

    /// First usable backend in preference order.
    pub fn default_backend(&self) -> Result<Backend, RegistryError> {
        self.available_backends()
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::NoBackends {
                diagnostics: self.diagnostics(),
            })
    }

    /// Fail unless at least one backend is usable.
    pub fn ensure_available(&self) -> Result<(), RegistryError> {
        self.default_backend().map(|_| ())
    }

    /// One line per backend that is not ready.
    ///
    /// When no credential at all is configured a single combined line
    /// explains how to fix it.
    pub fn diagnostics(&self) -> Vec<String> {
        let statuses = self.statuses();
        if statuses.iter().all(|(_, s)| *s == ProviderStatus::Missing) {
            let vars: Vec<&str> = BackendKind::ALL.iter().map(|k| k.credential_var()).collect();
            return vec![format!(
                "No AI models are available because every API key is missing. \
                 Create a .env file in the working directory and set at least one of {}.",
                vars.join(", ")
            )];
        }
        statuses
            .iter()
            .filter_map(|(kind, status)| status.diagnostic(*kind))
            .collect()
    }
}

fn build_backend(kind: BackendKind, config: &ProviderConfig) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let client: Arc<dyn LlmBackend> = match kind {
        BackendKind::OpenAi | BackendKind::Groq => {
            Arc::new(OpenAiCompatBackend::new(kind, config)?)
        }
        BackendKind::Gemini => Arc::new(GeminiBackend::new(config)?),
    };
    Ok(client)
}

fn failed(kind: BackendKind, error: LlmError) -> ProviderStatus {
    warn!("{} client failed to initialize: {}", kind, error);
    ProviderStatus::Failed {
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::ScriptedBackend;
    use crate::llm::test_server::serve_once;

    fn config_with(keys: &[(BackendKind, &str)]) -> Config {
        let mut config = Config::default();
        for (kind, key) in keys {
            config.providers.get_mut(*kind).api_key = Some(key.to_string());
        }
        config
    }

    #[tokio::test]
    async fn test_missing_vs_failed() {
        let config = config_with(&[
            (BackendKind::OpenAi, "sk-abc\ndef"),
            (BackendKind::Groq, "gsk_valid"),
        ]);
        let registry = ProviderRegistry::initialize(&config).await;

        assert!(matches!(
            registry.status(BackendKind::OpenAi),
            ProviderStatus::Failed { .. }
        ));
        assert_eq!(registry.status(BackendKind::Gemini), ProviderStatus::Missing);
        assert_eq!(registry.status(BackendKind::Groq), ProviderStatus::Ready);

        let available: Vec<_> = registry.available_backends().iter().map(|b| b.kind()).collect();
        assert_eq!(available, vec![BackendKind::Groq]);

        let diagnostics = registry.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].starts_with("OpenAI API key found, but client failed to initialize"));
        assert!(diagnostics[1].starts_with("Google Gemini API key is missing"));
    }

    #[tokio::test]
    async fn test_no_keys_combined_diagnostic() {
        let registry = ProviderRegistry::initialize(&Config::default()).await;
        assert!(registry.available_backends().is_empty());

        match registry.ensure_available() {
            Err(RegistryError::NoBackends { diagnostics }) => {
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics[0].contains("OPENAI_API_KEY"));
                assert!(diagnostics[0].contains("GEMINI_API_KEY"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_rejection_marks_failed() {
        let (url, _server) =
            serve_once(401, r#"{"error": {"message": "Invalid API Key"}}"#).await;
        let mut config = config_with(&[(BackendKind::Groq, "gsk_revoked")]);
        config.providers.groq.endpoint = Some(url);
        config.probe_on_startup = true;

        let registry = ProviderRegistry::initialize(&config).await;
        match registry.status(BackendKind::Groq) {
            ProviderStatus::Failed { reason } => assert!(reason.contains("Invalid API Key")),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn test_resolve() {
        let registry = ProviderRegistry::from_backends([
            Arc::new(ScriptedBackend::new(BackendKind::Gemini)) as Arc<dyn LlmBackend>,
        ]);

        assert_eq!(registry.resolve("Google Gemini").unwrap().kind(), BackendKind::Gemini);
        assert_eq!(registry.default_backend().unwrap().kind(), BackendKind::Gemini);
        assert!(matches!(
            registry.resolve("claude"),
            Err(RegistryError::UnknownBackend(_))
        ));
        match registry.resolve("openai") {
            Err(RegistryError::Unavailable { backend, reason }) => {
                assert_eq!(backend, BackendKind::OpenAi);
                assert!(reason.contains("missing"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
