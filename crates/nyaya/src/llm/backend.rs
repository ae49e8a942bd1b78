//! Backend abstraction shared by every AI provider.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client could not be constructed from the configured credential
    #[error("Initialization failed: {0}")]
    Init(String),

    /// Failed to connect to the provider
    #[error("Connection error: {0}")]
    Connection(String),

    /// Provider returned a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Reply could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reply decoded but carried no text
    #[error("Empty response from {0}")]
    EmptyResponse(BackendKind),

    /// An image was sent to a backend with no vision model
    #[error("{0} has no vision model configured")]
    VisionUnsupported(BackendKind),
}

/// Known AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI chat completions API
    OpenAi,
    /// Google Gemini generateContent API
    Gemini,
    /// Groq (OpenAI-compatible API)
    Groq,
}

impl BackendKind {
    /// Every provider, in order of preference.
    pub const ALL: [BackendKind; 3] = [BackendKind::OpenAi, BackendKind::Gemini, BackendKind::Groq];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Gemini => "gemini",
            BackendKind::Groq => "groq",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "OpenAI",
            BackendKind::Gemini => "Google Gemini",
            BackendKind::Groq => "Groq",
        }
    }

    /// Resolve an identifier or display name, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(BackendKind::OpenAi),
            "gemini" | "google gemini" | "google" => Some(BackendKind::Gemini),
            "groq" => Some(BackendKind::Groq),
            _ => None,
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "OPENAI_API_KEY",
            BackendKind::Gemini => "GEMINI_API_KEY",
            BackendKind::Groq => "GROQ_API_KEY",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "https://api.openai.com",
            BackendKind::Gemini => "https://generativelanguage.googleapis.com",
            BackendKind::Groq => "https://api.groq.com/openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "gpt-4o-mini",
            BackendKind::Gemini => "gemini-1.5-flash",
            BackendKind::Groq => "llama-3.1-70b-versatile",
        }
    }

    /// Default image-capable model; Groq is text-only unless one is configured.
    pub fn default_vision_model(&self) -> Option<&'static str> {
        match self {
            BackendKind::OpenAi => Some("gpt-4o-mini"),
            BackendKind::Gemini => Some("gemini-1.5-flash"),
            BackendKind::Groq => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What kinds of input a backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub text: bool,
    pub vision: bool,
}

impl Capabilities {
    pub fn text_only() -> Self {
        Self {
            text: true,
            vision: false,
        }
    }

    pub fn text_and_vision() -> Self {
        Self {
            text: true,
            vision: true,
        }
    }
}

/// Base64-encoded image attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// `data:` URL form used by OpenAI-compatible APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// A single instruction + input exchange with a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instruction text
    pub system: String,
    /// Document text or other user input
    pub user: String,
    pub image: Option<InlineImage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            image: None,
            temperature: 0.3,
            max_tokens: 1000,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Trait implemented by every provider client.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Which provider this client talks to.
    fn kind(&self) -> BackendKind;

    fn capabilities(&self) -> Capabilities;

    /// Model used for text requests.
    fn model_name(&self) -> &str;

    /// Verify the credential against the provider.
    async fn probe(&self) -> Result<(), LlmError>;

    /// Send one request and return the reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Handle to an initialized backend, cheap to clone and share across requests.
#[derive(Clone)]
pub struct Backend {
    kind: BackendKind,
    capabilities: Capabilities,
    client: Arc<dyn LlmBackend>,
}

impl Backend {
    pub fn new(client: Arc<dyn LlmBackend>) -> Self {
        Self {
            kind: client.kind(),
            capabilities: client.capabilities(),
            client,
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn supports_vision(&self) -> bool {
        self.capabilities.vision
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!(
            "Sending request to {} ({} chars{})",
            self.kind,
            request.user.len(),
            if request.image.is_some() { ", with image" } else { "" }
        );
        let start = Instant::now();
        let result = self.client.complete(request).await;
        debug!(
            "{} replied in {}ms (ok: {})",
            self.kind,
            start.elapsed().as_millis(),
            result.is_ok()
        );
        result
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("capabilities", &self.capabilities)
            .field("model", &self.client.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!(BackendKind::from_str("openai"), Some(BackendKind::OpenAi));
        assert_eq!(BackendKind::from_str(" OpenAI "), Some(BackendKind::OpenAi));
        assert_eq!(
            BackendKind::from_str("Google Gemini"),
            Some(BackendKind::Gemini)
        );
        assert_eq!(BackendKind::from_str("GROQ"), Some(BackendKind::Groq));
        assert_eq!(BackendKind::from_str("OpenAI (GPT-3.5)"), None);
        assert_eq!(BackendKind::from_str("claude"), None);
    }

    #[test]
    fn test_identifiers_round_trip() {
        for kind in BackendKind::ALL {
            assert_eq!(BackendKind::from_str(kind.as_str()), Some(kind));
            assert_eq!(BackendKind::from_str(kind.display_name()), Some(kind));
        }
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("sys", "user")
            .temperature(0.1)
            .max_tokens(10)
            .with_image(InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            });
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.max_tokens, 10);
        assert_eq!(
            request.image.unwrap().data_url(),
            "data:image/png;base64,AAAA"
        );
    }
}
