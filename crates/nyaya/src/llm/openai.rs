//! OpenAI-compatible chat completions client.
//!
//! Serves both OpenAI and Groq, which expose the same API shape under
//! different base URLs.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{BackendKind, Capabilities, CompletionRequest, LlmBackend, LlmError};
use super::http::{check_status, client_with_credential};
use crate::config::ProviderConfig;

/// Client for `/v1/chat/completions`.
pub struct OpenAiCompatBackend {
    kind: BackendKind,
    endpoint: String,
    model: String,
    vision_model: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: ChatContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiCompatBackend {
    /// Build a client for `kind` from its provider settings.
    ///
    /// Fails when no credential is configured or the credential cannot be
    /// used as a bearer token.
    pub fn new(kind: BackendKind, config: &ProviderConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key().ok_or_else(|| {
            LlmError::Init(format!("{} is not set", kind.credential_var()))
        })?;
        let client = client_with_credential(AUTHORIZATION, &format!("Bearer {}", api_key))?;

        Ok(Self {
            kind,
            endpoint: config.endpoint_for(kind),
            model: config.model_for(kind),
            vision_model: config.vision_model_for(kind),
            client,
        })
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> Result<ChatRequest<'a>, LlmError> {
        let (model, user_content) = match &request.image {
            Some(image) => {
                let model = self
                    .vision_model
                    .as_deref()
                    .ok_or(LlmError::VisionUnsupported(self.kind))?;
                let mut parts = Vec::with_capacity(2);
                if !request.user.is_empty() {
                    parts.push(ContentPart::Text {
                        text: &request.user,
                    });
                }
                parts.push(ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                });
                (model, ChatContent::Parts(parts))
            }
            None => (self.model.as_str(), ChatContent::Text(&request.user)),
        };

        Ok(ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: ChatContent::Text(&request.system),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        })
    }

    fn parse_response(&self, response: ChatResponse) -> Result<String, LlmError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse(self.kind))
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        if self.vision_model.is_some() {
            Capabilities::text_and_vision()
        } else {
            Capabilities::text_only()
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn probe(&self) -> Result<(), LlmError> {
        let url = format!("{}/v1/models", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        check_status(resp).await?;
        Ok(())
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = self.build_request(request)?;
        let url = format!("{}/v1/chat/completions", self.endpoint);
        debug!("POST {} (model {})", url, body.model);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        self.parse_response(parsed)
    }
}
