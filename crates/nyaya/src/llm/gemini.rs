//! Google Gemini generateContent client.
//!
//! Requires GEMINI_API_KEY. The key travels in the `x-goog-api-key` header
//! rather than the query string so it never shows up in logged URLs.

use async_trait::async_trait;
use reqwest::header::HeaderName;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{BackendKind, Capabilities, CompletionRequest, LlmBackend, LlmError};
use super::http::{check_status, client_with_credential};
use crate::config::ProviderConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client using Google's Generative Language API.
pub struct GeminiBackend {
    endpoint: String,
    model: String,
    vision_model: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiBackend {
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        let kind = BackendKind::Gemini;
        let api_key = config.api_key().ok_or_else(|| {
            LlmError::Init(format!("{} is not set", kind.credential_var()))
        })?;
        let client = client_with_credential(HeaderName::from_static(API_KEY_HEADER), api_key)?;

        Ok(Self {
            endpoint: config.endpoint_for(kind),
            model: config.model_for(kind),
            vision_model: config.vision_model_for(kind),
            client,
        })
    }

    /// Pick the model and build the body for `request`.
    fn build_request(&self, request: &CompletionRequest) -> Result<(&str, GeminiRequest), LlmError> {
        let mut parts = vec![GeminiPart::Text {
            text: request.system.clone(),
        }];
        if !request.user.is_empty() {
            parts.push(GeminiPart::Text {
                text: request.user.clone(),
            });
        }

        let model = match &request.image {
            Some(image) => {
                parts.push(GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                });
                self.vision_model
                    .as_deref()
                    .ok_or(LlmError::VisionUnsupported(BackendKind::Gemini))?
            }
            None => self.model.as_str(),
        };

        let body = GeminiRequest {
            contents: vec![GeminiContent { role: "user", parts }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };
        Ok((model, body))
    }

    fn parse_response(response: GeminiResponse) -> Result<String, LlmError> {
        if let Some(error) = response.error {
            return Err(LlmError::Api(format!("Gemini API error: {}", error.message)));
        }

        let text: String = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse(BackendKind::Gemini));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
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
        let url = format!("{}/v1beta/models", self.endpoint);
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
        let (model, body) = self.build_request(request)?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.endpoint, model);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let parsed: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;
        Self::parse_response(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::backend::InlineImage;
    use crate::llm::test_server::serve_once;

    fn config(endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("AIza-test".to_string()),
            endpoint: Some(endpoint.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_with_image() {
        let backend = GeminiBackend::new(&config("http://x")).unwrap();
        let request = CompletionRequest::new("Extract all text.", "")
            .temperature(0.1)
            .with_image(InlineImage {
                mime_type: "image/png".to_string(),
                data: "iVBO".to_string(),
            });

        let (model, body) = backend.build_request(&request).unwrap();
        assert_eq!(model, "gemini-1.5-flash");

        let json = serde_json::to_value(body).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "Extract all text.");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_parse_joins_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "ta\n"}, {"text": "வணக்கம்"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(GeminiBackend::parse_response(response).unwrap(), "ta\nவணக்கம்");
    }

    #[test]
    fn test_parse_blocked_prompt_is_empty() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(matches!(
            GeminiBackend::parse_response(response),
            Err(LlmError::EmptyResponse(BackendKind::Gemini))
        ));
    }

    #[tokio::test]
    async fn test_complete_sends_key_header() {
        let (url, server) = serve_once(
            200,
            r#"{"candidates": [{"content": {"parts": [{"text": "hi"}]}}]}"#,
        )
        .await;
        let backend = GeminiBackend::new(&config(&url)).unwrap();

        let reply = backend
            .complete(&CompletionRequest::new("Detect.", "नमस्ते"))
            .await
            .unwrap();
        assert_eq!(reply, "hi");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1beta/models/gemini-1.5-flash:generateContent"));
        assert!(raw.to_lowercase().contains("x-goog-api-key: aiza-test"));
        assert!(!raw.contains("key=AIza-test"));
    }
}
