//! HTTP plumbing shared by the provider clients.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;

use super::backend::LlmError;

/// Build a client carrying the credential as a default header.
///
/// This is the local initialization probe: a credential that cannot be sent
/// as a header value (control characters, line breaks) fails here.
pub(crate) fn client_with_credential(
    header: HeaderName,
    value: &str,
) -> Result<Client, LlmError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| LlmError::Init("API key contains invalid characters".to_string()))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header, value);

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| LlmError::Init(format!("Failed to create HTTP client: {}", e)))
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the human-readable message out of an error body, if it has the
/// usual `{"error": {"message": ...}}` shape.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Pass through successful responses; turn anything else into `LlmError::Api`.
pub(crate) async fn check_status(resp: Response) -> Result<Response, LlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Api(format!("HTTP {}: {}", status, error_message(&body))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    #[test]
    fn test_error_message_extracts_nested_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn test_invalid_credential_fails_init() {
        let err = client_with_credential(AUTHORIZATION, "Bearer sk-abc\ndef").unwrap_err();
        assert!(matches!(err, LlmError::Init(_)));
        assert!(client_with_credential(AUTHORIZATION, "Bearer sk-abc").is_ok());
    }
}
