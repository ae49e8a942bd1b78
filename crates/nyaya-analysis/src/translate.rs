//! Translation between supported languages through a backend.

use std::borrow::Cow;

use thiserror::Error;
use tracing::{debug, warn};

use nyaya::config::TranslationConfig;
use nyaya::llm::CompletionRequest;
use nyaya::{Backend, LanguageCode};

use crate::prompts;

#[derive(Debug, Error)]
pub enum TranslationError {
    /// The backend could not produce a translation. The untranslated text is
    /// never substituted.
    #[error("Translation from {} to {} failed: {reason}", .from.display_name(), .to.display_name())]
    Failed {
        from: LanguageCode,
        to: LanguageCode,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslationConfig,
}

impl Translator {
    pub fn new(config: TranslationConfig) -> Self {
        Self { config }
    }

    /// Translate `text` from `from` to `to`.
    ///
    /// Same-language requests return the input itself without contacting the
    /// backend.
    pub async fn translate<'a>(
        &self,
        text: &'a str,
        from: LanguageCode,
        to: LanguageCode,
        backend: &Backend,
    ) -> Result<Cow<'a, str>, TranslationError> {
        if from == to {
            return Ok(Cow::Borrowed(text));
        }

        debug!(
            "Translating {} chars from {} to {} via {}",
            text.chars().count(),
            from,
            to,
            backend.kind()
        );
        let request = CompletionRequest::new(prompts::translation(from, to), text)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens);

        match backend.complete(&request).await {
            Ok(translated) if !translated.trim().is_empty() => Ok(Cow::Owned(translated)),
            Ok(_) => Err(self.failed(from, to, "backend returned an empty translation")),
            Err(e) => Err(self.failed(from, to, &e.to_string())),
        }
    }

    pub async fn to_english<'a>(
        &self,
        text: &'a str,
        from: LanguageCode,
        backend: &Backend,
    ) -> Result<Cow<'a, str>, TranslationError> {
        self.translate(text, from, LanguageCode::En, backend).await
    }

    fn failed(&self, from: LanguageCode, to: LanguageCode, reason: &str) -> TranslationError {
        warn!("Translation error ({} to {}): {}", from, to, reason);
        TranslationError::Failed {
            from,
            to,
            reason: reason.to_string(),
        }
    }
}
