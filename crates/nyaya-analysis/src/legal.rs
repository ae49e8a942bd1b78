//! Legal analysis of a document's English text.
//!
//! This is the one stage that never fails: a backend error becomes a
//! degraded result whose narrative explains what went wrong.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{info, warn};

use nyaya::config::AnalysisConfig;
use nyaya::llm::CompletionRequest;
use nyaya::normalize::extract_win_probability;
use nyaya::{Backend, WinProbability};

use crate::prompts;

/// Inserted between the kept head and tail of an over-long document.
pub const TRUNCATION_MARKER: &str = "\n...[Content truncated due to length]...\n";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Analysis text as returned by the backend, or the failure description
    pub narrative: String,
    /// Parsed from `narrative`
    pub win_probability: WinProbability,
    /// The backend call failed and `narrative` describes the error
    pub degraded: bool,
    /// The input was shortened before analysis
    pub truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LegalAnalyzer {
    config: AnalysisConfig,
}

impl LegalAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    fn instruction(&self) -> &str {
        self.config
            .prompt
            .as_deref()
            .unwrap_or(prompts::LEGAL_ANALYSIS)
    }

    pub async fn analyze(&self, text: &str, backend: &Backend) -> AnalysisResult {
        let input = truncate_middle(text, self.config.max_input_chars);
        let truncated = matches!(input, Cow::Owned(_));
        if truncated {
            warn!(
                "Text is too large ({} chars), truncating to {} chars",
                text.chars().count(),
                self.config.max_input_chars
            );
        }

        let request = CompletionRequest::new(self.instruction(), input.into_owned())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens);

        match backend.complete(&request).await {
            Ok(narrative) => {
                let win_probability = extract_win_probability(&narrative);
                info!("Analysis complete, win probability: {:?}", win_probability);
                AnalysisResult {
                    narrative,
                    win_probability,
                    degraded: false,
                    truncated,
                }
            }
            Err(e) => {
                warn!("Legal analysis error: {}", e);
                AnalysisResult {
                    narrative: format!("Error analyzing document: {}", e),
                    win_probability: WinProbability::NotFound,
                    degraded: true,
                    truncated,
                }
            }
        }
    }
}

/// Keep the head and tail of `text` around [`TRUNCATION_MARKER`] so the
/// result is at most `max_chars` characters.
///
/// Text within the limit is returned unchanged. A limit too small to hold
/// the marker keeps only the first `max_chars` characters.
pub fn truncate_middle(text: &str, max_chars: usize) -> Cow<'_, str> {
    let len = text.chars().count();
    if len <= max_chars {
        return Cow::Borrowed(text);
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars < marker_len {
        return Cow::Borrowed(&text[..byte_offset(text, max_chars)]);
    }

    let budget = max_chars - marker_len;
    let head = budget / 2;
    let tail = budget - head;

    let head_end = byte_offset(text, head);
    let tail_start = byte_offset(text, len - tail);

    let mut out = String::with_capacity(head_end + TRUNCATION_MARKER.len() + text.len() - tail_start);
    out.push_str(&text[..head_end]);
    out.push_str(TRUNCATION_MARKER);
    out.push_str(&text[tail_start..]);
    Cow::Owned(out)
}

/// Byte index of the `n`th character.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map(|(i, _)| i).unwrap_or(text.len())
}
