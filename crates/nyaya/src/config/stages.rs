//! Generation parameters for each pipeline stage.

use serde::{Deserialize, Serialize};

/// Language detection for locally parsed documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Texts shorter than this (trimmed, in characters) are assumed English
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    /// Leading characters sent to the detector
    #[serde(default = "default_sample_chars")]
    pub sample_chars: usize,
}

fn default_min_chars() -> usize {
    20
}

fn default_sample_chars() -> usize {
    2000
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            sample_chars: default_sample_chars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_translation_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_translation_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            temperature: default_translation_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Legal analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum characters of document text sent for analysis
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_analysis_temperature")]
    pub temperature: f32,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Custom instruction replacing the built-in analysis prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_max_input_chars() -> usize {
    4000
}

fn default_analysis_temperature() -> f32 {
    0.5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            temperature: default_analysis_temperature(),
            max_tokens: default_max_tokens(),
            prompt: None,
        }
    }
}
