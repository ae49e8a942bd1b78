//! Supported document and output languages.

use serde::{Deserialize, Serialize};

/// One of the fixed set of languages the assistant reads and writes.
///
/// Anything a model reports outside this set is collapsed to [`LanguageCode::En`]
/// by [`crate::normalize::normalize_language`]; no other value is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Hi,
    Ta,
    Te,
    Bn,
    Mr,
    Gu,
    Kn,
    Ml,
    Pa,
    Or,
}

impl LanguageCode {
    /// Every supported language, in the order offered to users.
    pub const ALL: [LanguageCode; 11] = [
        LanguageCode::En,
        LanguageCode::Hi,
        LanguageCode::Ta,
        LanguageCode::Te,
        LanguageCode::Bn,
        LanguageCode::Mr,
        LanguageCode::Gu,
        LanguageCode::Kn,
        LanguageCode::Ml,
        LanguageCode::Pa,
        LanguageCode::Or,
    ];

    /// Two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Hi => "hi",
            LanguageCode::Ta => "ta",
            LanguageCode::Te => "te",
            LanguageCode::Bn => "bn",
            LanguageCode::Mr => "mr",
            LanguageCode::Gu => "gu",
            LanguageCode::Kn => "kn",
            LanguageCode::Ml => "ml",
            LanguageCode::Pa => "pa",
            LanguageCode::Or => "or",
        }
    }

    /// English display name, used in prompts and in the UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Hi => "Hindi",
            LanguageCode::Ta => "Tamil",
            LanguageCode::Te => "Telugu",
            LanguageCode::Bn => "Bengali",
            LanguageCode::Mr => "Marathi",
            LanguageCode::Gu => "Gujarati",
            LanguageCode::Kn => "Kannada",
            LanguageCode::Ml => "Malayalam",
            LanguageCode::Pa => "Punjabi",
            LanguageCode::Or => "Odia",
        }
    }

    /// Parse an exact two-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }

    /// Parse a display name, case-insensitively. "Oriya" is accepted for Odia.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("oriya") {
            return Some(LanguageCode::Or);
        }
        Self::ALL
            .into_iter()
            .find(|l| l.display_name().eq_ignore_ascii_case(name))
    }

    /// Parse either a code or a display name (for command-line input).
    pub fn from_str(s: &str) -> Option<Self> {
        Self::from_code(&s.trim().to_lowercase()).or_else(|| Self::from_name(s))
    }

    pub fn is_english(&self) -> bool {
        *self == LanguageCode::En
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
