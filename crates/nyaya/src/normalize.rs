//! Normalization of free-text model replies into typed values.
//!
//! Models give no schema guarantee, so every parse here is total: expected
//! "no match" cases resolve to a documented default and are logged, never
//! returned as errors.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::language::LanguageCode;

/// Explicit percentage (or "60-70%" style range) tied to the win-probability
/// label, on one line. Group 1 is the text between label and number.
static WIN_PROBABILITY_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)win\s*probability([^0-9\n]{0,40}?)(\d{1,3})(?:\.\d+)?\s*%?(?:\s*(?:-|–|to)\s*(\d{1,3})(?:\.\d+)?)?\s*%",
    )
    .unwrap()
});

static NOT_DETERMINABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)not\s+determin(?:able|ed)").unwrap());

/// Explicit "could not decide" marker tied to the same label.
static WIN_PROBABILITY_UNKNOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)win\s*probability[^\n]{0,40}?not\s+determin(?:able|ed)").unwrap()
});

/// Outcome of looking for a win probability in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum WinProbability {
    /// The analysis states an explicit percentage (0..=100).
    Estimated(u8),
    /// The analysis explicitly says the probability cannot be determined.
    NotDeterminable,
    /// No structured answer was found.
    NotFound,
}

impl WinProbability {
    pub fn percent(&self) -> Option<u8> {
        match self {
            WinProbability::Estimated(p) => Some(*p),
            _ => None,
        }
    }
}

/// Map raw language-detector output onto the supported set.
///
/// Lowercases, drops everything that is not an ASCII letter, then looks the
/// result up as a language name or code. Unmapped output falls back to
/// English with a warning. Idempotent: feeding a result's code back in yields
/// the same language.
pub fn normalize_language(raw: &str) -> LanguageCode {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();

    let lang = match cleaned.as_str() {
        "hindi" | "hi" => Some(LanguageCode::Hi),
        "tamil" | "ta" => Some(LanguageCode::Ta),
        "telugu" | "te" => Some(LanguageCode::Te),
        "bengali" | "bn" => Some(LanguageCode::Bn),
        "marathi" | "mr" => Some(LanguageCode::Mr),
        "gujarati" | "gu" => Some(LanguageCode::Gu),
        "kannada" | "kn" => Some(LanguageCode::Kn),
        "malayalam" | "ml" => Some(LanguageCode::Ml),
        "punjabi" | "pa" => Some(LanguageCode::Pa),
        "odia" | "oriya" | "or" => Some(LanguageCode::Or),
        "english" | "en" => Some(LanguageCode::En),
        _ => None,
    };

    match lang {
        Some(lang) => {
            debug!("Detected language {:?} from raw output {:?}", lang, raw);
            lang
        }
        None => {
            warn!(
                "Unrecognized language detector output {:?}, defaulting to English",
                raw
            );
            LanguageCode::En
        }
    }
}

/// Find the win-probability estimate in an analysis narrative.
///
/// An explicit percentage wins; otherwise an explicit "not determinable"
/// marker; otherwise nothing was found. A range such as "60-70%" resolves
/// to its midpoint. Out-of-range numbers count as not found, and a number
/// that follows a "not determinable" hedge is not an estimate.
pub fn extract_win_probability(analysis: &str) -> WinProbability {
    for caps in WIN_PROBABILITY_PERCENT.captures_iter(analysis) {
        // "Not determinable (fewer than 50% ...)" is a hedge, not an estimate.
        if NOT_DETERMINABLE.is_match(&caps[1]) {
            continue;
        }

        let low = caps[2].parse::<u16>().ok();
        let high = match caps.get(3) {
            Some(m) => m.as_str().parse::<u16>().ok(),
            None => low,
        };
        return match (low, high) {
            (Some(low), Some(high)) if low <= high && high <= 100 => {
                WinProbability::Estimated(((low + high) / 2) as u8)
            }
            _ => {
                warn!("Ignoring out-of-range win probability {:?}", &caps[0]);
                WinProbability::NotFound
            }
        };
    }

    if WIN_PROBABILITY_UNKNOWN.is_match(analysis) {
        return WinProbability::NotDeterminable;
    }

    debug!("No win probability found in analysis");
    WinProbability::NotFound
}

/// Split a vision-model reply into its language header and transcribed text.
///
/// The first line carries the language; the rest is the text. A reply with
/// no line break is treated entirely as text, in English.
pub fn split_language_header(reply: &str) -> (LanguageCode, String) {
    let reply = reply.trim();
    match reply.split_once('\n') {
        Some((header, body)) => (normalize_language(header), body.trim().to_string()),
        None => (LanguageCode::En, reply.to_string()),
    }
}
