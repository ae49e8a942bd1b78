//! Instruction templates sent to the backends.

use nyaya::LanguageCode;

pub const LANGUAGE_DETECTION: &str = "You are a language detection expert. \
Analyze the following text and respond with ONLY the language code. \
Valid codes are: en (English), hi (Hindi), ta (Tamil), te (Telugu), bn (Bengali), \
mr (Marathi), gu (Gujarati), kn (Kannada), ml (Malayalam), pa (Punjabi), or (Odia/Oriya). \
Respond with ONLY the language code, nothing else.";

pub const IMAGE_TRANSCRIPTION: &str = "Extract all text from this image and identify what \
language it's in. First line should be just the language code \
(en, hi, ta, te, bn, mr, gu, kn, ml, pa, or). Then extract all the text.";

pub const LEGAL_ANALYSIS: &str = "You are an Indian legal advisor. Analyze the provided legal \
document and provide a comprehensive analysis with the following sections:

1. 🧾 Case Summary: Explain what the case is about in simple language.
2. 📜 Relevant Laws: List the relevant laws, sections, and precedents that apply to this case.
3. 💡 Legal Advice: Provide practical advice for a common person dealing with this legal matter.
4. 📈 Win Probability: Estimate the chance of winning this case as a percentage, written \
exactly as \"Win Probability: <number>%\". If it cannot be estimated from the information \
provided, write \"Win Probability: Not determinable\".

Note: The document may be truncated due to length. Focus on analyzing the visible portions.";

/// Translation instruction naming both languages in full.
pub fn translation(from: LanguageCode, to: LanguageCode) -> String {
    format!(
        "You are a professional translator from {} to {}. \
         Translate the following text accurately, preserving all information.",
        from.display_name(),
        to.display_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_uses_display_names() {
        let prompt = translation(LanguageCode::Ta, LanguageCode::En);
        assert!(prompt.contains("from Tamil to English"));
        assert!(!prompt.contains(" ta "));
    }

    #[test]
    fn test_analysis_lists_sections() {
        for section in ["Case Summary", "Relevant Laws", "Legal Advice", "Win Probability"] {
            assert!(LEGAL_ANALYSIS.contains(section));
        }
    }
}
