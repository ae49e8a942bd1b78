//! One document through extraction, translation and analysis.
//!
//! Stages run strictly in order, each feeding the next:
//! 1. translate the extracted text to English (skipped for English)
//! 2. analyze the English text
//! 3. translate the analysis to the target language (skipped for English
//!    targets and for degraded analyses)
//!
//! Translation failures abort the document. Analysis never does.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use nyaya::{Backend, Config, LanguageCode};

use crate::extract::{DocumentExtractor, ExtractionError, ExtractionResult};
use crate::legal::{AnalysisResult, LegalAnalyzer};
use crate::translate::{TranslationError, Translator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Progress points reported by [`Pipeline::run_with_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TranslatingToEnglish(LanguageCode),
    Analyzing,
    TranslatingToTarget(LanguageCode),
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::TranslatingToEnglish(from) => {
                write!(f, "Translating document from {} to English", from)
            }
            Stage::Analyzing => write!(f, "Analyzing the legal document"),
            Stage::TranslatingToTarget(to) => write!(f, "Translating analysis to {}", to),
        }
    }
}

/// Everything needed to process one uploaded document.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub backend: Backend,
    pub extraction: ExtractionResult,
    /// Output language; defaults to the detected language when `None`
    pub target: Option<LanguageCode>,
}

impl PipelineRequest {
    pub fn new(backend: Backend, extraction: ExtractionResult) -> Self {
        Self {
            backend,
            extraction,
            target: None,
        }
    }

    pub fn with_target(mut self, target: LanguageCode) -> Self {
        self.target = Some(target);
        self
    }

    /// Requested target, or the document's own language.
    pub fn target_language(&self) -> LanguageCode {
        self.target.unwrap_or(self.extraction.language)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub extraction: ExtractionResult,
    /// Text that was analyzed
    pub english_text: String,
    /// English analysis; its win probability is what gets reported
    pub analysis: AnalysisResult,
    /// Analysis in the target language
    pub output: String,
    pub target: LanguageCode,
}

/// Stateless orchestrator; build once from config and reuse across requests.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    extractor: DocumentExtractor,
    translator: Translator,
    analyzer: LegalAnalyzer,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: DocumentExtractor::new(config.detection.clone()),
            translator: Translator::new(config.translation.clone()),
            analyzer: LegalAnalyzer::new(config.analysis.clone()),
        }
    }

    pub async fn extract(
        &self,
        path: &Path,
        backend: &Backend,
    ) -> Result<ExtractionResult, PipelineError> {
        Ok(self.extractor.extract(path, backend).await?)
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineOutcome, PipelineError> {
        self.run_with_progress(request, |_| {}).await
    }

    /// Run the post-extraction stages, calling `on_stage` as each begins.
    pub async fn run_with_progress<F>(
        &self,
        request: PipelineRequest,
        mut on_stage: F,
    ) -> Result<PipelineOutcome, PipelineError>
    where
        F: FnMut(Stage) + Send,
    {
        let target = request.target_language();
        let PipelineRequest {
            backend,
            extraction,
            ..
        } = request;
        let detected = extraction.language;

        let english_text = if detected.is_english() {
            extraction.raw_text.clone()
        } else {
            on_stage(Stage::TranslatingToEnglish(detected));
            self.translator
                .to_english(&extraction.raw_text, detected, &backend)
                .await?
                .into_owned()
        };
        debug!(
            "Extracted {} chars ({}), {} chars for analysis",
            extraction.raw_text.chars().count(),
            detected.code(),
            english_text.chars().count()
        );

        on_stage(Stage::Analyzing);
        let analysis = self.analyzer.analyze(&english_text, &backend).await;

        let output = if target.is_english() || analysis.degraded {
            analysis.narrative.clone()
        } else {
            on_stage(Stage::TranslatingToTarget(target));
            self.translator
                .translate(&analysis.narrative, LanguageCode::En, target, &backend)
                .await?
                .into_owned()
        };

        info!(
            "Processed {} document ({} -> {})",
            extraction.format.as_str(),
            detected.code(),
            target.code()
        );
        Ok(PipelineOutcome {
            extraction,
            english_text,
            analysis,
            output,
            target,
        })
    }
}
