//! Document processing for nyaya.
//!
//! Extracts text from uploaded legal documents, translates it, and produces
//! a plain-language legal analysis through whichever backend the caller picks.

pub mod extract;
pub mod legal;
pub mod pipeline;
mod prompts;
pub mod translate;

pub use extract::{DocumentExtractor, DocumentFormat, ExtractionError, ExtractionResult};
pub use legal::{AnalysisResult, LegalAnalyzer};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome, PipelineRequest, Stage};
pub use translate::{TranslationError, Translator};
