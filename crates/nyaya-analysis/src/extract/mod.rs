//! Document extraction: text plus detected language for an uploaded file.
//!
//! PDFs and Word documents are parsed locally and their language is asked of
//! the backend afterwards. Images go to a vision-capable backend, which
//! transcribes the text and reports the language in one reply.

mod pdf;
mod tools;
mod word;

use std::path::{Path, PathBuf};

use base64::Engine;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use nyaya::config::DetectionConfig;
use nyaya::llm::{CompletionRequest, InlineImage, LlmError};
use nyaya::normalize::{normalize_language, split_language_header};
use nyaya::{Backend, BackendKind, LanguageCode};

use crate::prompts;

pub use pdf::extract_pdf;
pub use tools::{check_binary, check_tools, ToolStatus, ANTIWORD, PDFTOTEXT};
pub use word::{extract_doc, extract_docx};

/// Errors from document extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("{tool} not found. {hint}")]
    ToolNotFound {
        tool: &'static str,
        hint: &'static str,
    },

    #[error("{0} cannot read images; choose a backend with a vision model")]
    VisionUnsupported(BackendKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    fn backend(stage: &str, error: LlmError) -> Self {
        ExtractionError::ExtractionFailed(format!("{} failed: {}", stage, error))
    }
}

/// Supported upload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    /// Office Open XML (.docx)
    Word,
    /// Binary Word 97-2003 (.doc)
    LegacyWord,
    Image,
}

impl DocumentFormat {
    /// Extensions accepted for each format, lowercase.
    pub const EXTENSIONS: [(&'static str, DocumentFormat); 9] = [
        ("pdf", DocumentFormat::Pdf),
        ("docx", DocumentFormat::Word),
        ("doc", DocumentFormat::LegacyWord),
        ("jpg", DocumentFormat::Image),
        ("jpeg", DocumentFormat::Image),
        ("png", DocumentFormat::Image),
        ("bmp", DocumentFormat::Image),
        ("tiff", DocumentFormat::Image),
        ("tif", DocumentFormat::Image),
    ];

    /// Format for a bare extension, case-insensitive, with or without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| *format)
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            ExtractionError::UnsupportedFormat(if ext.is_empty() {
                "(no extension)".to_string()
            } else {
                format!(".{}", ext)
            })
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Word => "Word",
            DocumentFormat::LegacyWord => "Word 97-2003",
            DocumentFormat::Image => "image",
        }
    }
}

/// Text and language of one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub raw_text: String,
    pub language: LanguageCode,
    pub format: DocumentFormat,
    /// Pages in the source, when the format has pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

/// Turns uploaded files into [`ExtractionResult`]s.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor {
    detection: DetectionConfig,
}

impl DocumentExtractor {
    pub fn new(detection: DetectionConfig) -> Self {
        Self { detection }
    }

    /// Extract text from `path` and detect its language using `backend`.
    pub async fn extract(
        &self,
        path: &Path,
        backend: &Backend,
    ) -> Result<ExtractionResult, ExtractionError> {
        let format = DocumentFormat::from_path(path)?;
        info!("Extracting {} document {}", format.as_str(), path.display());

        if format == DocumentFormat::Image {
            return self.extract_image(path, backend).await;
        }

        let (raw_text, page_count) = parse_local(path.to_path_buf(), format).await?;
        debug!("Parsed {} chars from {}", raw_text.len(), path.display());
        let language = self.detect_language(&raw_text, backend).await?;

        Ok(ExtractionResult {
            raw_text,
            language,
            format,
            page_count,
        })
    }

    /// Ask the backend which language `text` is in.
    ///
    /// Text too short to classify is assumed English without a request.
    pub async fn detect_language(
        &self,
        text: &str,
        backend: &Backend,
    ) -> Result<LanguageCode, ExtractionError> {
        if text.trim().chars().count() < self.detection.min_chars {
            debug!("Text too short for detection, assuming English");
            return Ok(LanguageCode::En);
        }

        let sample: String = text.chars().take(self.detection.sample_chars).collect();
        let request = CompletionRequest::new(prompts::LANGUAGE_DETECTION, sample)
            .temperature(0.1)
            .max_tokens(10);

        let reply = backend
            .complete(&request)
            .await
            .map_err(|e| ExtractionError::backend("Language detection", e))?;
        debug!("Raw detected language: {:?}", reply);
        Ok(normalize_language(&reply))
    }

    async fn extract_image(
        &self,
        path: &Path,
        backend: &Backend,
    ) -> Result<ExtractionResult, ExtractionError> {
        if !backend.supports_vision() {
            return Err(ExtractionError::VisionUnsupported(backend.kind()));
        }

        let bytes = tokio::fs::read(path).await?;
        let mime_type = image_mime_type(&bytes, path);
        let image = InlineImage {
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        };

        let request = CompletionRequest::new(prompts::IMAGE_TRANSCRIPTION, "")
            .temperature(0.1)
            .max_tokens(4000)
            .with_image(image);

        let reply = backend.complete(&request).await.map_err(|e| {
            warn!("Vision extraction failed for {}: {}", path.display(), e);
            ExtractionError::backend("Image transcription", e)
        })?;

        let (language, raw_text) = split_language_header(&reply);
        Ok(ExtractionResult {
            raw_text,
            language,
            format: DocumentFormat::Image,
            page_count: None,
        })
    }
}

/// Run the blocking local parsers off the async runtime.
async fn parse_local(
    path: PathBuf,
    format: DocumentFormat,
) -> Result<(String, Option<usize>), ExtractionError> {
    tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => extract_pdf(&path).map(|(text, pages)| (text, Some(pages))),
        DocumentFormat::Word => extract_docx(&path).map(|text| (text, None)),
        DocumentFormat::LegacyWord => extract_doc(&path).map(|text| (text, None)),
        DocumentFormat::Image => Err(ExtractionError::UnsupportedFormat(
            "images have no local parser".to_string(),
        )),
    })
    .await
    .map_err(|e| ExtractionError::ExtractionFailed(format!("Parser task failed: {}", e)))?
}

/// MIME type sniffed from content, falling back to the extension.
fn image_mime_type(bytes: &[u8], path: &Path) -> &'static str {
    if let Some(kind) = infer::get(bytes) {
        if kind.mime_type().starts_with("image/") {
            return kind.mime_type();
        }
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("petition.PDF")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b/notice.docx")).unwrap(),
            DocumentFormat::Word
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("old.doc")).unwrap(),
            DocumentFormat::LegacyWord
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("scan.TIF")).unwrap(),
            DocumentFormat::Image
        );
        assert_eq!(DocumentFormat::from_extension(".jpeg"), Some(DocumentFormat::Image));
    }

    #[test]
    fn test_unsupported_format() {
        match DocumentFormat::from_path(Path::new("notes.txt")) {
            Err(ExtractionError::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            DocumentFormat::from_path(Path::new("README")),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_image_mime_type() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(image_mime_type(&png, Path::new("scan.jpg")), "image/png");
        assert_eq!(image_mime_type(b"garbage", Path::new("scan.PNG")), "image/png");
        assert_eq!(image_mime_type(b"garbage", Path::new("scan.jpeg")), "image/jpeg");
    }
}
