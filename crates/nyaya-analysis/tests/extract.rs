//! Extraction against real files and a scripted backend.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nyaya::llm::mock::ScriptedBackend;
use nyaya::llm::LlmError;
use nyaya::{Backend, BackendKind, LanguageCode};
use nyaya_analysis::extract::check_binary;
use nyaya_analysis::{DocumentExtractor, DocumentFormat, ExtractionError};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_docx(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    let path = dir.join(name);
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

/// Minimal PDF with one line of Helvetica text per page.
fn write_pdf(dir: &Path, pages: &[&str]) -> PathBuf {
    let page_count = pages.len();
    let font_id = 3 + 2 * page_count;
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ),
    ];
    for (i, text) in pages.iter().enumerate() {
        let content = format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", text);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R \
             /Resources << /Font << /F1 {} 0 R >> >> >>",
            4 + 2 * i,
            font_id
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    let path = dir.join("two-pages.pdf");
    std::fs::write(&path, pdf).unwrap();
    path
}

#[tokio::test]
async fn test_pdf_pages_joined_in_order() {
    if !check_binary("pdftotext") {
        eprintln!("pdftotext not installed, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), &["First page text", "Second page text"]);
    let mock = Arc::new(ScriptedBackend::new(BackendKind::OpenAi).reply("en"));

    let result = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(result.format, DocumentFormat::Pdf);
    assert_eq!(result.page_count, Some(2));
    let lines: Vec<&str> = result
        .raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(lines, vec!["First page text", "Second page text"]);
    assert!(result.raw_text.ends_with('\n'));
    assert_eq!(result.language, LanguageCode::En);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_docx_detects_language() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(
        dir.path(),
        "notice.docx",
        &["उच्च न्यायालय में", "याचिकाकर्ता बनाम राज्य"],
    );
    let mock = Arc::new(ScriptedBackend::new(BackendKind::Gemini).reply("Hindi."));

    let result = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(result.raw_text, "उच्च न्यायालय में\nयाचिकाकर्ता बनाम राज्य\n");
    assert_eq!(result.language, LanguageCode::Hi);
    assert_eq!(result.format, DocumentFormat::Word);

    let request = mock.last_request().unwrap();
    assert_eq!(request.user, result.raw_text);
    assert_eq!(request.max_tokens, 10);
    assert!(request.image.is_none());
}

#[tokio::test]
async fn test_renamed_docx_with_doc_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(dir.path(), "old.doc", &["Short"]);
    let mock = Arc::new(ScriptedBackend::new(BackendKind::OpenAi));

    let result = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(result.raw_text, "Short\n");
    assert_eq!(result.format, DocumentFormat::LegacyWord);
    assert_eq!(result.language, LanguageCode::En);
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_detection_sample_is_bounded() {
    let dir = TempDir::new().unwrap();
    let long = "ஒப்பந்தம் ".repeat(500);
    let path = write_docx(dir.path(), "long.docx", &[&long]);
    let mock = Arc::new(ScriptedBackend::new(BackendKind::OpenAi).reply("tamil"));

    let result = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(result.language, LanguageCode::Ta);
    assert_eq!(mock.last_request().unwrap().user.chars().count(), 2000);
}

#[tokio::test]
async fn test_detection_failure_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_docx(dir.path(), "notice.docx", &["This notice is issued under Section 80 CPC."]);
    let mock = Arc::new(
        ScriptedBackend::new(BackendKind::OpenAi)
            .fail(LlmError::Api("HTTP 401 Unauthorized: bad key".to_string())),
    );

    let err = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
}

#[tokio::test]
async fn test_image_transcription() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]).unwrap();
    let mock = Arc::new(
        ScriptedBackend::new(BackendKind::Gemini).reply("ta\nமனுதாரர்\nஎதிர் மனுதாரர்"),
    );

    let result = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(result.language, LanguageCode::Ta);
    assert_eq!(result.raw_text, "மனுதாரர்\nஎதிர் மனுதாரர்");
    assert_eq!(result.format, DocumentFormat::Image);

    let image = mock.last_request().unwrap().image.unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert!(!image.data.is_empty());
}

#[tokio::test]
async fn test_failed_vision_call_is_not_empty_english() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.jpg");
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap();
    let mock = Arc::new(
        ScriptedBackend::new(BackendKind::OpenAi)
            .fail(LlmError::Connection("connection reset".to_string())),
    );

    let result = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock))
        .await;

    match result {
        Err(ExtractionError::ExtractionFailed(msg)) => assert!(msg.contains("connection reset")),
        other => panic!("expected ExtractionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_image_needs_vision_backend() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.jpeg");
    std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();
    let mock = Arc::new(ScriptedBackend::new(BackendKind::Groq).text_only());

    let err = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::VisionUnsupported(BackendKind::Groq)));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "plain text").unwrap();
    let mock = Arc::new(ScriptedBackend::new(BackendKind::OpenAi));

    let err = DocumentExtractor::default()
        .extract(&path, &Backend::new(mock.clone()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Unsupported file format: .txt");
    assert_eq!(mock.calls(), 0);
}
