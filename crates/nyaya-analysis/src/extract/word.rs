//! Word documents: DOCX parsed in-process, legacy DOC via `antiword`.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::process::Command;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use super::tools::{run_tool, ANTIWORD};
use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract paragraph text from a `.docx` file, one line per paragraph.
pub fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| ExtractionError::ExtractionFailed(format!("Not a valid DOCX file: {}", e)))?;
    docx_text(archive)
}

/// Extract text from a legacy `.doc` file.
///
/// Many `.doc` uploads are really DOCX containers with the wrong extension,
/// so the zip route is tried first.
pub fn extract_doc(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    if let Ok(archive) = ZipArchive::new(BufReader::new(file)) {
        debug!("{} is a zip container, parsing as DOCX", path.display());
        return docx_text(archive);
    }
    run_tool(ANTIWORD, Command::new(ANTIWORD).arg(path))
}

fn docx_text<R: Read + Seek>(mut archive: ZipArchive<R>) -> Result<String, ExtractionError> {
    let mut xml = Vec::new();
    match archive.by_name(DOCUMENT_PART) {
        Ok(mut part) => {
            part.read_to_end(&mut xml)?;
        }
        Err(ZipError::FileNotFound) => {
            return Err(ExtractionError::ExtractionFailed(format!(
                "DOCX archive has no {}",
                DOCUMENT_PART
            )))
        }
        Err(e) => {
            return Err(ExtractionError::ExtractionFailed(format!(
                "Failed to read {}: {}",
                DOCUMENT_PART, e
            )))
        }
    }
    document_xml_text(&xml)
}

/// Collect the visible text of a WordprocessingML body.
fn document_xml_text(xml: &[u8]) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut text = String::new();
    let mut buf = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = true;
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                // self-closing empty paragraph
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let run = e.unescape().map_err(|err| {
                    ExtractionError::ExtractionFailed(format!("Malformed document.xml: {}", err))
                })?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(ExtractionError::ExtractionFailed(format!(
                    "Malformed document.xml at byte {}: {}",
                    reader.buffer_position(),
                    err
                )))
            }
        }
        buf.clear();
    }

    Ok(text)
}
