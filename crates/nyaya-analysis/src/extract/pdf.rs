//! PDF text via Poppler's `pdftotext`.

use std::path::Path;
use std::process::Command;

use super::tools::{run_tool, PDFTOTEXT};
use super::ExtractionError;

/// Page separator emitted by `pdftotext`.
const FORM_FEED: char = '\u{c}';

/// Extract text from every page, in order.
///
/// Returns the concatenated text (each page followed by a newline) and the
/// page count.
pub fn extract_pdf(path: &Path) -> Result<(String, usize), ExtractionError> {
    let stdout = run_tool(
        PDFTOTEXT,
        Command::new(PDFTOTEXT)
            .args(["-layout", "-enc", "UTF-8"])
            .arg(path)
            .arg("-"),
    )?;
    Ok(join_pages(&stdout))
}

/// Split `pdftotext` output into pages and join them with newlines.
fn join_pages(output: &str) -> (String, usize) {
    let mut pages: Vec<&str> = output.split(FORM_FEED).collect();
    // pdftotext terminates the last page with a form feed too
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }

    let mut text = String::with_capacity(output.len());
    for page in &pages {
        text.push_str(page.trim_end_matches(['\n', '\r']));
        text.push('\n');
    }
    (text, pages.len())
}
