//! External command-line tools used for local parsing.

use std::process::{Command, Output};

use serde::Serialize;

use super::ExtractionError;

/// Poppler's text extractor, used for PDFs.
pub const PDFTOTEXT: &str = "pdftotext";
/// Legacy Word (.doc) text extractor.
pub const ANTIWORD: &str = "antiword";

/// Availability of one external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: &'static str,
    pub available: bool,
    /// Install instructions when missing
    pub hint: &'static str,
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn install_hint(tool: &str) -> &'static str {
    match tool {
        PDFTOTEXT => "Install with: apt install poppler-utils (or brew install poppler)",
        ANTIWORD => "Install with: apt install antiword (or brew install antiword)",
        _ => "Install it and make sure it is on PATH",
    }
}

/// Report which local parsing tools are installed.
pub fn check_tools() -> Vec<ToolStatus> {
    [PDFTOTEXT, ANTIWORD]
        .into_iter()
        .map(|name| ToolStatus {
            name,
            available: check_binary(name),
            hint: install_hint(name),
        })
        .collect()
}

/// Run `tool` and return its stdout as text.
///
/// A missing binary is reported as `ToolNotFound`; a non-zero exit as
/// `ExtractionFailed` carrying the tool's stderr.
pub(crate) fn run_tool(tool: &'static str, cmd: &mut Command) -> Result<String, ExtractionError> {
    match cmd.output() {
        Ok(output) => handle_output(tool, output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractionError::ToolNotFound {
            tool,
            hint: install_hint(tool),
        }),
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

fn handle_output(tool: &str, output: Output) -> Result<String, ExtractionError> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ExtractionError::ExtractionFailed(format!(
            "{} failed: {}",
            tool,
            stderr.trim()
        )))
    }
}
