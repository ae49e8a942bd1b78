//! Legal document analysis command.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::ProgressBar;
use tempfile::NamedTempFile;
use tracing::debug;

use nyaya::{Backend, LanguageCode, WinProbability};
use nyaya_analysis::{DocumentFormat, Pipeline, PipelineOutcome, PipelineRequest};

use super::AppContext;
use crate::cli::progress::spinner;

const STDIN_PATH: &str = "-";
const DISCLAIMER: &str =
    "⚖️  This is an AI assistant and not a substitute for professional legal advice.";

pub struct AnalyzeOptions {
    pub target: Option<LanguageCode>,
    /// Extension of the document read from stdin
    pub format: Option<String>,
    pub json: bool,
    pub timeout: Duration,
}

/// A document on disk, possibly a temporary copy of stdin.
///
/// The temporary file is deleted when this is dropped, on every exit path.
struct Upload {
    label: String,
    path: PathBuf,
    _temp: Option<NamedTempFile>,
}

impl Upload {
    fn open(input: &Path, format: Option<&str>) -> anyhow::Result<Self> {
        if input != Path::new(STDIN_PATH) {
            return Ok(Self {
                label: input.display().to_string(),
                path: input.to_path_buf(),
                _temp: None,
            });
        }

        let ext = format
            .context("--format is required when reading a document from stdin")?
            .trim_start_matches('.')
            .to_lowercase();
        if DocumentFormat::from_extension(&ext).is_none() {
            anyhow::bail!("Unsupported file format: .{}", ext);
        }

        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read document from stdin")?;

        let mut temp = tempfile::Builder::new()
            .prefix("nyaya-upload-")
            .suffix(&format!(".{}", ext))
            .tempfile()
            .context("Failed to create temporary file")?;
        temp.write_all(&bytes)?;
        temp.flush()?;

        Ok(Self {
            label: "<stdin>".to_string(),
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }
}

pub async fn cmd_analyze(
    ctx: &AppContext,
    backend: Backend,
    inputs: &[PathBuf],
    options: &AnalyzeOptions,
) -> anyhow::Result<()> {
    if inputs.iter().filter(|p| p.as_path() == Path::new(STDIN_PATH)).count() > 1 {
        anyhow::bail!("stdin (-) can only be given once");
    }

    let pipeline = Pipeline::new(&ctx.config);
    let mut failed = 0usize;
    let mut outcomes = Vec::new();

    for input in inputs {
        let result = match Upload::open(input, options.format.as_deref()) {
            Ok(upload) => {
                let pb = spinner(
                    format!("Extracting text from {}...", upload.label),
                    options.json,
                );
                let result = run_with_timeout(
                    &pb,
                    options.timeout,
                    process_document(&pipeline, &backend, &upload, options.target, &pb),
                )
                .await;
                result.map_err(|e| e.context(format!("Failed to analyze {}", upload.label)))
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                if options.json {
                    outcomes.push(outcome);
                } else {
                    render_outcome(&outcome);
                }
            }
            Err(e) => {
                failed += 1;
                debug!("{:?}", e);
                eprintln!("{} {:#}", style("✗").red(), e);
            }
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else if failed < inputs.len() {
        println!("\n{}", style(DISCLAIMER).dim());
    }

    if failed > 0 {
        anyhow::bail!("{} of {} documents failed", failed, inputs.len());
    }
    Ok(())
}

/// Await `work` for at most `limit`, clearing the spinner either way.
async fn run_with_timeout<T, F>(pb: &ProgressBar, limit: Duration, work: F) -> anyhow::Result<T>
where
    F: std::future::Future<Output = anyhow::Result<T>>,
{
    let result = tokio::time::timeout(limit, work)
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!("timed out after {}s", limit.as_secs())));
    pb.finish_and_clear();
    result
}

async fn process_document(
    pipeline: &Pipeline,
    backend: &Backend,
    upload: &Upload,
    target: Option<LanguageCode>,
    pb: &ProgressBar,
) -> anyhow::Result<PipelineOutcome> {
    let extraction = pipeline.extract(&upload.path, backend).await?;

    let mut request = PipelineRequest::new(backend.clone(), extraction);
    if let Some(target) = target {
        request = request.with_target(target);
    }

    let outcome = pipeline
        .run_with_progress(request, |stage| pb.set_message(format!("{}...", stage)))
        .await?;
    Ok(outcome)
}

fn render_outcome(outcome: &PipelineOutcome) {
    let extraction = &outcome.extraction;
    println!(
        "\n{} {} document, detected language: {}",
        style("✓").green(),
        extraction.format.as_str(),
        style(extraction.language).cyan()
    );
    if outcome.analysis.truncated {
        println!(
            "  {}",
            style("Document was long; only its beginning and end were analyzed").yellow()
        );
    }

    println!("\n{}", style("Legal Analysis").bold());
    println!("{}", "=".repeat(50));
    println!("{}", outcome.output.trim_end());

    if outcome.analysis.degraded {
        return;
    }
    println!("\n{}", style("Case Win Probability").bold());
    println!("  {}", render_win_probability(outcome.analysis.win_probability));
}

/// One-line rendering that keeps the three outcomes visibly distinct.
fn render_win_probability(win: WinProbability) -> String {
    const WIDTH: usize = 20;
    match win {
        WinProbability::Estimated(percent) => {
            let filled = (usize::from(percent) * WIDTH + 50) / 100;
            format!(
                "[{}{}] Estimated chance of success: {}%",
                "█".repeat(filled),
                "░".repeat(WIDTH - filled),
                percent
            )
        }
        WinProbability::NotDeterminable => {
            "The AI could not determine a specific win probability for this case.".to_string()
        }
        WinProbability::NotFound => {
            "No win probability estimate was found in the analysis.".to_string()
        }
    }
}
