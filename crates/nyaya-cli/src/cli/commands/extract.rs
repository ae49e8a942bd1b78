//! Text extraction command.

use std::path::Path;

use anyhow::Context;
use console::style;

use nyaya::Backend;
use nyaya_analysis::Pipeline;

use super::AppContext;
use crate::cli::progress::spinner;

pub async fn cmd_extract(
    ctx: &AppContext,
    backend: Backend,
    file: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(&ctx.config);

    let pb = spinner(format!("Extracting text from {}...", file.display()), json);
    let result = pipeline.extract(file, &backend).await;
    pb.finish_and_clear();
    let result = result.with_context(|| format!("Failed to extract {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {} ({} document{})",
        style("✓").green(),
        file.display(),
        result.format.as_str(),
        result
            .page_count
            .map(|n| format!(", {} page{}", n, if n == 1 { "" } else { "s" }))
            .unwrap_or_default()
    );
    println!(
        "  {} {}",
        style("Detected language:").cyan(),
        result.language
    );
    println!("{}", "-".repeat(50));
    println!("{}", result.raw_text.trim_end());
    Ok(())
}
