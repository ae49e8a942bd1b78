//! Backend and tool availability check command.

use console::style;

use nyaya::llm::ProviderStatus;
use nyaya_analysis::extract::check_tools;

use super::AppContext;

/// Show the status of every AI backend and local parsing tool.
pub async fn cmd_providers(ctx: &AppContext) -> anyhow::Result<()> {
    println!("\n{}", style("AI Backends").bold());
    println!("{}", "-".repeat(50));

    let available = ctx.registry.available_backends();
    for (kind, status) in ctx.registry.statuses() {
        let label = match &status {
            ProviderStatus::Ready => style("✓ ready").green(),
            ProviderStatus::Missing => style("○ key missing").yellow(),
            ProviderStatus::Failed { .. } => style("✗ failed").red(),
        };
        println!("  {:<15} {}", kind.display_name(), label);

        if let Some(backend) = available.iter().find(|b| b.kind() == kind) {
            let modes = if backend.supports_vision() {
                "text, images"
            } else {
                "text only"
            };
            println!(
                "                  {}",
                style(format!("model {} ({})", backend.model_name(), modes)).dim()
            );
        } else if let Some(diagnostic) = status.diagnostic(kind) {
            println!("                  {}", style(diagnostic).dim());
        }
    }

    println!("\n{}", style("Local Tools:").cyan());
    for tool in check_tools() {
        let status = if tool.available {
            style("✓ found").green()
        } else {
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool.name, status);
        if !tool.available {
            println!("                  {}", style(tool.hint).dim());
        }
    }

    if let Some(path) = &ctx.config.source_path {
        println!("\n{} {}", style("Config:").cyan(), path.display());
    }
    println!();

    match available.first() {
        Some(backend) => {
            println!("{} Default backend: {}", style("→").green(), backend.kind());
            Ok(())
        }
        None => {
            println!(
                "{} No AI backends are available. Set at least one API key in .env",
                style("!").yellow()
            );
            anyhow::bail!("no AI backends available")
        }
    }
}
