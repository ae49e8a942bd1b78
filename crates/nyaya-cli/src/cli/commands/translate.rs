//! Standalone translation command.

use std::io::Read;

use anyhow::Context;

use nyaya::{Backend, LanguageCode};
use nyaya_analysis::Pipeline;

use super::AppContext;
use crate::cli::progress::spinner;

pub async fn cmd_translate(
    ctx: &AppContext,
    backend: Backend,
    from: LanguageCode,
    to: LanguageCode,
    text: Option<String>,
) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        anyhow::bail!("nothing to translate");
    }

    let pipeline = Pipeline::new(&ctx.config);
    let pb = spinner(format!("Translating {} to {}...", from, to), false);
    let translated = pipeline
        .translator()
        .translate(&text, from, to, &backend)
        .await;
    pb.finish_and_clear();

    println!("{}", translated?);
    Ok(())
}
