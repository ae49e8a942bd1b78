//! nyaya - legal document assistant for Indian languages.
//!
//! Reads a legal document (PDF, Word, or a scanned image), works out which
//! language it is in, and explains it in plain language through an AI
//! backend, translating to and from English as needed.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "nyaya=info,nyaya_analysis=info,nyaya_cli=info"
    } else {
        "nyaya=warn,nyaya_analysis=warn,nyaya_cli=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run().await
}
