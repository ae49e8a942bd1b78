//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod extract;
mod languages;
mod providers;
mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use tracing::info;

use nyaya::{Backend, Config, LanguageCode, ProviderRegistry, RegistryError};

#[derive(Parser)]
#[command(name = "nyaya")]
#[command(about = "Legal document assistant for Indian languages")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AI backend to use: openai, gemini or groq (default: first available)
    #[arg(short, long, global = true, env = "NYAYA_BACKEND")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Show which AI backends and local tools are available
    Providers,

    /// List supported languages
    Languages,

    /// Extract text from a document and detect its language
    Extract {
        /// PDF, Word or image file
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate text between supported languages
    Translate {
        /// Source language (code or name)
        #[arg(long, value_parser = parse_language)]
        from: LanguageCode,
        /// Target language (code or name)
        #[arg(long, value_parser = parse_language)]
        to: LanguageCode,
        /// Text to translate (read from stdin when omitted)
        text: Option<String>,
    },

    /// Analyze one or more legal documents
    Analyze {
        /// Documents to analyze; `-` reads one document from stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Language for the explanation (default: the document's language)
        #[arg(short, long, value_parser = parse_language)]
        target: Option<LanguageCode>,
        /// File extension of the stdin document (pdf, docx, doc, jpg, png, ...)
        #[arg(short, long)]
        format: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Per-document time limit in seconds
        #[arg(long, default_value = "300")]
        timeout: u64,
    },
}

fn parse_language(s: &str) -> Result<LanguageCode, String> {
    LanguageCode::from_str(s).ok_or_else(|| {
        format!(
            "unsupported language '{}' (run `nyaya languages` for the list)",
            s
        )
    })
}

/// Configuration plus the initialized backends, built once per process.
pub(crate) struct AppContext {
    pub config: Config,
    pub registry: Arc<ProviderRegistry>,
}

impl AppContext {
    async fn load(config_path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let config = Config::load(config_path).await?;
        let registry = Arc::new(ProviderRegistry::initialize(&config).await);
        Ok(Self { config, registry })
    }

    /// The requested backend, or the first available one.
    ///
    /// Refuses to continue when nothing is usable.
    pub fn backend(&self, name: Option<&str>) -> anyhow::Result<Backend> {
        if let Err(RegistryError::NoBackends { diagnostics }) = self.registry.ensure_available() {
            eprintln!("{} No AI backends are available:", style("✗").red());
            for line in &diagnostics {
                eprintln!("  - {}", line);
            }
            anyhow::bail!("cannot continue without at least one valid API key");
        }

        let backend = match name {
            Some(name) => self.registry.resolve(name)?,
            None => self.registry.default_backend()?,
        };
        info!("Using {} ({})", backend.kind(), backend.model_name());
        Ok(backend)
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let backend_name = cli.backend.as_deref();

    match cli.command {
        // Needs neither config nor backends
        Commands::Languages => {
            languages::cmd_languages();
            Ok(())
        }
        Commands::Providers => {
            let ctx = AppContext::load(config_path).await?;
            providers::cmd_providers(&ctx).await
        }
        Commands::Extract { file, json } => {
            let ctx = AppContext::load(config_path).await?;
            extract::cmd_extract(&ctx, ctx.backend(backend_name)?, &file, json).await
        }
        Commands::Translate { from, to, text } => {
            let ctx = AppContext::load(config_path).await?;
            translate::cmd_translate(&ctx, ctx.backend(backend_name)?, from, to, text).await
        }
        Commands::Analyze {
            files,
            target,
            format,
            json,
            timeout,
        } => {
            let ctx = AppContext::load(config_path).await?;
            let options = analyze::AnalyzeOptions {
                target,
                format,
                json,
                timeout: std::time::Duration::from_secs(timeout),
            };
            analyze::cmd_analyze(&ctx, ctx.backend(backend_name)?, &files, &options).await
        }
    }
}
