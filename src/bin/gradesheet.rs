//! Server binary for gradesheet.
//!
//! A thin shim over the library crate: parse flags, initialise logging,
//! build a `GradingConfig`, and serve the web UI.

use anyhow::{Context, Result};
use clap::Parser;
use gradesheet::config::{self, GradingConfig};
use std::io;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the UI on the default address
  OPENROUTER_KEY=sk-or-... gradesheet

  # Public bind, different model
  gradesheet --listen 0.0.0.0:8080 --model anthropic/claude-sonnet-4

  # Point at a self-hosted OpenAI-compatible gateway
  gradesheet --endpoint http://localhost:4000/v1

ENVIRONMENT VARIABLES:
  OPENROUTER_KEY        API credential for the correction model (required
                        for corrections; the UI still serves without it)
  GRADESHEET_LISTEN     Override the listen address
  GRADESHEET_MODEL      Override the model id
  GRADESHEET_ENDPOINT   Override the chat-completions endpoint base
"#;

/// Serve the exercise-correction web UI.
#[derive(Parser, Debug)]
#[command(
    name = "gradesheet",
    version,
    about = "Grade photographed exercise sheets with a multimodal language model",
    long_about = "Serves a single-page web UI: upload photos of exercise sheets, get a \
structured correction back, download it as Markdown or PDF. Grading is delegated to an \
OpenRouter-compatible chat-completions endpoint.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "GRADESHEET_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Correction model id.
    #[arg(long, env = "GRADESHEET_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Chat-completions endpoint base URL.
    #[arg(long, env = "GRADESHEET_ENDPOINT", default_value = config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-call model timeout in seconds.
    #[arg(long, env = "GRADESHEET_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GRADESHEET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GRADESHEET_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = GradingConfig::builder()
        .model(&cli.model)
        .endpoint(&cli.endpoint)
        .api_timeout_secs(cli.api_timeout)
        .build()
        .context("Invalid configuration")?;
    config.api_key = GradingConfig::from_env().api_key;

    if config.api_key.is_none() {
        warn!(
            "{} is not set — correction requests will fail until it is provided",
            config::API_KEY_VAR
        );
    }

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;
    info!(
        "Serving on http://{} (model: {})",
        listener.local_addr().unwrap_or(cli.listen),
        config.model
    );

    gradesheet::server::serve(listener, config)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
