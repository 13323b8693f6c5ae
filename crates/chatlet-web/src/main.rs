use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod models_file;
mod server;
mod shell;
mod surface;

use chatlet_core::{ControllerConfig, FormatPolicy, TranscriptMode};

use server::AppState;

/// Serves the chat widget shell and bridges it to the streaming engine.
#[derive(Debug, Parser)]
#[command(name = "chatlet-web", about = "Streaming chat widget host")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// JSON file holding the model identifier list.
    #[arg(long, default_value = "models.json")]
    models: PathBuf,

    /// Base URL of the OpenAI-compatible completion API.
    #[arg(long, default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Environment variable read for the upstream API key.
    #[arg(long, default_value = "OPENAI_API_KEY")]
    api_key_env: String,

    /// Send only the latest message instead of the full labeled transcript.
    #[arg(long)]
    latest_only: bool,

    /// Restrict formatting to links and bold (the minimal widget variant).
    #[arg(long)]
    plain_format: bool,
}

impl Args {
    fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            transcript_mode: if self.latest_only {
                TranscriptMode::LatestOnly
            } else {
                TranscriptMode::FullHistory
            },
            format_policy: if self.plain_format {
                FormatPolicy::LinkifyOnly
            } else {
                FormatPolicy::Rich
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let api_key = std::env::var(&args.api_key_env).ok();
    if api_key.is_none() {
        info!(var = %args.api_key_env, "no API key in environment, requests go unauthenticated");
    }

    let state = Arc::new(AppState::new(
        args.models.clone(),
        args.api_base.clone(),
        api_key,
        args.controller_config(),
    ));
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "chatlet-web listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
