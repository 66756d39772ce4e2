mod completion;
mod config;
mod error;
mod mcp;
mod params;
mod protocol;
mod server;
mod tools;

use crate::completion::OpenAiProvider;
use crate::config::Config;
use crate::error::ServerError;
use crate::server::Server;
use crate::tools::generate::PipelineGenerator;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries protocol messages only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    eprintln!("Pipeline AI MCP Server running...");

    match run(config).await {
        Ok(()) => {
            info!("input closed, shutting down");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), ServerError> {
    let api_key = config.api_key();
    if api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; generate_pipeline will serve fallback templates");
    }

    let provider = OpenAiProvider::new(&config.base_url, api_key, config.request_timeout())
        .map_err(ServerError::Client)?;
    let generator = Arc::new(PipelineGenerator::new(
        Arc::new(provider),
        config.completion_settings(),
    ));
    info!(
        model = %config.model,
        base_url = %config.base_url,
        max_in_flight = config.max_in_flight,
        "serving JSON-RPC on stdio"
    );

    let server = Server::new(generator, config.max_message_bytes, config.max_in_flight);
    server.run(tokio::io::stdin(), tokio::io::stdout()).await
}
