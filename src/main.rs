use anyhow::Result;
use clap::Parser;
use prompt_expander::ai::provider_from_config;
use prompt_expander::handler::PromptHandler;
use prompt_expander::models::{AiProvider, Config};
use prompt_expander::server;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "prompt-expander")]
#[command(about = "Expand short creative briefs into detailed image prompts")]
struct CliArgs {
    /// Address to listen on (overrides BIND_ADDR).
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Upstream provider: openai or gemini (overrides PROMPT_PROVIDER).
    #[arg(long, value_name = "PROVIDER", value_parser = parse_provider_arg)]
    provider: Option<AiProvider>,
}

fn parse_provider_arg(input: &str) -> std::result::Result<AiProvider, String> {
    input.parse().map_err(|e: prompt_expander::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prompt_expander=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting prompt-expander");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(provider) = args.provider {
        config.provider = provider;
    }

    if config.api_key().is_empty() {
        warn!(
            "{} is not set; upstream calls will fail until it is provided",
            config.provider.api_key_var()
        );
    }

    // One connection pool for the life of the process.
    let provider = provider_from_config(&config, reqwest::Client::new());
    let handler = Arc::new(PromptHandler::new(provider));

    let listener = TcpListener::bind(config.bind_addr).await?;
    server::serve(listener, handler).await?;

    info!("Server stopped");
    Ok(())
}
