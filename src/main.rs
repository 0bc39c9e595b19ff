// ABOUTME: Entry point for the switchboard binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs a one-shot query or the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use switchboard_server::{SwitchboardConfig, build_gateway, build_state, create_router};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version, about = "Plan a request, dispatch specialist agents, and synthesize one answer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one query and exit
    Ask {
        /// The query; multiple words are joined with spaces
        #[arg(required = true)]
        query: Vec<String>,

        /// Print the plan and per-agent results as JSON instead of only the answer
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Overrides SWITCHBOARD_BIND
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("switchboard=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SwitchboardConfig::from_env()?;

    match cli.command {
        Command::Ask { query, json } => ask(&config, &query.join(" "), json).await,
        Command::Serve { bind } => serve(&config, bind.unwrap_or(config.bind)).await,
    }
}

async fn ask(config: &SwitchboardConfig, query: &str, json: bool) -> anyhow::Result<()> {
    let state = build_state(config, build_gateway(config)?)?;

    match state.ask(query).await {
        Ok(result) if json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Ok(result) => {
            println!("{}", result.final_answer);
            Ok(())
        }
        Err(e) => {
            if let Some(results) = e.partial_results()
                && !results.is_empty()
            {
                eprintln!("partial results:\n{}", serde_json::to_string_pretty(results)?);
            }
            let stage = e.stage();
            Err(anyhow::Error::new(e).context(format!("query failed during {}", stage)))
        }
    }
}

async fn serve(config: &SwitchboardConfig, bind: SocketAddr) -> anyhow::Result<()> {
    let state = Arc::new(build_state(config, build_gateway(config)?)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!(%bind, "switchboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("switchboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
