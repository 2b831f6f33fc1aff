//! Tangle CLI and REST API entry point.
//!
//! Binary name: `tangle`
//!
//! Parses CLI arguments, initializes the database and services, then mints
//! tokens or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "tangle", &mut std::io::stdout());
        return Ok(());
    }

    match cli.command {
        Commands::Serve { port, host, otel } => {
            // The server path gets the full subscriber stack, OTel included.
            tangle_observe::tracing_setup::init_tracing("tangle", "info", otel)
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

            let state = AppState::init().await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "Tangle API listening");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tangle_observe::tracing_setup::shutdown_tracing();
        }

        Commands::InitToken { email } => {
            let filter = match cli.verbose {
                0 if cli.quiet => "error",
                0 => "warn",
                1 => "info,tangle=debug",
                _ => "trace",
            };
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(filter))
                .with_target(false)
                .init();

            let state = AppState::init().await?;
            cli::token::init_token(&state, &email).await?;
        }

        Commands::Mode { set, toggle } => {
            let set = set
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            cli::mode::mode(set, toggle)?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
