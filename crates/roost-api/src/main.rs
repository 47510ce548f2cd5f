//! Roost CLI and REST API entry point.
//!
//! Binary name: `roost`
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! services, then dispatches to a command handler or starts the REST API.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use roost_infra::config::{load_server_config, resolve_data_dir};
use roost_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};

use cli::{Cli, Commands, TokenAction, UserAction};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "roost", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let mut config = load_server_config(&data_dir).await;

    if let Commands::Serve { port, host } = &cli.command {
        if let Some(port) = port {
            config.port = *port;
        }
        if let Some(host) = host {
            config.host = host.clone();
        }
    }

    let state = AppState::init(&data_dir, config).await?;

    match cli.command {
        Commands::Serve { .. } => serve(state, cli.quiet).await?,

        Commands::User { action } => match action {
            UserAction::Add {
                phone,
                email,
                avatar,
            } => cli::user::add_user(&state, phone, email, avatar, cli.json).await?,
            UserAction::List => cli::user::list_users(&state, cli.json).await?,
        },

        Commands::Token { action } => match action {
            TokenAction::Issue { user_id } => {
                cli::token::issue_token(&state, &user_id, cli.json).await?
            }
            TokenAction::Revoke { user_id } => {
                cli::token::revoke_tokens(&state, &user_id, cli.json).await?
            }
        },

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn serve(state: AppState, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, data_dir = %state.data_dir.display(), "Roost API listening");
    if !quiet {
        println!(
            "  {} Roost API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
