//! Swiss tournament server.
//!
//! Serves the tournament command surface over HTTP, backed by an in-memory
//! store and a player directory seeded from a JSON file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Error};
use pico_args::Arguments;
use sl_server::{api, config::ServerConfig, logging, metrics};
use swiss_league::{InMemoryTournamentStore, TournamentService, registry::InMemoryPlayerDirectory};
use tracing::{info, warn};

const HELP: &str = "\
Run the Swiss tournament server

USAGE:
  sl_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --players    PATH        Player directory JSON file  [default: env PLAYERS_FILE]
  --metrics    IP:PORT     Prometheus exporter address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  PLAYERS_FILE             JSON array of {id, name, city?, rating?}
  METRICS_BIND             Prometheus exporter address
  SCORING_WIN_POINTS       Match points for a win  [default: 3]
  SCORING_DRAW_POINTS      Match points for a draw [default: 1]
  SCORING_BYE_POINTS       Match points for a bye  [default: 3]
  SCORING_OMW_FLOOR        Opponent match-win floor [default: 0.333]
  SCORING_MAX_GAMES        Games per match          [default: 3]
  RUST_LOG                 Log filter               [default: info]
";

struct Args {
    bind: Option<SocketAddr>,
    players: Option<PathBuf>,
    metrics: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        players: pargs.opt_value_from_str("--players")?,
        metrics: pargs.opt_value_from_str("--metrics")?,
    };

    logging::init();

    let mut config = ServerConfig::from_env(args.bind, args.players)?;
    if args.metrics.is_some() {
        config.metrics_bind = args.metrics;
    }
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported at http://{addr}/metrics");
    }

    let players = config.load_players()?;
    if players.is_empty() {
        warn!("Player directory is empty; no one can register");
    } else {
        info!("Loaded {} player(s)", players.len());
    }

    let service = TournamentService::new(
        Arc::new(InMemoryTournamentStore::new()),
        Arc::new(InMemoryPlayerDirectory::new(players)),
    );
    let app = api::create_router(api::AppState::new(service, config.scoring.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        // keep serving; the process can still be stopped externally
        std::future::pending::<()>().await;
    }
}
