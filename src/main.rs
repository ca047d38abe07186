use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::info;

mod api;
mod config;
mod probe;

pub use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `epcr-api --probe` runs the one-shot connectivity check and exits.
    // Same binary, same config — no separate client tool to ship.
    let probe_mode = std::env::args().nth(1).as_deref() == Some("--probe");

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epcr_api=info,tower_http=warn".into()),
        )
        .init();

    // Load config
    let config = Config::load().context("Failed to load configuration")?;

    if probe_mode {
        return run_probe(&config).await;
    }

    let port = config.server_port()?;
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;

    let state = Arc::new(api::AppState {
        service_name: config.server.service_name.clone(),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, service = %config.server.service_name, "API listening");

    // Attach request tracing middleware
    let app = api::router(state).layer(
        tower_http::trace::TraceLayer::new_for_http()
            .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
            .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO)),
    );

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("API server error")?;
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
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

/// One-shot connectivity check: print the checking line, fire the probe,
/// print the terminal outcome and (on success) the raw payload.
/// Exits 0 when connected, 1 otherwise — usable as a container healthcheck.
async fn run_probe(config: &Config) -> anyhow::Result<()> {
    println!("{}", probe::ProbeState::Checking.status_line());

    let state = probe::run(&config.probe).await;
    println!("{}", state.status_line());

    match state.payload() {
        Some(payload) => {
            println!("{}", serde_json::to_string_pretty(payload)?);
            Ok(())
        }
        None => std::process::exit(1),
    }
}
