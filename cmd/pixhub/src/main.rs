//! # PixHub server
//!
//! Wires configuration, the SQLite store and the Argon2 hasher into the
//! services and serves the JSON API until Ctrl-C / SIGTERM.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use auth_adapters::Argon2Hasher;
use configs::{LoggingSettings, Settings};
use domains::SystemClock;
use secrecy::ExposeSecret;
use services::{Ports, Services};
use storage_adapters::SqliteStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.logging);

    let plans = settings.billing.plan_catalog().context("billing settings")?;
    let store = Arc::new(
        SqliteStore::connect(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
        )
            .await
            .context("opening database")?,
    );

    let ports = Ports {
        users: store.clone(),
        categories: store.clone(),
        images: store.clone(),
        payments: store,
        hasher: Arc::new(Argon2Hasher::new()),
        clock: Arc::new(SystemClock),
    };
    let app = router(AppState::new(Services::new(ports, plans)));

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "pixhub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("pixhub stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(config: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
        "compact" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
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
    tracing::info!("shutdown signal received");
}
