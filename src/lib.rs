pub mod access;
pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod service;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;

use crate::clock::Clock;
use crate::config::Config;
use crate::service::Service;
use crate::store::Store;
use eyre::WrapErr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

impl AppState {
    pub fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Serve the API until Ctrl+C or SIGTERM is received.
pub async fn start_server(config: Config) -> eyre::Result<()> {
    let pool = db::connect(&config.database).await?;
    if let Some(date) = config.clock.virtual_date {
        info!(%date, "using virtual date as today");
    }
    let service = Service::new(Store::new(pool), Clock::new(config.clock.virtual_date));
    let app = views::router(AppState::new(service), &config.server);

    let address = format!("{}:{}", config.server.address, config.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("cannot listen on {address}"))?;
    info!("Server running on {address}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server stopped unexpectedly")?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("cannot install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("cannot install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
