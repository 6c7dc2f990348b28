//! Neptune Apex Prometheus exporter
//!
//! Serves Prometheus metrics for Neptune Apex aquarium controllers, either
//! straight from a controller's local REST API or scraped from the Apex
//! Fusion cloud portal through a headless browser.
//!
//! # Architecture
//!
//! Every scrape is independent: the request builds its own client, logs in,
//! fetches the current documents and renders them. Nothing is cached between
//! scrapes. The only shared resource is a bound on concurrently open portal
//! browsers.
//!
//! # Endpoints
//!
//! - `/metrics/apex?target=<ip>&auth_module=<name>`
//! - `/metrics/fusion?fusion_apex_id=<id>&data_max_age=<secs>`
//! - `/export/apex`, `/export/fusion` for raw JSON dumps
//! - `/health`

mod apex;
mod config;
mod credentials;
mod error;
mod exporter;
mod fusion;
mod http;
mod model;

#[cfg(test)]
mod test_utils;

use anyhow::Context;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

use crate::credentials::CredentialStore;
use crate::exporter::{ApexExporter, FusionExporter};
use crate::fusion::WebDriverFactory;
use crate::http::{AppState, HttpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_app_config().context("Failed to load AppConfig")?;
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .init();

    let server_config = config::load_server_config().context("Failed to load ServerConfig")?;
    let fusion_config = config::load_fusion_config().context("Failed to load FusionConfig")?;
    let credentials = Arc::new(
        CredentialStore::load(&server_config.credentials_file)
            .context("Failed to load credentials")?,
    );

    let browsers = Arc::new(WebDriverFactory::new(&fusion_config.webdriver_url));
    let state = AppState {
        apex: Arc::new(ApexExporter::new(Arc::clone(&credentials))),
        fusion: Arc::new(FusionExporter::new(
            credentials,
            &fusion_config,
            browsers,
        )),
    };
    let server = HttpServer::new(state, server_config.socket_addr()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server_task = tokio::spawn(server.run(shutdown_rx));

    let mut sig_term = signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    tracing::info!("Running... Press Ctrl-C or send SIGTERM to terminate.");
    tokio::select! {
        _ = sig_term.recv() => {
            tracing::info!("Received SIGTERM. Exiting...");
        }
        _ = ctrl_c() => {
            tracing::info!("Received SIGINT. Exiting...");
        }
        result = &mut server_task => {
            return result.context("HTTP server task failed")?;
        }
    }

    // fails only if the server already stopped
    let _ = shutdown_tx.send(true);
    server_task
        .await
        .context("HTTP server task failed")?
}
