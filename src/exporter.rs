//! Per-request orchestration of clients into metrics documents and exports.
//!
//! Every call builds a fresh client with its own session; nothing is shared
//! between requests except the bound on open browser sessions.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::apex;
use crate::config::FusionConfig;
use crate::credentials::CredentialStore;
use crate::error::{ClientError, Result};
use crate::fusion::{self, BrowserFactory, PortalSettings};
use crate::model::{LogWindow, TelemetryClient};

/// Renders the metrics document of any client, logging the outcome.
pub async fn render_with<C>(client: &mut C, source: &str) -> Result<String, ClientError>
where
    C: TelemetryClient,
{
    match client.render_metrics().await {
        Ok(body) => {
            tracing::info!(
                "Rendered {} metrics for {} ({} lines)",
                source,
                client.target(),
                body.lines().count()
            );
            Ok(body)
        }
        Err(e) => {
            tracing::error!("Failed to render {} metrics for {}: {}", source, client.target(), e);
            Err(e)
        }
    }
}

/// Facade over the direct controller client.
pub struct ApexExporter {
    credentials: Arc<CredentialStore>,
}

impl ApexExporter {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self { credentials }
    }

    fn client(&self, target: &str, auth_module: &str) -> Result<apex::Client> {
        let credentials = self.credentials.apex(auth_module)?.clone();
        Ok(apex::Client::new(target, credentials)?)
    }

    /// Metrics document for the controller at `target`.
    pub async fn metrics(&self, target: &str, auth_module: &str) -> Result<String> {
        let mut client = self.client(target, auth_module)?;
        Ok(render_with(&mut client, "apex").await?)
    }

    /// Every raw document the controller offers, fetched with the long windows.
    pub async fn export(&self, target: &str, auth_module: &str) -> Result<Value> {
        let mut client = self.client(target, auth_module)?;
        tracing::info!("Exporting apex documents for {}", target);

        let status = client.fetch_status_document().await?;
        let ilog = client.fetch_internal_log(LogWindow::Debug).await?;
        let dlog = client.fetch_dosing_log(LogWindow::Debug).await?;
        let tlog = client.fetch_trident_log(LogWindow::Debug).await?;
        let config = client.fetch_config().await?;

        Ok(json!({
            "status": status,
            "ilog": ilog,
            "dlog": dlog,
            "tlog": tlog,
            "config": config,
        }))
    }
}

/// Facade over the scraped portal client.
///
/// Opens one browser per call, bounded by `max_sessions`, and closes it on
/// every exit path.
pub struct FusionExporter {
    credentials: Arc<CredentialStore>,
    settings: PortalSettings,
    browsers: Arc<dyn BrowserFactory>,
    sessions: Arc<Semaphore>,
}

impl FusionExporter {
    pub fn new(
        credentials: Arc<CredentialStore>,
        config: &FusionConfig,
        browsers: Arc<dyn BrowserFactory>,
    ) -> Self {
        Self {
            credentials,
            settings: PortalSettings::from(config),
            browsers,
            sessions: Arc::new(Semaphore::new(config.max_sessions)),
        }
    }

    async fn connect(
        &self,
        apex_id: &str,
        max_data_age_secs: i64,
    ) -> Result<(OwnedSemaphorePermit, fusion::Client)> {
        let credentials = self.credentials.fusion(apex_id)?.clone();

        let permit = Arc::clone(&self.sessions)
            .acquire_owned()
            .await
            .map_err(|e| anyhow::anyhow!("browser session limiter closed: {}", e))?;
        tracing::debug!(
            "Browser slot acquired for {} ({} left)",
            apex_id,
            self.sessions.available_permits()
        );

        let browser = self.browsers.open().await?;
        let client = fusion::Client::connect(
            browser,
            apex_id,
            credentials,
            self.settings.clone(),
            max_data_age_secs,
        )
        .await?;
        Ok((permit, client))
    }

    /// Metrics document for the portal account of `apex_id`.
    pub async fn metrics(&self, apex_id: &str, max_data_age_secs: i64) -> Result<String> {
        let (_permit, mut client) = self.connect(apex_id, max_data_age_secs).await?;
        let result = render_with(&mut client, "fusion").await;
        client.close().await;
        Ok(result?)
    }

    /// Year-long measurement log and the raw status listing.
    pub async fn export(&self, apex_id: &str) -> Result<Value> {
        let (_permit, mut client) = self.connect(apex_id, 0).await?;
        tracing::info!("Exporting fusion documents for {}", apex_id);

        let result = async {
            let mlog = client
                .fetch_measurement_log_document(LogWindow::Debug)
                .await?;
            let status = client.fetch_status_listing().await?;
            Ok::<_, ClientError>(json!({ "mlog": mlog, "status": status }))
        }
        .await;
        client.close().await;
        Ok(result?)
    }
}
