use serde_json::Value;
use std::time::Duration;

use crate::config::FusionConfig;
use crate::credentials::Credentials;
use crate::error::{ClientError, ParseError};
use crate::fusion::browser::PortalBrowser;
use crate::fusion::page::parse_embedded_json;
use crate::fusion::status::FusionStatus;
use crate::model::{DeviceSession, LogWindow, MeasurementLogEntry};

const USERNAME_FIELD: &str = "index-login-username";
const PASSWORD_FIELD: &str = "index-login-password";
const SIGN_IN_CLASS: &str = "af-sign-in";

/// Where and how patiently to talk to the portal.
#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub portal_url: String,
    pub login_timeout: Duration,
    pub settle: Duration,
}

impl From<&FusionConfig> for PortalSettings {
    fn from(config: &FusionConfig) -> Self {
        Self {
            portal_url: config.portal_url.trim_end_matches('/').to_string(),
            login_timeout: config.login_timeout(),
            settle: config.settle(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum PortalState {
    LoggedIn,
    Closed,
}

/// Scraping client for one controller registered on the Fusion portal.
///
/// Logging in happens while connecting. The portal gives no explicit signal
/// when the credentials are wrong: the first data query then finds a login
/// page instead of a JSON payload and fails with a parse error.
///
/// [`Client::close`] must run on every exit path to release the browser.
pub struct Client {
    browser: Box<dyn PortalBrowser>,
    settings: PortalSettings,
    credentials: Credentials,
    session: DeviceSession,
    state: PortalState,
    max_data_age_secs: i64,
}

impl Client {
    /// Opens the portal in `browser` and logs in.
    ///
    /// On failure the browser has already been closed.
    pub async fn connect(
        browser: Box<dyn PortalBrowser>,
        apex_id: &str,
        credentials: Credentials,
        settings: PortalSettings,
        max_data_age_secs: i64,
    ) -> Result<Self, ClientError> {
        let mut client = Self {
            browser,
            settings,
            credentials,
            session: DeviceSession::new(apex_id),
            state: PortalState::LoggedIn,
            max_data_age_secs,
        };

        if let Err(e) = client.submit_login().await {
            tracing::error!("Fusion login failed for {}: {}", apex_id, e);
            client.session.failed();
            client.close().await;
            return Err(e);
        }
        Ok(client)
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn max_data_age_secs(&self) -> i64 {
        self.max_data_age_secs
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.state == PortalState::Closed
    }

    pub(crate) async fn submit_login(&mut self) -> Result<(), ClientError> {
        self.ensure_open()?;
        let login_url = format!("{}/login", self.settings.portal_url);
        self.browser.goto(&login_url).await?;
        self.browser
            .wait_for_id(USERNAME_FIELD, self.settings.login_timeout)
            .await?;
        self.browser
            .type_into(USERNAME_FIELD, &self.credentials.username)
            .await?;
        self.browser
            .type_into(PASSWORD_FIELD, &self.credentials.password)
            .await?;
        self.browser.click_class(SIGN_IN_CLASS).await?;
        tokio::time::sleep(self.settings.settle).await;

        // no token to keep; the browser holds the portal cookies
        self.session.authenticated(String::new());
        tracing::debug!("Submitted Fusion login for {}", self.session.target());
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        match self.state {
            PortalState::Closed => Err(ClientError::SessionClosed),
            PortalState::LoggedIn => Ok(()),
        }
    }

    async fn fetch_page_json(&mut self, url: &str) -> Result<Value, ClientError> {
        self.ensure_open()?;
        self.browser.goto(url).await?;
        tokio::time::sleep(self.settings.settle).await;
        self.browser.refresh().await?;
        let source = self.browser.page_source().await?;

        parse_embedded_json(&source).map_err(|e| {
            tracing::error!(
                "Fusion page {} for {} had no usable payload: {}",
                url,
                self.session.target(),
                e
            );
            ClientError::Parse(e)
        })
    }

    /// Raw measurement log as returned by the portal.
    pub async fn fetch_measurement_log_document(
        &mut self,
        window: LogWindow,
    ) -> Result<Value, ClientError> {
        let days = match window {
            LogWindow::Live => 1,
            LogWindow::Debug => 365,
        };
        let url = format!(
            "{}/api/apex/{}/mlog?days={}",
            self.settings.portal_url,
            self.session.target(),
            days
        );
        self.fetch_page_json(&url).await
    }

    pub async fn fetch_measurement_log(
        &mut self,
        window: LogWindow,
    ) -> Result<Vec<MeasurementLogEntry>, ClientError> {
        let document = self.fetch_measurement_log_document(window).await?;
        serde_json::from_value(document).map_err(|e| ClientError::Parse(ParseError::Json(e)))
    }

    /// Raw status listing of every controller on the account.
    pub async fn fetch_status_listing(&mut self) -> Result<Value, ClientError> {
        let url = format!("{}/api/apex?page=1&per_page=9999", self.settings.portal_url);
        self.fetch_page_json(&url).await
    }

    /// Status of the first controller in the listing.
    pub async fn fetch_fusion_status(&mut self) -> Result<FusionStatus, ClientError> {
        let listing = self.fetch_status_listing().await?;
        let first = listing
            .as_array()
            .and_then(|entries| entries.first())
            .cloned()
            .ok_or_else(|| {
                ParseError::UnexpectedStructure("status listing is empty or not a list".to_string())
            })?;
        serde_json::from_value(first).map_err(|e| ClientError::Parse(ParseError::Json(e)))
    }

    /// Releases the browser. Later calls do nothing.
    pub async fn close(&mut self) {
        if self.state == PortalState::Closed {
            return;
        }
        self.state = PortalState::Closed;
        if let Err(e) = self.browser.close().await {
            tracing::warn!(
                "Failed to close browser for {}: {}",
                self.session.target(),
                e
            );
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if self.state != PortalState::Closed {
            tracing::warn!(
                "Fusion client for {} dropped without closing its browser",
                self.session.target()
            );
        }
    }
}
