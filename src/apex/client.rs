use crate::apex::status::ApexStatus;
use crate::credentials::Credentials;
use crate::error::{ClientError, ParseError};
use crate::model::{AuthResult, DeviceSession, LogWindow};
use chrono::{DateTime, Local};
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// Fixed timeout for every request to the controller.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const SESSION_COOKIE: &str = "connect.sid";

/// REST client for one Apex controller on the local network.
///
/// The session token is cached for the lifetime of the client. Every fetch
/// logs in first if no token is held yet.
pub struct Client {
    http_client: HttpClient,
    base_url: String,
    credentials: Credentials,
    session: DeviceSession,
    created_at: DateTime<Local>,
}

impl Client {
    /// Creates a client for `target`, an IP address or `host:port`.
    pub fn new(target: &str, credentials: Credentials) -> Result<Self, ClientError> {
        Self::with_base_url(target, format!("http://{}", target), credentials)
    }

    pub fn with_base_url(
        target: &str,
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ClientError> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
            credentials,
            session: DeviceSession::new(target),
            created_at: Local::now(),
        })
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Logs in and stores the session token on success.
    pub async fn login(&mut self) -> AuthResult {
        let url = format!("{}/rest/login", self.base_url);
        let payload = json!({
            "login": self.credentials.username,
            "password": self.credentials.password,
            "remember_me": false,
        });

        let response = match self.http_client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Apex authentication error for {}: {}", self.session.target(), e);
                self.session.failed();
                return AuthResult::TransportError;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!(
                "Apex authentication unsuccessful for {}: status {}",
                self.session.target(),
                status
            );
            self.session.failed();
            return AuthResult::Unsuccessful;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Apex authentication error for {}: {}", self.session.target(), e);
                self.session.failed();
                return AuthResult::TransportError;
            }
        };

        match extract_session_token(&body) {
            Ok(token) => {
                tracing::debug!("Apex authentication successful for {}", self.session.target());
                self.session.authenticated(token);
                AuthResult::Success
            }
            Err(e) => {
                tracing::error!(
                    "Apex login response from {} carried no session: {}",
                    self.session.target(),
                    e
                );
                self.session.failed();
                AuthResult::Unsuccessful
            }
        }
    }

    /// Logs in unless a token is already cached.
    ///
    /// A failed login is not fatal here; the fetch that follows goes out with
    /// an empty token and fails on its own.
    async fn ensure_authenticated(&mut self) {
        if self.session.has_token() {
            return;
        }
        let result = self.login().await;
        if result != AuthResult::Success {
            tracing::warn!(
                "Continuing without a session for {} after login result {:?}",
                self.session.target(),
                result
            );
        }
    }

    async fn get_json(&mut self, path_and_query: &str, what: &str) -> Result<Value, ClientError> {
        self.ensure_authenticated().await;

        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self
            .http_client
            .get(&url)
            .header("content-type", "application/json")
            .header(
                "cookie",
                format!("{}={}", SESSION_COOKIE, self.session.token()),
            )
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Apex {} error for {}: {}", what, self.session.target(), e);
                ClientError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                "Apex {} error for {}: status {}",
                what,
                self.session.target(),
                status
            );
            return Err(ClientError::server_error(status, body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Apex {} returned malformed JSON: {}", what, e);
            ClientError::Parse(ParseError::Json(e))
        })
    }

    /// Fetches the raw status document.
    pub async fn fetch_status_document(&mut self) -> Result<Value, ClientError> {
        self.get_json("/rest/status", "status").await
    }

    /// Fetches and decodes the status document.
    pub async fn fetch_apex_status(&mut self) -> Result<ApexStatus, ClientError> {
        let document = self.fetch_status_document().await?;
        serde_json::from_value(document).map_err(|e| ClientError::Parse(ParseError::Json(e)))
    }

    /// Fetches the internal sensor log.
    pub async fn fetch_internal_log(&mut self, window: LogWindow) -> Result<Value, ClientError> {
        let query = match window {
            LogWindow::Debug => "days=365".to_string(),
            LogWindow::Live => self.live_query(),
        };
        self.get_json(&format!("/rest/ilog?{}", query), "internal log")
            .await
    }

    /// Fetches the dosing (DOS) log.
    pub async fn fetch_dosing_log(&mut self, window: LogWindow) -> Result<Value, ClientError> {
        let query = match window {
            LogWindow::Debug => format!("sdate={}", self.start_date()),
            LogWindow::Live => self.live_query(),
        };
        self.get_json(&format!("/rest/dlog?{}", query), "dosing log")
            .await
    }

    /// Fetches the Trident analyser log.
    pub async fn fetch_trident_log(&mut self, window: LogWindow) -> Result<Value, ClientError> {
        let query = match window {
            LogWindow::Debug => format!("days=7&sdate={}", self.start_date()),
            LogWindow::Live => self.live_query(),
        };
        self.get_json(&format!("/rest/tlog?{}", query), "trident log")
            .await
    }

    /// Fetches the configuration of outputs, inputs and modules.
    pub async fn fetch_config(&mut self) -> Result<Value, ClientError> {
        self.get_json("/rest/config", "config").await
    }

    // one day ending now; the epoch doubles as a cache buster
    fn live_query(&self) -> String {
        format!("days=1&sdate=0&_={}", self.created_at.timestamp())
    }

    fn start_date(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

fn extract_session_token(body: &str) -> Result<String, ParseError> {
    let document: Value = serde_json::from_str(body)?;
    document
        .get(SESSION_COOKIE)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ParseError::UnexpectedStructure(format!("login response has no '{}'", SESSION_COOKIE))
        })
}
