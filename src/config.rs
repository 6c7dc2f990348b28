use crate::error::ConfigError;
use serde_derive::Deserialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub(crate) fn load_app_config() -> Result<AppConfig, ConfigError> {
    envy::from_env::<AppConfig>().map_err(ConfigError::env_parse)
}

fn default_listen_addr() -> String {
    "0.0.0.0:5006".to_string()
}

fn default_credentials_file() -> String {
    "configuration/credentials.toml".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid("listen_addr", e.to_string()))
    }
}

pub(crate) fn load_server_config() -> Result<ServerConfig, ConfigError> {
    envy::prefixed("EXPORTER_")
        .from_env::<ServerConfig>()
        .map_err(ConfigError::env_parse)
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_portal_url() -> String {
    "https://apexfusion.com".to_string()
}

fn default_login_timeout_sec() -> u64 {
    30
}

fn default_settle_ms() -> u64 {
    3000
}

fn default_max_sessions() -> usize {
    2
}

/// Settings for the scraped Fusion portal client.
#[derive(Deserialize, Debug, Clone)]
pub struct FusionConfig {
    /// chromedriver (or any WebDriver) endpoint
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_portal_url")]
    pub portal_url: String,
    #[serde(default = "default_login_timeout_sec")]
    pub login_timeout_sec: u64,
    // pause after each navigation so client-side scripts can render
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    // upper bound on browser processes alive at once
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl FusionConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_sec)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_sessions == 0 {
            return Err(ConfigError::invalid("max_sessions", "must be at least 1"));
        }
        Ok(self)
    }
}

pub(crate) fn load_fusion_config() -> Result<FusionConfig, ConfigError> {
    envy::prefixed("FUSION_")
        .from_env::<FusionConfig>()
        .map_err(ConfigError::env_parse)?
        .validate()
}
