//! Error types for the Neptune Apex exporter.
//!
//! This module defines typed errors for the configuration layer and for both
//! device clients, so the HTTP layer can tell a misconfigured request apart
//! from a device that could not be reached or read.

use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type that encompasses all application errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// Device or portal communication and parsing errors
    #[error("client error")]
    Client(#[from] ClientError),

    /// Generic errors that don't fit other categories
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },

    /// Credentials file could not be read or decoded
    #[error("failed to load credentials from {path}: {message}")]
    CredentialFile { path: String, message: String },

    /// No credentials stored under the requested key
    #[error("no {kind} credentials configured for '{key}'")]
    MissingCredential { kind: &'static str, key: String },
}

/// Errors raised by the direct device client and the scraped portal client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed before a response arrived (timeout, refused, DNS)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// WebDriver command failed
    #[error("browser command failed: {0}")]
    Browser(String),

    /// Authentication failed (rejected login or 401 on a data request)
    #[error("authentication failed: invalid credentials or session")]
    AuthFailed,

    /// Server returned an error status
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// The browser session was already released
    #[error("portal session already closed")]
    SessionClosed,

    /// Response body could not be interpreted
    #[error("response parsing error")]
    Parse(#[from] ParseError),
}

/// Response parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Expected marker element not found in a rendered page
    #[error("marker not found: {marker}")]
    MissingMarker { marker: String },

    /// Embedded or returned JSON is malformed or has the wrong shape
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse date/time
    #[error("failed to parse date/time from '{text}': {message}")]
    DateTimeParse { text: String, message: String },

    /// Unexpected document structure
    #[error("unexpected document structure: {0}")]
    UnexpectedStructure(String),
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl std::fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a credentials file error.
    pub fn credential_file(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::CredentialFile {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Creates a missing credential error.
    pub fn missing_credential(kind: &'static str, key: impl Into<String>) -> Self {
        Self::MissingCredential {
            kind,
            key: key.into(),
        }
    }
}

impl ClientError {
    /// Creates a server error from HTTP status and response body.
    pub fn server_error(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            Self::AuthFailed
        } else {
            Self::ServerError {
                status: status.as_u16(),
                message: body,
            }
        }
    }

    /// Creates a browser error from any WebDriver failure.
    pub fn browser(err: impl std::fmt::Display) -> Self {
        Self::Browser(err.to_string())
    }

    /// True when the failure happened before any usable response was read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Browser(_))
    }
}

impl ParseError {
    /// Creates a missing marker error.
    pub fn missing_marker(marker: impl Into<String>) -> Self {
        Self::MissingMarker {
            marker: marker.into(),
        }
    }

    /// Creates a datetime parse error.
    pub fn datetime_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DateTimeParse {
            text: text.into(),
            message: err.to_string(),
        }
    }
}
