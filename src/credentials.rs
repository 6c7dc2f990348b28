//! Credential lookup for Apex controllers and Fusion portal accounts.
//!
//! Credentials live in a TOML file loaded once at startup:
//!
//! ```toml
//! [apex_auths.tank_room]
//! username = "admin"
//! password = "1234"
//!
//! [fusion.apex_systems.5f1e2d3c4b5a697887766554]
//! username = "someone@example.com"
//! password = "secret"
//! ```
//!
//! The store is read-only after loading. A missing key fails only the
//! request that asked for it.

use crate::error::ConfigError;
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

#[derive(Deserialize, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Debug, Default)]
struct FusionSection {
    #[serde(default)]
    apex_systems: HashMap<String, Credentials>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CredentialStore {
    #[serde(default)]
    apex_auths: HashMap<String, Credentials>,
    #[serde(default)]
    fusion: FusionSection,
}

impl CredentialStore {
    /// Loads the store from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::credential_file(&display, e))?;
        let store = Self::from_toml(&raw).map_err(|e| ConfigError::credential_file(&display, e))?;
        tracing::info!(
            "Loaded credentials: {} apex auth module(s), {} fusion account(s)",
            store.apex_auths.len(),
            store.fusion.apex_systems.len()
        );
        Ok(store)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Credentials for a direct Apex controller, keyed by auth module name.
    pub fn apex(&self, auth_module: &str) -> Result<&Credentials, ConfigError> {
        self.apex_auths
            .get(auth_module)
            .ok_or_else(|| ConfigError::missing_credential("apex", auth_module))
    }

    /// Credentials for a Fusion portal account, keyed by Apex id.
    pub fn fusion(&self, apex_id: &str) -> Result<&Credentials, ConfigError> {
        self.fusion
            .apex_systems
            .get(apex_id)
            .ok_or_else(|| ConfigError::missing_credential("fusion", apex_id))
    }
}
