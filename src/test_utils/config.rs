//! Configuration helpers for tests.

use crate::config::FusionConfig;
use crate::credentials::{CredentialStore, Credentials};
use crate::fusion::PortalSettings;

pub const TEST_AUTH_MODULE: &str = "tank_room";
pub const TEST_APEX_ID: &str = "5f1e2d3c4b5a6978";
pub const TEST_PORTAL_URL: &str = "http://portal.test";

pub fn test_credentials() -> Credentials {
    Credentials {
        username: "test_user".to_string(),
        password: "test_password".to_string(),
    }
}

/// Store holding [`test_credentials`] for both sources.
pub fn test_credential_store() -> CredentialStore {
    let raw = format!(
        r#"
        [apex_auths.{}]
        username = "test_user"
        password = "test_password"

        [fusion.apex_systems.{}]
        username = "test_user"
        password = "test_password"
        "#,
        TEST_AUTH_MODULE, TEST_APEX_ID
    );
    CredentialStore::from_toml(&raw).unwrap()
}

/// Portal config with no settle delay, pointing at a host that never resolves.
pub fn test_fusion_config() -> FusionConfig {
    FusionConfig {
        webdriver_url: "http://127.0.0.1:1".to_string(),
        portal_url: TEST_PORTAL_URL.to_string(),
        login_timeout_sec: 1,
        settle_ms: 0,
        max_sessions: 1,
    }
}

pub fn test_portal_settings() -> PortalSettings {
    PortalSettings::from(&test_fusion_config())
}
