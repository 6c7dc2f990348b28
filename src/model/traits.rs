use crate::error::ClientError;
use crate::model::AuthResult;
use async_trait::async_trait;

/// Capability set shared by the direct controller client and the scraped
/// portal client.
///
/// The exporter facades drive clients only through this trait, so they do not
/// care whether data came over REST or out of a rendered page.
#[async_trait]
pub trait TelemetryClient: Send {
    /// Typed status document returned by [`TelemetryClient::fetch_status`].
    type Status: Send;

    /// Controller address or portal account id this client talks to.
    fn target(&self) -> &str;

    /// Performs one login attempt. Never fails; inspect the result.
    async fn authenticate(&mut self) -> AuthResult;

    /// Fetches the current status document.
    async fn fetch_status(&mut self) -> Result<Self::Status, ClientError>;

    /// Builds the full metrics document for this source.
    ///
    /// Any failure aborts the whole document; partial output is never returned.
    async fn render_metrics(&mut self) -> Result<String, ClientError>;
}
