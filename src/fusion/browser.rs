//! Scripted browser used to reach the Fusion portal.
//!
//! The portal has no machine API, so every request goes through a real
//! headless browser driven over WebDriver. The trait keeps the portal client
//! independent of the driver so it can be exercised without a browser.

use async_trait::async_trait;
use fantoccini::{ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;

use crate::error::ClientError;

/// The handful of browser actions the portal client needs.
#[async_trait]
pub trait PortalBrowser: Send {
    async fn goto(&mut self, url: &str) -> Result<(), ClientError>;

    async fn refresh(&mut self) -> Result<(), ClientError>;

    /// Waits until an element with `id` is present, up to `timeout`.
    async fn wait_for_id(&mut self, id: &str, timeout: Duration) -> Result<(), ClientError>;

    async fn type_into(&mut self, id: &str, text: &str) -> Result<(), ClientError>;

    async fn click_class(&mut self, class: &str) -> Result<(), ClientError>;

    /// Serialized DOM of the current page.
    async fn page_source(&mut self) -> Result<String, ClientError>;

    /// Ends the session and the browser process behind it.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Opens one browser per metrics request.
#[async_trait]
pub trait BrowserFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PortalBrowser>, ClientError>;
}

/// WebDriver-backed browser (chromedriver with headless Chrome).
pub struct WebDriverBrowser {
    client: Option<fantoccini::Client>,
}

impl WebDriverBrowser {
    fn client(&self) -> Result<&fantoccini::Client, ClientError> {
        self.client.as_ref().ok_or(ClientError::SessionClosed)
    }
}

#[async_trait]
impl PortalBrowser for WebDriverBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), ClientError> {
        self.client()?.goto(url).await.map_err(ClientError::browser)
    }

    async fn refresh(&mut self) -> Result<(), ClientError> {
        self.client()?.refresh().await.map_err(ClientError::browser)
    }

    async fn wait_for_id(&mut self, id: &str, timeout: Duration) -> Result<(), ClientError> {
        self.client()?
            .wait()
            .at_most(timeout)
            .for_element(Locator::Id(id))
            .await
            .map(|_| ())
            .map_err(ClientError::browser)
    }

    async fn type_into(&mut self, id: &str, text: &str) -> Result<(), ClientError> {
        let element = self
            .client()?
            .find(Locator::Id(id))
            .await
            .map_err(ClientError::browser)?;
        element.send_keys(text).await.map_err(ClientError::browser)
    }

    async fn click_class(&mut self, class: &str) -> Result<(), ClientError> {
        let element = self
            .client()?
            .find(Locator::Css(&format!(".{}", class)))
            .await
            .map_err(ClientError::browser)?;
        element.click().await.map_err(ClientError::browser)
    }

    async fn page_source(&mut self) -> Result<String, ClientError> {
        self.client()?.source().await.map_err(ClientError::browser)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        match self.client.take() {
            Some(client) => client.close().await.map_err(ClientError::browser),
            None => Ok(()),
        }
    }
}

/// Starts headless Chrome sessions through a WebDriver endpoint.
pub struct WebDriverFactory {
    webdriver_url: String,
}

impl WebDriverFactory {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }
}

#[async_trait]
impl BrowserFactory for WebDriverFactory {
    async fn open(&self) -> Result<Box<dyn PortalBrowser>, ClientError> {
        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new"] }),
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to start browser via {}: {}", self.webdriver_url, e);
                ClientError::browser(e)
            })?;

        tracing::debug!("Started browser session via {}", self.webdriver_url);
        Ok(Box::new(WebDriverBrowser {
            client: Some(client),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_browser_rejects_commands() {
        let mut browser = WebDriverBrowser { client: None };

        assert!(matches!(
            browser.goto("https://apexfusion.com/login").await,
            Err(ClientError::SessionClosed)
        ));
        assert!(matches!(
            browser.page_source().await,
            Err(ClientError::SessionClosed)
        ));
        // closing twice is harmless
        assert!(browser.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_open_without_webdriver_fails() {
        let factory = WebDriverFactory::new("http://127.0.0.1:1");
        let result = factory.open().await;
        assert!(matches!(result, Err(ClientError::Browser(_))));
    }
}
