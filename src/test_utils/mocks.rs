//! Mock controller server and scripted portal browser.

use async_trait::async_trait;
use mockito::{Mock, Server, ServerGuard};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::ClientError;
use crate::fusion::{BrowserFactory, PortalBrowser};
use crate::test_utils::html::not_found_page;

/// Builder for mockito mocks of the controller REST API.
pub struct MockApexServerBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockApexServerBuilder {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// `host:port` of the server, usable as a metrics `target`.
    pub fn host(&self) -> String {
        self.server.host_with_port()
    }

    /// Accepts any login and hands out `token`.
    pub async fn mock_login(mut self, token: &str) -> Self {
        let mock = self
            .server
            .mock("POST", "/rest/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"connect.sid":"{}"}}"#, token))
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Serves `document` on `/rest/status` to requests carrying `token`.
    pub async fn mock_status(mut self, token: &str, document: Value) -> Self {
        let mock = self
            .server
            .mock("GET", "/rest/status")
            .match_header("cookie", format!("connect.sid={}", token).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(document.to_string())
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    pub async fn mock_status_failure(mut self, status: usize, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", "/rest/status")
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Serves `document` on a GET `path`, ignoring the query string.
    pub async fn mock_document(mut self, path: &str, document: Value) -> Self {
        let mock = self
            .server
            .mock("GET", path)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(document.to_string())
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }
}

/// Shared record of what every mock browser was asked to do.
#[derive(Clone, Default)]
pub struct BrowserJournal {
    actions: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl BrowserJournal {
    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// Browser that serves canned pages by URL.
///
/// Unknown URLs render a 404 page without a `<pre>` payload.
pub struct MockBrowser {
    pages: HashMap<String, String>,
    current: Option<String>,
    fail_login_wait: bool,
    journal: BrowserJournal,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current: None,
            fail_login_wait: false,
            journal: BrowserJournal::default(),
        }
    }

    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    /// The login form never appears.
    pub fn failing_login_wait(mut self) -> Self {
        self.fail_login_wait = true;
        self
    }

    pub fn journal(&self) -> BrowserJournal {
        self.journal.clone()
    }
}

#[async_trait]
impl PortalBrowser for MockBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), ClientError> {
        self.journal.record(format!("goto {}", url));
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), ClientError> {
        self.journal.record("refresh".to_string());
        Ok(())
    }

    async fn wait_for_id(&mut self, id: &str, _timeout: Duration) -> Result<(), ClientError> {
        self.journal.record(format!("wait #{}", id));
        if self.fail_login_wait {
            return Err(ClientError::browser(format!("timed out waiting for #{}", id)));
        }
        Ok(())
    }

    async fn type_into(&mut self, id: &str, text: &str) -> Result<(), ClientError> {
        self.journal.record(format!("type #{} {}", id, text));
        Ok(())
    }

    async fn click_class(&mut self, class: &str) -> Result<(), ClientError> {
        self.journal.record(format!("click .{}", class));
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, ClientError> {
        self.journal.record("source".to_string());
        Ok(self
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .unwrap_or_else(not_found_page))
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.journal.record("close".to_string());
        self.journal.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out [`MockBrowser`]s that share one page set and one journal.
pub struct MockBrowserFactory {
    pages: HashMap<String, String>,
    fail_open: bool,
    journal: BrowserJournal,
}

impl MockBrowserFactory {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fail_open: false,
            journal: BrowserJournal::default(),
        }
    }

    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    /// No WebDriver is reachable.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn journal(&self) -> BrowserJournal {
        self.journal.clone()
    }
}

#[async_trait]
impl BrowserFactory for MockBrowserFactory {
    async fn open(&self) -> Result<Box<dyn PortalBrowser>, ClientError> {
        if self.fail_open {
            return Err(ClientError::browser("webdriver unreachable"));
        }
        self.journal.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockBrowser {
            pages: self.pages.clone(),
            current: None,
            fail_login_wait: false,
            journal: self.journal.clone(),
        }))
    }
}
