//! Apex Fusion portal client.
//!
//! The portal is scraped through a headless browser. Each metrics request
//! opens its own browser, logs in, reads the status listing and the
//! measurement log, and closes the browser again.

pub mod browser;
mod client;
mod metrics;
mod page;
pub mod status;

pub use browser::{BrowserFactory, PortalBrowser, WebDriverFactory};
pub use client::{Client, PortalSettings};
pub use status::FusionStatus;
