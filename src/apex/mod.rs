//! Direct client for Apex controllers reachable on the local network.

mod client;
mod metrics;
pub mod status;

pub use client::Client;
pub use status::ApexStatus;
