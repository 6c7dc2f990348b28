//! Shared test utilities for the Apex exporter.
//!
//! Fixtures mirror real controller and portal documents; the mocks stand in
//! for the controller REST API and for the portal browser.

#![cfg(test)]

pub mod config;
pub mod fixtures;
pub mod html;
pub mod mocks;
