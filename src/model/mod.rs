//! Shared data model for both Apex data sources.
//!
//! This module provides the session and reading types, the measurement-log
//! normalizer, the Prometheus line formatter and the client trait that the
//! exporter facades are written against.

pub mod measurement;
pub mod metric_line;
pub mod traits;
pub mod types;
pub mod utilities;

pub use measurement::{resolve_latest, ChannelKey, MeasurementLogEntry, ResolvedMeasurement};
pub use metric_line::{render_document, Label, MetricLine};
pub use traits::TelemetryClient;
pub use types::{
    AuthResult, AuthState, DataSource, DeviceSession, LogWindow, ModuleHealth, Presence,
    SwitchState,
};
