//! Prometheus rendering for the Fusion portal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ClientError;
use crate::fusion::client::Client;
use crate::fusion::status::FusionStatus;
use crate::model::{
    render_document, resolve_latest, AuthResult, DataSource, Label, LogWindow, MeasurementLogEntry,
    MetricLine, ModuleHealth, Presence, SwitchState, TelemetryClient,
};

const NAMESPACE: &str = "apex";

/// Added to the caller's max data age to absorb scrape latency.
pub const GRACE_SECS: i64 = 60;

const ALARM_VALUES: &str = "1 is On, 0 is Off, 2 is metric issue";
const MODULE_VALUES: &str = "1 is Ok/True, 0 is Not Ok/False, 2 is metric issue";

fn metric_name(suffix: &str) -> String {
    format!("{}_{}", NAMESPACE, suffix)
}

/// Canonical measurement name for an input type code, case-insensitive.
pub fn canonical_sensor_name(kind: &str) -> String {
    let kind = kind.to_lowercase();
    match kind.as_str() {
        "alk" => "alkalinity".to_string(),
        "ca" => "calcium".to_string(),
        "mg" => "magnesium".to_string(),
        _ => kind,
    }
}

fn base_labels(status: &FusionStatus) -> [Label; 3] {
    [
        Label::new("apex_id", &status.id),
        Label::new("apex_serial", &status.serial),
        Label::new("apex_hostname", &status.hostname),
    ]
}

// id first, then identity, then serial and hostname
fn info_line(status: &FusionStatus) -> MetricLine {
    MetricLine::new(metric_name("info_label_values"), 0.0)
        .label("apex_id", &status.id)
        .label("apex_type", &status.kind)
        .label("apex_software", &status.software)
        .label("apex_hardware", &status.hardware)
        .label("apex_serial", &status.serial)
        .label("apex_hostname", &status.hostname)
}

/// Lines derived from the status listing entry, in output order.
pub fn status_lines(status: &FusionStatus) -> Vec<MetricLine> {
    let base = base_labels(status);
    let sd = &status.extra.sdstat;
    let mut lines = vec![
        info_line(status),
        MetricLine::new(metric_name("sd_health"), status.extra.sdhealth).labels(&base),
        MetricLine::new(metric_name("sd_status_read_error"), sd.read_errors).labels(&base),
        MetricLine::new(metric_name("sd_status_reads"), sd.reads).labels(&base),
        MetricLine::new(metric_name("sd_status_write_error"), sd.write_errors).labels(&base),
        MetricLine::new(metric_name("sd_status_writes"), sd.writes).labels(&base),
    ];

    for input in &status.status.inputs {
        lines.push(
            MetricLine::new(metric_name("measurement"), input.value)
                .labels(&base)
                .label("data_source", DataSource::Apex)
                .label("did", &input.did)
                .label("type", &input.kind)
                .label("name", canonical_sensor_name(&input.kind)),
        );
    }

    let alarm = &status.status.alarm;
    lines.push(
        MetricLine::new(
            metric_name("alarm"),
            SwitchState::from_reported(&alarm.status).metric_value(),
        )
        .labels(&base)
        .label("alarm_description", &alarm.smnt)
        .label("alarm_values", ALARM_VALUES),
    );

    for module in &status.status.modules {
        let module_labels = [
            Label::new("module_type", &module.hwtype),
            Label::new("module_port", &module.abaddr),
            Label::new("module_values", MODULE_VALUES),
        ];
        lines.push(
            MetricLine::new(
                metric_name("module_status"),
                ModuleHealth::from_reported(&module.swstat).metric_value(),
            )
            .labels(&base)
            .labels(&module_labels),
        );
        lines.push(
            MetricLine::new(
                metric_name("module_present"),
                Presence::from(module.present).metric_value(),
            )
            .labels(&base)
            .labels(&module_labels),
        );
    }

    let network = &status.status.network;
    lines.push(MetricLine::new(metric_name("network_quality_pct"), network.quality).labels(&base));
    lines.push(
        MetricLine::new(metric_name("network_strength_pct"), network.strength).labels(&base),
    );

    lines
}

/// One `measurement` line per channel with a fresh reading.
pub fn measurement_lines(
    status: &FusionStatus,
    entries: &[MeasurementLogEntry],
    max_data_age_secs: i64,
    now: DateTime<Utc>,
) -> Vec<MetricLine> {
    let base = base_labels(status);
    resolve_latest(entries, max_data_age_secs.saturating_add(GRACE_SECS), now)
        .into_values()
        .map(|resolved| {
            MetricLine::new(metric_name("measurement"), resolved.value)
                .labels(&base)
                .label("data_source", DataSource::MeasurementLog)
                .label("name", resolved.key)
        })
        .collect()
}

#[async_trait]
impl TelemetryClient for Client {
    type Status = FusionStatus;

    fn target(&self) -> &str {
        self.session().target()
    }

    /// Submits the login form again on the open browser.
    async fn authenticate(&mut self) -> AuthResult {
        match self.submit_login().await {
            Ok(()) => AuthResult::Success,
            Err(e) => {
                tracing::warn!("Fusion re-login failed for {}: {}", self.session().target(), e);
                AuthResult::TransportError
            }
        }
    }

    async fn fetch_status(&mut self) -> Result<FusionStatus, ClientError> {
        self.fetch_fusion_status().await
    }

    async fn render_metrics(&mut self) -> Result<String, ClientError> {
        let status = self.fetch_fusion_status().await?;
        let mut lines = status_lines(&status);

        // live window regardless of how the exporter was asked to run
        let entries = self.fetch_measurement_log(LogWindow::Live).await?;
        lines.extend(measurement_lines(
            &status,
            &entries,
            self.max_data_age_secs(),
            Utc::now(),
        ));

        tracing::debug!(
            "Rendered {} Fusion lines for {}",
            lines.len(),
            self.session().target()
        );
        Ok(render_document(&lines))
    }
}
