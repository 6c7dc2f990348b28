//! Prometheus rendering of a controller status document.

use async_trait::async_trait;

use crate::apex::client::Client;
use crate::apex::status::ApexStatus;
use crate::error::ClientError;
use crate::model::{render_document, AuthResult, Label, MetricLine, TelemetryClient};

const NAMESPACE: &str = "apex";

/// Builds the metric lines for one status document.
///
/// One zero-valued info line carries the controller identity, followed by one
/// line per input named after the input itself.
pub fn status_lines(status: &ApexStatus) -> Vec<MetricLine> {
    let system = &status.system;
    let base_labels = [
        Label::new("apex_serial", &system.serial),
        Label::new("apex_hostname", &system.hostname),
    ];

    let mut lines = Vec::with_capacity(status.inputs.len() + 1);
    lines.push(
        MetricLine::new(format!("{}_info_label_values", NAMESPACE), 0.0)
            .label("apex_type", &system.kind)
            .label("apex_software", &system.software)
            .label("apex_hardware", &system.hardware)
            .labels(&base_labels),
    );

    for input in &status.inputs {
        lines.push(
            MetricLine::new(
                format!("{}_sensor_{}", NAMESPACE, input.name.to_lowercase()),
                input.value,
            )
            .labels(&base_labels)
            .label("input_did", &input.did)
            .label("input_type", &input.kind)
            .label("input_name", &input.name),
        );
    }

    lines
}

#[async_trait]
impl TelemetryClient for Client {
    type Status = ApexStatus;

    fn target(&self) -> &str {
        self.session().target()
    }

    async fn authenticate(&mut self) -> AuthResult {
        self.login().await
    }

    async fn fetch_status(&mut self) -> Result<ApexStatus, ClientError> {
        self.fetch_apex_status().await
    }

    async fn render_metrics(&mut self) -> Result<String, ClientError> {
        let status = self.fetch_apex_status().await?;
        Ok(render_document(&status_lines(&status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::config::test_credentials;
    use crate::test_utils::fixtures::apex_status_json;
    use crate::test_utils::mocks::MockApexServerBuilder;

    fn sample_status() -> ApexStatus {
        serde_json::from_value(apex_status_json()).unwrap()
    }

    mod succeeds {
        use super::*;

        #[test]
        fn test_info_line_first() {
            let lines = status_lines(&sample_status());
            assert_eq!(
                lines[0].render(),
                "apex_info_label_values{apex_type=\"AC5\", apex_software=\"5.12_CA25\", \
                 apex_hardware=\"1.0\", apex_serial=\"AC5:66011\", apex_hostname=\"reef-apex\"} 0"
            );
        }

        #[test]
        fn test_one_line_per_input() {
            let lines = status_lines(&sample_status());
            assert_eq!(lines.len(), 4);
            assert_eq!(
                lines[3].render(),
                "apex_sensor_mg{apex_serial=\"AC5:66011\", apex_hostname=\"reef-apex\", \
                 input_did=\"3_2\", input_type=\"mg\", input_name=\"Mg\"} 1586"
            );
        }

        #[test]
        fn test_sensor_name_is_lowercased_and_sanitized() {
            let lines = status_lines(&sample_status());
            assert_eq!(lines[1].render().split('{').next(), Some("apex_sensor_tmp"));
            assert_eq!(lines[2].render().split('{').next(), Some("apex_sensor_sump_ph"));
        }

        #[tokio::test]
        async fn test_render_metrics_end_to_end() {
            let server = MockApexServerBuilder::new()
                .await
                .mock_login("tok")
                .await
                .mock_status("tok", apex_status_json())
                .await;
            let mut client =
                Client::with_base_url("reef", server.url(), test_credentials()).unwrap();

            let body = client.render_metrics().await.unwrap();

            assert_eq!(body.lines().count(), 4);
            assert!(body.contains("sensor_mg{"));
            assert!(body.contains("input_name=\"Mg\"} 1586"));
            assert_eq!(TelemetryClient::target(&client), "reef");
        }
    }

    mod fails {
        use super::*;

        #[tokio::test]
        async fn test_render_metrics_propagates_fetch_failure() {
            let server = MockApexServerBuilder::new()
                .await
                .mock_login("tok")
                .await
                .mock_status_failure(503, "busy")
                .await;
            let mut client =
                Client::with_base_url("reef", server.url(), test_credentials()).unwrap();

            let result = client.render_metrics().await;
            assert!(matches!(result, Err(ClientError::ServerError { status: 503, .. })));
        }
    }
}
