//! Typed view of one controller entry in the portal status listing.

use serde_derive::Deserialize;

use crate::apex::status::SensorInput;
use crate::model::utilities::lenient_string;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FusionStatus {
    #[serde(rename = "_id", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub serial: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hardware: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hostname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub software: String,
    pub extra: ExtraInfo,
    pub status: PortalStatus,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ExtraInfo {
    pub sdhealth: f64,
    pub sdstat: SdCardStats,
}

/// SD card IO counters.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SdCardStats {
    #[serde(rename = "readErr")]
    pub read_errors: f64,
    pub reads: f64,
    #[serde(rename = "writeErr")]
    pub write_errors: f64,
    pub writes: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PortalStatus {
    #[serde(default)]
    pub inputs: Vec<SensorInput>,
    pub alarm: AlarmInfo,
    #[serde(default)]
    pub modules: Vec<ModuleInfo>,
    pub network: NetworkInfo,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AlarmInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub smnt: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
}

/// Hardware module on the AquaBus, e.g. `{"abaddr":2,"hwtype":"DQD","swstat":"OK","present":true}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub abaddr: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hwtype: String,
    #[serde(deserialize_with = "lenient_string")]
    pub swstat: String,
    pub present: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkInfo {
    pub quality: f64,
    pub strength: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::fusion_status_json;

    #[test]
    fn test_deserialize_status() {
        let status: FusionStatus = serde_json::from_value(fusion_status_json()).unwrap();
        assert_eq!(status.id, "5f1e2d3c4b5a6978");
        assert_eq!(status.extra.sdstat.read_errors, 1.0);
        assert_eq!(status.status.modules[0].abaddr, "2");
        assert!(status.status.modules[0].present);
        assert_eq!(status.status.alarm.status, "OFF");
    }

    #[test]
    fn test_missing_network_block_fails() {
        let mut value = fusion_status_json();
        value["status"].as_object_mut().unwrap().remove("network");
        assert!(serde_json::from_value::<FusionStatus>(value).is_err());
    }
}
