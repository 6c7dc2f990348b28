//! Typed view of the controller status document.
//!
//! Only the fields that feed metrics are modelled; everything else in the
//! document is ignored on deserialization and still available through the
//! raw JSON fetchers.

use serde_derive::Deserialize;

use crate::model::utilities::lenient_string;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ApexStatus {
    pub system: SystemInfo,
    #[serde(default)]
    pub inputs: Vec<SensorInput>,
}

/// Identity block of a controller.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SystemInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub hostname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub serial: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub software: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hardware: String,
}

/// One input or sensor, e.g. `{"did":"3_2","type":"mg","name":"Mg","value":1586}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SensorInput {
    #[serde(deserialize_with = "lenient_string")]
    pub did: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    pub value: f64,
}
