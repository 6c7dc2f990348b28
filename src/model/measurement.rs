//! Latest-value resolution over the Fusion measurement log.
//!
//! The log is a noisy, unordered series of readings. Each reading belongs to
//! a logical channel (a reagent type, or a named sensor for type `0`). For every
//! channel we keep only the newest reading that is still inside the staleness
//! window.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde_derive::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParseError;

/// Channel type code used for free-form named entries.
pub const NAMED_CHANNEL: i64 = 0;

/// One raw row of the measurement log.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MeasurementLogEntry {
    #[serde(rename = "date", deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub channel_type: i64,
    // only meaningful for NAMED_CHANNEL
    #[serde(default)]
    pub name: Option<String>,
    pub value: f64,
}

/// Logical channel a reading is reported against.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Derives the channel for a log entry.
    ///
    /// Reagent codes 1-6 map through a fixed table, code 0 uses the entry's
    /// own name, and anything else has no channel.
    pub fn for_entry(channel_type: i64, name: Option<&str>) -> Option<Self> {
        if channel_type == NAMED_CHANNEL {
            let name = name?.to_lowercase().replace(' ', "_");
            return Some(ChannelKey(name));
        }
        reagent_name(channel_type).map(|n| ChannelKey(n.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current value of one channel after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMeasurement {
    pub key: ChannelKey,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

fn reagent_name(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("alkalinity"),
        2 => Some("calcium"),
        3 => Some("iodine"),
        4 => Some("magnesium"),
        5 => Some("nitrate"),
        6 => Some("phosphate"),
        _ => None,
    }
}

/// Parses a log timestamp.
///
/// Zone-aware RFC 3339 (`2024-08-19T04:20:38.184Z`, `+00:00`) is tried first;
/// a zone-less timestamp is read as UTC. Anything else is a parse error.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ParseError> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(text) {
        return Ok(aware.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ParseError::datetime_parse(text, e))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text: String = serde::Deserialize::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(serde::de::Error::custom)
}

/// Resolves one current reading per channel.
///
/// Entries at or before `now - staleness_window_secs` are dropped. A window
/// reaching past the representable date range drops nothing. Among the rest,
/// the greatest timestamp wins per channel; on equal timestamps the entry seen
/// first is kept.
pub fn resolve_latest<'a, I>(
    entries: I,
    staleness_window_secs: i64,
    now: DateTime<Utc>,
) -> BTreeMap<ChannelKey, ResolvedMeasurement>
where
    I: IntoIterator<Item = &'a MeasurementLogEntry>,
{
    let cutoff = TimeDelta::try_seconds(staleness_window_secs)
        .and_then(|window| now.checked_sub_signed(window));
    let mut latest = BTreeMap::<ChannelKey, ResolvedMeasurement>::new();

    for entry in entries {
        if cutoff.is_some_and(|cutoff| entry.timestamp <= cutoff) {
            continue;
        }
        let Some(key) = ChannelKey::for_entry(entry.channel_type, entry.name.as_deref()) else {
            tracing::debug!(
                "Ignoring measurement log entry with type {}",
                entry.channel_type
            );
            continue;
        };

        match latest.get(&key) {
            Some(current) if current.timestamp >= entry.timestamp => {}
            _ => {
                latest.insert(
                    key.clone(),
                    ResolvedMeasurement {
                        key,
                        timestamp: entry.timestamp,
                        value: entry.value,
                    },
                );
            }
        }
    }

    latest
}
