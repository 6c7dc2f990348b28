//! Sample documents as returned by a controller and by the portal.

use serde_json::{json, Value};

/// `/rest/status` of a controller with three inputs.
pub fn apex_status_json() -> Value {
    json!({
        "system": {
            "hostname": "reef-apex",
            "software": "5.12_CA25",
            "hardware": "1.0",
            "serial": "AC5:66011",
            "type": "AC5",
            "extra": {"sdver": "3.1"},
            "timezone": "-7.00",
            "date": 1724040038
        },
        "inputs": [
            {"did": "base_Temp", "type": "Temp", "name": "Tmp", "value": 25.6},
            {"did": "base_pH", "type": "pH", "name": "Sump pH", "value": 8.12},
            {"did": "3_2", "type": "mg", "name": "Mg", "value": 1586}
        ],
        "outputs": [],
        "feed": {"name": 0, "active": 0}
    })
}

/// One controller entry of the portal status listing.
pub fn fusion_status_json() -> Value {
    json!({
        "_id": "5f1e2d3c4b5a6978",
        "type": "AC5",
        "serial": "AC5:66011",
        "hardware": "1.0",
        "hostname": "reef-apex",
        "software": "5.12_CA25",
        "extra": {
            "sdhealth": 100,
            "sdstat": {"readErr": 1, "reads": 15230, "writeErr": 0, "writes": 9876}
        },
        "status": {
            "inputs": [
                {"did": "base_Temp", "type": "Temp", "name": "Tmp", "value": 25.6},
                {"did": "3_2", "type": "mg", "name": "Mg", "value": 1586}
            ],
            "alarm": {"smnt": "none", "status": "OFF"},
            "modules": [
                {"abaddr": 2, "hwtype": "DQD", "swstat": "OK", "present": true}
            ],
            "network": {"quality": 92, "strength": 78}
        }
    })
}

/// Status listing as served by `/api/apex?page=1&per_page=9999`.
pub fn fusion_listing_json() -> Value {
    json!([fusion_status_json()])
}

/// Measurement log from `(date, type, name, value)` rows.
pub fn measurement_log_json(rows: &[(&str, i64, Option<&str>, f64)]) -> String {
    let entries: Vec<Value> = rows
        .iter()
        .map(|(date, kind, name, value)| {
            json!({"date": date, "type": kind, "name": name, "value": value})
        })
        .collect();
    Value::Array(entries).to_string()
}
