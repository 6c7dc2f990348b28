use serde_json::Value;

/// Deserializes a JSON scalar (string, number or bool) into its text form.
///
/// Identity fields such as serial numbers or bus addresses are reported as
/// strings by some firmware and as numbers by others; both end up as label
/// values, so the textual form is all we keep.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Value = serde::Deserialize::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

/// Renders a JSON value as a label value: strings unquoted, null as empty.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
