//! Output formatting for CLI commands

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Format output as pretty JSON
pub fn format_output<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// Parse a JSON object into a push payload
///
/// Push data is string-to-string; non-string values are kept as their JSON text.
pub fn parse_payload(json: &str) -> Result<HashMap<String, String>> {
    let object: serde_json::Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("Payload must be a JSON object: {}", e))?;

    Ok(object
        .into_iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, value)
        })
        .collect())
}
