use anyhow::Result;
use serde_json::Value;

/// Pretty-printed JSON.
pub fn render_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
