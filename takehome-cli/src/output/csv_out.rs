use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::{flatten, format_cell, headers, row};

/// Formats output as CSV: objects as `field,value` rows, arrays with a
/// header row. Lists nested in an object are left to the JSON format.
pub fn render_csv(value: &Value) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    match value {
        Value::Object(map) => {
            wtr.write_record(["field", "value"])?;
            for (field, cell) in flatten(map).fields {
                wtr.write_record([field, cell])?;
            }
        }
        Value::Array(items) => {
            let headers = headers(items);
            if !items.is_empty() {
                wtr.write_record(&headers)?;
            }
            for item in items {
                wtr.write_record(row(item, &headers))?;
            }
        }
        other => wtr.write_record([format_cell(other)])?,
    }

    let bytes = wtr
        .into_inner()
        .map_err(|err| anyhow!("Failed to flush CSV output: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
