use serde_json::Value;
use tabled::{Table, builder::Builder};

use super::{flatten, format_cell, headers, row};

/// Formats output as tables: objects as Field/Value pairs followed by one
/// table per list of records, arrays as a single table.
pub fn render_table(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let flat = flatten(map);
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (field, cell) in &flat.fields {
                builder.push_record([field.as_str(), cell.as_str()]);
            }

            let mut out = Table::from(builder).to_string();
            for (name, items) in flat.sections {
                out.push_str(&format!("\n\n{name}\n"));
                out.push_str(&array_table(items));
            }
            out
        }
        Value::Array(items) => array_table(items),
        other => format_cell(other),
    }
}

fn array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return "(empty)".to_string();
    }

    let headers = headers(items);
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in items {
        builder.push_record(row(item, &headers));
    }
    Table::from(builder).to_string()
}
