pub mod csv_out;
pub mod export;
pub mod json;
pub mod table;

use anyhow::Result;
use clap::ValueEnum;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
}

/// Renders a command's output in the requested format.
pub fn render(
    format: OutputFormat,
    value: &Value,
) -> Result<String> {
    match format {
        OutputFormat::Json => json::render_json(value),
        OutputFormat::Table => Ok(table::render_table(value)),
        OutputFormat::Csv => csv_out::render_csv(value),
    }
}

/// An object split into scalar fields (nested objects flattened with dotted
/// names) and the arrays of objects found along the way.
pub(crate) struct Flattened<'a> {
    pub fields: Vec<(String, String)>,
    pub sections: Vec<(String, &'a [Value])>,
}

pub(crate) fn flatten(map: &Map<String, Value>) -> Flattened<'_> {
    let mut flat = Flattened {
        fields: Vec::new(),
        sections: Vec::new(),
    };
    flatten_into("", map, &mut flat);
    flat
}

fn flatten_into<'a>(
    prefix: &str,
    map: &'a Map<String, Value>,
    flat: &mut Flattened<'a>,
) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(&name, inner, flat),
            Value::Array(items) if items.iter().any(Value::is_object) => {
                flat.sections.push((name, items.as_slice()));
            }
            other => flat.fields.push((name, format_cell(other))),
        }
    }
}

/// Column names of an array of objects, taken from its first element.
pub(crate) fn headers(items: &[Value]) -> Vec<String> {
    match items.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    }
}

pub(crate) fn row(
    item: &Value,
    headers: &[String],
) -> Vec<String> {
    match item {
        Value::Object(map) => headers
            .iter()
            .map(|h| map.get(h).map(format_cell).unwrap_or_default())
            .collect(),
        other => vec![format_cell(other)],
    }
}

pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}
