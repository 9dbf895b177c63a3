pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of a result, nested objects joined with dots
/// (`break_even.months`). Arrays of records are skipped; see [`record_arrays`].
pub(crate) fn flatten_fields(value: &Value) -> Vec<(String, &Value)> {
    let mut fields = Vec::new();
    collect_fields("", value, &mut fields);
    fields
}

fn collect_fields<'a>(prefix: &str, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_fields(&path, val, out);
            }
        }
        Value::Array(arr) if is_record_array(arr) => {}
        _ => out.push((prefix.to_string(), value)),
    }
}

/// Top-level arrays of objects in a result (schedules, yearly tables).
pub(crate) fn record_arrays(value: &Value) -> Vec<(&str, &[Value])> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, val)| match val {
                Value::Array(arr) if is_record_array(arr) => Some((key.as_str(), arr.as_slice())),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_record_array(arr: &[Value]) -> bool {
    matches!(arr.first(), Some(Value::Object(_)))
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
