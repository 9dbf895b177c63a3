use serde_json::Value;
use std::io;

use super::{flatten_fields, format_scalar, record_arrays};

/// Write output as CSV to stdout. A result carrying a schedule is written as
/// that schedule, one row per entry; otherwise as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        _ => value,
    };

    let written = match body {
        Value::Array(arr) => write_records(&mut wtr, arr),
        _ => match record_arrays(body).first() {
            Some((_, rows)) => write_records(&mut wtr, rows),
            None => write_fields(&mut wtr, body),
        },
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_fields(value) {
        wtr.write_record([key, csv_value(val)])?;
    }
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([csv_value(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in rows {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(csv_value).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => format_scalar(other),
    }
}
