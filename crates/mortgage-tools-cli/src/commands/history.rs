use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use mortgage_tools_core::history::{CalculationHistory, CalculationKind};

/// Arguments for the calculation history
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Show recent calculations, newest first
    List,
    /// Forget every recorded calculation
    Clear,
}

pub fn run_history(
    args: HistoryArgs,
    history_file: Option<&Path>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let path = history_file
        .ok_or("no history file configured (set MTG_HISTORY_FILE or pass --history-file)")?;
    let mut history = load(path)?;

    match args.action {
        HistoryAction::List => {
            let entries: Vec<_> = history.entries().collect();
            Ok(serde_json::to_value(entries)?)
        }
        HistoryAction::Clear => {
            let cleared = history.len();
            history.clear();
            save(path, &history)?;
            Ok(json!({ "cleared": cleared }))
        }
    }
}

/// Append a finished calculation to the history file.
pub fn record(
    path: &Path,
    kind: CalculationKind,
    output: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut history = load(path)?;
    history.record(kind, headline(output));
    save(path, &history)
}

fn load(path: &Path) -> Result<CalculationHistory, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(CalculationHistory::new());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    Ok(CalculationHistory::from_json(&contents)?)
}

fn save(path: &Path, history: &CalculationHistory) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, history.to_json()?)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    Ok(())
}

/// Inputs plus the scalar and nested-object parts of the result; long
/// arrays such as payment schedules are left out.
fn headline(output: &Value) -> Value {
    let result = match output.get("result") {
        Some(Value::Object(map)) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_array())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        ),
        Some(other) => other.clone(),
        None => Value::Null,
    };
    json!({
        "inputs": output.get("assumptions").cloned().unwrap_or(Value::Null),
        "result": result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("mtg-history-{}-{}.json", std::process::id(), name));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_headline_drops_schedule() {
        let output = json!({
            "result": { "monthly_payment": "1798.65", "schedule": [1, 2, 3] },
            "assumptions": { "principal": "300000" },
        });
        let h = headline(&output);
        assert_eq!(h["result"]["monthly_payment"], "1798.65");
        assert!(h["result"].get("schedule").is_none());
        assert_eq!(h["inputs"]["principal"], "300000");
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let path = scratch_file("missing");
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_record_list_clear() {
        let path = scratch_file("cycle");
        let output = json!({ "result": { "eligible": true }, "assumptions": {} });
        record(&path, CalculationKind::PreApproval, &output).unwrap();
        record(&path, CalculationKind::Refinance, &output).unwrap();

        let listed = run_history(
            HistoryArgs {
                action: HistoryAction::List,
            },
            Some(&path),
        )
        .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 2);
        assert_eq!(listed[0]["kind"], "refinance");

        let cleared = run_history(
            HistoryArgs {
                action: HistoryAction::Clear,
            },
            Some(&path),
        )
        .unwrap();
        assert_eq!(cleared["cleared"], 2);
        assert!(load(&path).unwrap().is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_requires_history_file() {
        let args = HistoryArgs {
            action: HistoryAction::List,
        };
        assert!(run_history(args, None).is_err());
    }
}
