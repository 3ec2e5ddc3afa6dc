// 📂 Input Loader - JSON / CSV exports → untyped records
//
// Records stay untyped (serde_json::Value) here; shaping them is the
// normalizer's job. Accepted inputs:
//   - a JSON array of objects
//   - a JSON REST envelope `{ "data": [...] }` (also `items`, `records`)
//   - a CSV file with a header row (every cell becomes a JSON string)

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Detect format from the file extension
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            _ => bail!(
                "Cannot detect input format of {} (expected .json or .csv)",
                path.display()
            ),
        }
    }
}

/// Load raw records from a file, choosing the format by extension
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let records = match InputFormat::detect(path)? {
        InputFormat::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open JSON file {}", path.display()))?;
            parse_json_records(&text)
                .with_context(|| format!("Failed to read records from {}", path.display()))?
        }
        InputFormat::Csv => {
            let rdr = csv::Reader::from_path(path)
                .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
            read_csv_records(rdr)
                .with_context(|| format!("Failed to read records from {}", path.display()))?
        }
    };

    tracing::info!(path = %path.display(), records = records.len(), "loaded input records");
    Ok(records)
}

/// Extract the record array from a JSON document
pub fn parse_json_records(text: &str) -> Result<Vec<Value>> {
    let doc: Value = serde_json::from_str(text).context("Invalid JSON")?;
    unwrap_envelope(doc)
}

fn unwrap_envelope(doc: Value) -> Result<Vec<Value>> {
    match doc {
        Value::Array(records) => Ok(records),
        Value::Object(mut obj) => ["data", "items", "records"]
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| anyhow!("JSON object has no data/items/records array")),
        _ => bail!("Expected a JSON array of records"),
    }
}

/// Read CSV rows as JSON objects keyed by header
pub fn read_csv_records<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<Value>> {
    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read CSV row {}", line + 2))?;
        let obj: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(h, cell)| (h.trim().to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(Value::Object(obj));
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
