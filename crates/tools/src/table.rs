//! CSV-backed record tables.
//!
//! Files are read fresh on every call so edits to the data directory show up
//! without a restart. Every cell is kept as a JSON string.

use std::path::Path;

use datadesk_core::HandlerError;
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// A CSV file loaded into memory: its header row and one JSON object per row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub async fn load(path: &Path) -> Result<Self, HandlerError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                HandlerError::Failed(format!("Data file not found: {}", path.display()))
            }
            _ => HandlerError::Failed(format!("Could not read {}: {e}", path.display())),
        })?;
        Self::parse(&bytes)
            .map_err(|e| HandlerError::Failed(format!("Malformed CSV in {}: {e}", path.display())))
    }

    fn parse(bytes: &[u8]) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Record = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), Value::String(v.to_string())))
                .collect();
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }
}

/// The string value of `column` in `row`, or "" when absent.
pub fn cell<'a>(row: &'a Record, column: &str) -> &'a str {
    row.get(column).and_then(Value::as_str).unwrap_or("")
}
