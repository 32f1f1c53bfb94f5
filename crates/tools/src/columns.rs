//! Exact-match column filters over reference CSV files (countries, currencies).

use std::path::PathBuf;

use async_trait::async_trait;
use datadesk_core::HandlerError;
use datadesk_core::tool::{Arguments, ToolHandler, ToolSpec};
use serde_json::{Value, json};

use crate::args::{optional_str, required_str};
use crate::table::{Record, Table, cell};

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// The caller picks `column` and `value`; both absent means every row.
    AnyColumn,
    /// Filter on a fixed column whose value comes from the same-named argument.
    Fixed { column: &'static str },
}

pub struct ColumnFilterTool {
    name: &'static str,
    mode: Mode,
    path: PathBuf,
}

impl ColumnFilterTool {
    /// `get_countries` over countries.csv.
    pub fn countries(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "get_countries",
            mode: Mode::AnyColumn,
            path: path.into(),
        }
    }

    /// `get_currency_by_country` over country_currency.csv.
    pub fn currency_by_country(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "get_currency_by_country",
            mode: Mode::Fixed {
                column: "country_name",
            },
            path: path.into(),
        }
    }

    pub fn spec(&self) -> ToolSpec {
        match self.mode {
            Mode::AnyColumn => ToolSpec::new(
                self.name,
                "List countries, optionally filtered where a column equals a value \
                 (e.g. column='country_code', value='US').",
                json!({
                    "type": "object",
                    "properties": {
                        "column": {
                            "type": "string",
                            "description": "Column name to filter on (e.g. 'country_code', 'country_name')."
                        },
                        "value": {
                            "type": "string",
                            "description": "Exact value the column must equal."
                        }
                    }
                }),
            ),
            Mode::Fixed { column } => ToolSpec::new(
                self.name,
                "Get the official currency used by a specific country. \
                 Provide the country name to get currency details.",
                json!({
                    "type": "object",
                    "properties": {
                        column: {
                            "type": "string",
                            "description": "The country name (e.g. 'India', 'United States', 'Japan')."
                        }
                    },
                    "required": [column]
                }),
            ),
        }
    }
}

fn matching(rows: Vec<Record>, column: &str, value: &str) -> Vec<Value> {
    rows.into_iter()
        .filter(|row| cell(row, column) == value)
        .map(Value::Object)
        .collect()
}

#[async_trait]
impl ToolHandler for ColumnFilterTool {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value, HandlerError> {
        match self.mode {
            Mode::AnyColumn => {
                let column = optional_str(arguments, "column")?;
                let value = optional_str(arguments, "value")?;
                let table = Table::load(&self.path).await?;

                let (Some(column), Some(value)) = (column, value) else {
                    return Ok(Value::Array(
                        table.into_rows().into_iter().map(Value::Object).collect(),
                    ));
                };
                if !table.has_column(column) {
                    return Err(HandlerError::Failed(format!(
                        "Column '{column}' does not exist"
                    )));
                }
                Ok(Value::Array(matching(table.into_rows(), column, value)))
            }
            Mode::Fixed { column } => {
                let value = required_str(arguments, column)?;
                let table = Table::load(&self.path).await?;
                let rows = matching(table.into_rows(), column, value);
                if rows.is_empty() {
                    return Err(HandlerError::NotFound(format!(
                        "No currency data found for '{value}'"
                    )));
                }
                Ok(Value::Array(rows))
            }
        }
    }
}
