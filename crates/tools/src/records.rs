//! Employee and product lookups over CSV files.
//!
//! Both tools share one shape: fetch by numeric id, search by partial name,
//! or list a group (department / category). Only the column and argument
//! names differ, so they are described by a [`RecordKind`].

use std::path::PathBuf;

use async_trait::async_trait;
use datadesk_core::HandlerError;
use datadesk_core::tool::{Arguments, ToolHandler, ToolSpec};
use serde_json::{Value, json};
use tracing::debug;

use crate::args::{optional_int, optional_str};
use crate::table::{Record, Table, cell};

/// Column and argument names for one kind of record.
#[derive(Debug, Clone, Copy)]
pub struct RecordKind {
    pub tool_name: &'static str,
    /// Used in not-found messages ("Employee with id=7 not found")
    pub singular: &'static str,
    /// Key of the result list ("employees")
    pub plural: &'static str,
    pub id_arg: &'static str,
    pub group_column: &'static str,
    pub description: &'static str,
}

pub const EMPLOYEES: RecordKind = RecordKind {
    tool_name: "get_employees",
    singular: "Employee",
    plural: "employees",
    id_arg: "employee_id",
    group_column: "department",
    description: "Fetch employee records (reads employees.csv). You can list all employees, \
                  filter by department, search by name, or look up a specific employee by ID.",
};

pub const PRODUCTS: RecordKind = RecordKind {
    tool_name: "get_products",
    singular: "Product",
    plural: "products",
    id_arg: "product_id",
    group_column: "category",
    description: "Fetch product records (reads products.csv). You can list all products, \
                  filter by category, search by name, or look up a specific product by ID.",
};

pub struct RecordLookupTool {
    kind: RecordKind,
    path: PathBuf,
}

impl RecordLookupTool {
    pub fn new(kind: RecordKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn spec(&self) -> ToolSpec {
        let k = &self.kind;
        ToolSpec::new(
            k.tool_name,
            k.description,
            json!({
                "type": "object",
                "properties": {
                    k.group_column: {
                        "type": "string",
                        "description": format!("Filter {} by {} (case-insensitive).", k.plural, k.group_column),
                    },
                    "name": {
                        "type": "string",
                        "description": format!("Partial name search: returns {} whose name contains this string.", k.plural),
                    },
                    k.id_arg: {
                        "type": "integer",
                        "description": format!("Fetch a single {} by numeric ID.", k.singular.to_lowercase()),
                    },
                },
            }),
        )
    }

    fn find_by_id(&self, rows: Vec<Record>, id: i64) -> Result<Value, HandlerError> {
        rows.into_iter()
            .find(|row| cell(row, "id").parse::<i64>().ok() == Some(id))
            .map(Value::Object)
            .ok_or_else(|| {
                HandlerError::NotFound(format!("{} with id={id} not found", self.kind.singular))
            })
    }
}

#[async_trait]
impl ToolHandler for RecordLookupTool {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value, HandlerError> {
        let id = optional_int(arguments, self.kind.id_arg)?;
        let name = optional_str(arguments, "name")?;
        let group = optional_str(arguments, self.kind.group_column)?;

        let table = Table::load(&self.path).await?;
        let rows = table.into_rows();

        if let Some(id) = id {
            return self.find_by_id(rows, id);
        }

        let name = name.map(str::to_lowercase);
        let matches: Vec<Value> = rows
            .into_iter()
            .filter(|row| match &name {
                Some(needle) => cell(row, "name").to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .filter(|row| match group {
                Some(g) => cell(row, self.kind.group_column).eq_ignore_ascii_case(g),
                None => true,
            })
            .map(Value::Object)
            .collect();

        debug!(
            tool = self.kind.tool_name,
            matches = matches.len(),
            "Record lookup"
        );

        Ok(json!({
            "count": matches.len(),
            self.kind.plural: matches,
        }))
    }
}
