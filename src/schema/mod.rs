//! Output table contracts and validation.
//!
//! Every table leaving the pipeline passes through [`validate`], which
//! checks each row against an ordered column contract, fills absent
//! optional columns with their declared defaults, and rejects missing
//! required columns, incoercible values, and columns the contract does
//! not know. The result is a uniform columnar [`Table`].

pub mod contracts;

use crate::error::{Result, RinkError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Declared value class of one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Str,
    Bool,
}

/// One column of a contract, in output order. A column without a default
/// is required.
#[derive(Debug, Clone)]
pub struct ContractColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub default: Option<Value>,
}

impl ContractColumn {
    pub fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ColumnKind, default: Value) -> Self {
        Self {
            name,
            kind,
            default: Some(default),
        }
    }
}

/// Ordered column contract for one table shape.
#[derive(Debug, Clone)]
pub struct ColumnContract {
    pub name: &'static str,
    pub columns: Vec<ContractColumn>,
}

/// A validated columnar table. Every row has one cell per column, in
/// contract order.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as an array of objects, for JSON output.
    pub fn to_json(&self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = Map::with_capacity(self.columns.len());
                for (name, value) in self.columns.iter().zip(row) {
                    obj.insert(name.clone(), value.clone());
                }
                Value::Object(obj)
            })
            .collect();
        Value::Array(rows)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_cell).collect())
            .collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{:<width$}", col, width = widths[i])?;
        }
        writeln!(f)?;
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:<width$}", cell, width = widths[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate rows against a contract and assemble the columnar table.
pub fn validate(rows: Vec<Map<String, Value>>, contract: &ColumnContract) -> Result<Table> {
    let columns: Vec<String> = contract.columns.iter().map(|c| c.name.to_string()).collect();
    let mut out_rows = Vec::with_capacity(rows.len());

    for mut row in rows {
        let mut cells = Vec::with_capacity(contract.columns.len());
        for col in &contract.columns {
            let value = match (row.remove(col.name), &col.default) {
                (Some(v), _) => coerce(v, col.kind, col.name)?,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(RinkError::Contract {
                        column: col.name.to_string(),
                        message: format!("missing required column in {} table", contract.name),
                    });
                }
            };
            cells.push(value);
        }
        if let Some(stray) = row.keys().next() {
            return Err(RinkError::Contract {
                column: stray.clone(),
                message: format!("column not declared by the {} contract", contract.name),
            });
        }
        out_rows.push(cells);
    }

    Ok(Table {
        columns,
        rows: out_rows,
    })
}

fn coerce(value: Value, kind: ColumnKind, column: &str) -> Result<Value> {
    let ok = match kind {
        ColumnKind::Int => value.as_i64().is_some() || value.as_u64().is_some(),
        // Integers widen to float.
        ColumnKind::Float => value.is_number(),
        ColumnKind::Str => value.is_string(),
        ColumnKind::Bool => value.is_boolean(),
    };
    if !ok {
        return Err(RinkError::Contract {
            column: column.to_string(),
            message: format!("expected {:?}, got {}", kind, render_type(&value)),
        });
    }
    if kind == ColumnKind::Float {
        if let Some(i) = value.as_i64() {
            return Ok(Value::from(i as f64));
        }
        if let Some(u) = value.as_u64() {
            return Ok(Value::from(u as f64));
        }
    }
    Ok(value)
}

fn render_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
