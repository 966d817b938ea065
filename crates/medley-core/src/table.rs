//! Tabular data loader: uploaded delimited text -> typed `Table`.
//!
//! First record is the header (names must be unique), every data row
//! must match the header width, and parsing is atomic: any structural
//! problem fails the whole load and no partial table escapes. Column
//! types are inferred from content the way a conventional CSV reader
//! would: numeric, then ISO date, then text.

use crate::error::ToolError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inferred type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Date,
    Text,
}

/// Rectangular grid of named, typed columns. Cells are kept as the raw
/// strings from the upload; typed access goes through `numeric_column`.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<String>>,
}

/// Summary statistics for one numeric column (pandas `describe` subset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` when fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl Table {
    /// Parse an uploaded delimited file. Whole-file-or-nothing: every
    /// error path returns before a `Table` is constructed.
    pub fn from_csv(raw: &[u8]) -> Result<Self, ToolError> {
        // Flexible reader so the width check below owns the error message.
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(raw);

        let headers = reader
            .headers()
            .map_err(|e| ToolError::MalformedInput(format!("unreadable header row: {}", e)))?
            .clone();
        if headers.is_empty() {
            return Err(ToolError::MalformedInput(
                "empty file: no header row".to_string(),
            ));
        }

        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ToolError::MalformedInput(format!(
                    "duplicate column name: {:?}",
                    name
                )));
            }
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| ToolError::MalformedInput(format!("row {}: {}", i + 1, e)))?;
            if record.len() != columns.len() {
                return Err(ToolError::MalformedInput(format!(
                    "row {}: expected {} fields, found {}",
                    i + 1,
                    columns.len(),
                    record.len()
                )));
            }
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        let types = infer_types(&columns, &rows);
        Ok(Self {
            columns,
            types,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.types
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// First `n` rows, for the upload preview.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(n)]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Raw string cells of one column. Missing column is a render-layer
    /// error: selections are restricted to real column names upstream.
    pub fn column_values(&self, name: &str) -> Result<Vec<&str>, ToolError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ToolError::Render(format!("no such column: {:?}", name)))?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Column as `f64`, for numeric-only renderers. Any unparsable or
    /// empty cell fails the request with a precise message.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, ToolError> {
        let values = self.column_values(name)?;
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.parse::<f64>().map_err(|_| {
                    ToolError::Render(format!(
                        "column {:?} is not numeric at row {} (value {:?})",
                        name,
                        i + 1,
                        v
                    ))
                })
            })
            .collect()
    }

    /// Per-numeric-column statistics, mirroring the reference screen's
    /// `describe()` output. Date and text columns are skipped.
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .zip(&self.types)
            .filter(|(_, ty)| **ty == ColumnType::Numeric)
            .filter_map(|(name, _)| {
                let idx = self.column_index(name)?;
                let values: Vec<f64> = self
                    .rows
                    .iter()
                    .filter_map(|r| r[idx].parse::<f64>().ok())
                    .collect();
                if values.is_empty() {
                    return None;
                }
                let count = values.len();
                let mean = values.iter().sum::<f64>() / count as f64;
                let std = if count > 1 {
                    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                        / (count - 1) as f64;
                    Some(var.sqrt())
                } else {
                    None
                };
                let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                Some(ColumnSummary {
                    name: name.clone(),
                    count,
                    mean,
                    std,
                    min,
                    max,
                })
            })
            .collect()
    }
}

fn infer_types(columns: &[String], rows: &[Vec<String>]) -> Vec<ColumnType> {
    (0..columns.len())
        .map(|idx| {
            let cells: Vec<&str> = rows
                .iter()
                .map(|r| r[idx].as_str())
                .filter(|c| !c.is_empty())
                .collect();
            if cells.is_empty() {
                return ColumnType::Text;
            }
            if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
                ColumnType::Numeric
            } else if cells
                .iter()
                .all(|c| NaiveDate::parse_from_str(c, "%Y-%m-%d").is_ok())
            {
                ColumnType::Date
            } else {
                ColumnType::Text
            }
        })
        .collect()
}
