// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::schema::SchemaInferencer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Columns whose distinct non-null count reaches this ceiling are treated as
/// free text: excluded from categorical counts, grouping and colour encodings.
pub const MAX_CATEGORICAL_CARDINALITY: usize = 50;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Json,
    Xlsx,
}
impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            "xlsx" | "xls" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Xlsx => "xlsx",
        }
    }
}
impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Datetime,
    Boolean,
    Unknown,
}
impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number)
    }
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Datetime)
    }
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::String)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Datetime => "datetime",
            ColumnType::Boolean => "boolean",
            ColumnType::Unknown => "unknown",
        }
    }
}
impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub sample_values: Vec<Value>,
    pub unique_count: usize,
    pub null_count: usize,
    pub null_ratio: f64,
}
impl ColumnSchema {
    /// String-typed with fewer than [`MAX_CATEGORICAL_CARDINALITY`] distinct values.
    pub fn is_categorical(&self) -> bool {
        self.column_type.is_textual() && self.unique_count < MAX_CATEGORICAL_CARDINALITY
    }
    pub fn is_high_cardinality_text(&self) -> bool {
        self.column_type.is_textual() && !self.is_categorical()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub columns: Vec<ColumnSchema>,
    pub row_count: usize,
    pub file_name: String,
    pub format: SourceFormat,
}
impl DatasetSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.column_type.is_numeric())
    }
    pub fn categorical_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.is_categorical())
    }
    pub fn temporal_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.column_type.is_temporal())
    }
    pub fn first_numeric(&self) -> Option<&ColumnSchema> {
        self.numeric_columns().next()
    }
    pub fn first_categorical(&self) -> Option<&ColumnSchema> {
        self.categorical_columns().next()
    }
    pub fn first_temporal(&self) -> Option<&ColumnSchema> {
        self.temporal_columns().next()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub schema: DatasetSchema,
}
impl Dataset {
    pub fn from_rows(
        rows: Vec<Row>,
        file_name: impl Into<String>,
        format: SourceFormat,
        inferencer: &SchemaInferencer,
    ) -> Self {
        let schema = inferencer.infer(&rows, file_name, format);
        Self { rows, schema }
    }
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Null, missing and empty-string cells all count as absent.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Native numbers, or strings that parse once thousands separators are removed.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonical text used for distinct counting and category keys.
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
