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

use crate::dataset::{
    coerce_number, is_missing, value_key, ColumnSchema, ColumnType, DatasetSchema, Row,
    SourceFormat,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

const BOOLEAN_TOKENS: [&str; 6] = ["true", "false", "True", "False", "0", "1"];

// ISO, US, EU and Japanese orderings.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{1,2}-\d{1,2}([T ]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?$",
        r"^\d{4}-\d{1,2}$",
        r"^\d{1,2}/\d{1,2}/\d{4}$",
        r"^\d{1,2}\.\d{1,2}\.\d{4}$",
        r"^\d{1,2}-\d{1,2}-\d{4}$",
        r"^\d{4}/\d{1,2}/\d{1,2}$",
        r"^\d{4}年\d{1,2}月(\d{1,2}日)?$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub max_sample_values: usize,
    pub datetime_confidence_threshold: f64,
    pub temporal_formats: Vec<String>,
}
impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_sample_values: 5,
            datetime_confidence_threshold: 0.8,
            temporal_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%m/%d/%Y".to_string(),
                "%d/%m/%Y".to_string(),
                "%d.%m.%Y".to_string(),
                "%Y/%m/%d".to_string(),
                "%b %d, %Y".to_string(),
                "%B %d, %Y".to_string(),
                "%d %b %Y".to_string(),
                "%d %B %Y".to_string(),
            ],
        }
    }
}
impl InferenceConfig {
    pub fn for_strict_dates() -> Self {
        Self {
            datetime_confidence_threshold: 1.0,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_columns: usize,
    pub numeric_count: usize,
    pub categorical_count: usize,
    pub temporal_count: usize,
    pub boolean_count: usize,
    pub unknown_count: usize,
    pub high_cardinality_text_count: usize,
}
impl DatasetSummary {
    pub fn from_schema(schema: &DatasetSchema) -> Self {
        schema
            .columns
            .iter()
            .fold(Self::default(), |mut summary, column| {
                summary.total_columns += 1;
                match column.column_type {
                    ColumnType::Number => summary.numeric_count += 1,
                    ColumnType::Datetime => summary.temporal_count += 1,
                    ColumnType::Boolean => summary.boolean_count += 1,
                    ColumnType::Unknown => summary.unknown_count += 1,
                    ColumnType::String if column.is_categorical() => {
                        summary.categorical_count += 1
                    }
                    ColumnType::String => summary.high_cardinality_text_count += 1,
                }
                summary
            })
    }
    pub fn has_temporal(&self) -> bool {
        self.temporal_count > 0
    }
}
impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} columns ({} numeric, {} categorical, {} temporal)",
            self.total_columns, self.numeric_count, self.categorical_count, self.temporal_count
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaInferencer {
    config: InferenceConfig,
}
impl SchemaInferencer {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
    pub fn infer(
        &self,
        rows: &[Row],
        file_name: impl Into<String>,
        format: SourceFormat,
    ) -> DatasetSchema {
        let file_name = file_name.into();
        let Some(first) = rows.first() else {
            debug!(file = %file_name, "empty dataset, no columns inferred");
            return DatasetSchema {
                columns: Vec::new(),
                row_count: 0,
                file_name,
                format,
            };
        };
        let names: Vec<&String> = first.keys().collect();
        let columns: Vec<ColumnSchema> = names
            .par_iter()
            .map(|name| self.profile_column(name, rows))
            .collect();
        debug!(
            file = %file_name,
            rows = rows.len(),
            columns = columns.len(),
            "schema inferred"
        );
        DatasetSchema {
            columns,
            row_count: rows.len(),
            file_name,
            format,
        }
    }
    fn profile_column(&self, name: &str, rows: &[Row]) -> ColumnSchema {
        let total_rows = rows.len();
        let present: Vec<&Value> = rows
            .iter()
            .map(|row| row.get(name))
            .filter(|v| !is_missing(*v))
            .flatten()
            .collect();
        let null_count = total_rows - present.len();
        let null_ratio = if total_rows > 0 {
            null_count as f64 / total_rows as f64
        } else {
            0.0
        };
        let column_type = self.detect_column_type(&present);
        let unique_count = present
            .iter()
            .map(|v| value_key(v))
            .collect::<HashSet<_>>()
            .len();
        let sample_values = self.sample_values(&present, column_type);
        ColumnSchema {
            name: name.to_string(),
            column_type,
            sample_values,
            unique_count,
            null_count,
            null_ratio,
        }
    }
    fn detect_column_type(&self, values: &[&Value]) -> ColumnType {
        if values.is_empty() {
            return ColumnType::Unknown;
        }
        if values.iter().all(|v| is_boolean_like(v)) {
            return ColumnType::Boolean;
        }
        if values.iter().all(|v| coerce_number(v).is_some()) {
            return ColumnType::Number;
        }
        let temporal_hits = values.iter().filter(|v| self.is_date_like(v)).count();
        let confidence = temporal_hits as f64 / values.len() as f64;
        if confidence >= self.config.datetime_confidence_threshold {
            return ColumnType::Datetime;
        }
        ColumnType::String
    }
    fn is_date_like(&self, value: &Value) -> bool {
        let Value::String(raw) = value else {
            return false;
        };
        let raw = raw.trim();
        DATE_PATTERNS.iter().any(|re| re.is_match(raw)) || self.parse_datetime(raw).is_some()
    }
    fn parse_datetime(&self, value: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
            return Some(dt.naive_utc());
        }
        for format in &self.config.temporal_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Some(dt);
            }
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return date.and_hms_opt(0, 0, 0);
            }
        }
        None
    }
    fn sample_values(&self, values: &[&Value], column_type: ColumnType) -> Vec<Value> {
        let mut seen = HashSet::new();
        values
            .iter()
            .filter(|v| seen.insert(value_key(v)))
            .take(self.config.max_sample_values)
            .map(|v| match column_type {
                ColumnType::Number => coerce_number(v)
                    .and_then(serde_json::Number::from_f64)
                    .map(normalise_number)
                    .unwrap_or_else(|| (*v).clone()),
                _ => (*v).clone(),
            })
            .collect()
    }
}

fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => BOOLEAN_TOKENS.contains(&s.as_str()),
        _ => false,
    }
}

// Keeps integral samples integral so "3" samples as 3 rather than 3.0.
fn normalise_number(n: serde_json::Number) -> Value {
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
        _ => Value::Number(n),
    }
}
