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

use crate::dataset::{Dataset, Row, SourceFormat};
use crate::error::{DataError, DataResult};
use crate::schema::SchemaInferencer;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Decodes csv and json sources into rows and infers their schema.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    delimiter: u8,
    inferencer: SchemaInferencer,
}
impl Default for DatasetLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            inferencer: SchemaInferencer::default(),
        }
    }
}
impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn with_inferencer(mut self, inferencer: SchemaInferencer) -> Self {
        self.inferencer = inferencer;
        self
    }
    pub fn inferencer(&self) -> &SchemaInferencer {
        &self.inferencer
    }
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> DataResult<Dataset> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let format = SourceFormat::from_extension(&extension).ok_or_else(|| {
            DataError::UnsupportedFormat {
                format: if extension.is_empty() {
                    "unknown".to_string()
                } else {
                    extension.clone()
                },
            }
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if format == SourceFormat::Xlsx {
            return Err(DataError::UnsupportedFormat {
                format: format.to_string(),
            });
        }
        let bytes = fs::read(path).map_err(|source| DataError::DataFileError {
            path: path.display().to_string(),
            source,
        })?;
        self.load_bytes(&bytes, file_name, format)
    }
    pub fn load_bytes(
        &self,
        bytes: &[u8],
        file_name: impl Into<String>,
        format: SourceFormat,
    ) -> DataResult<Dataset> {
        let file_name = file_name.into();
        let rows = match format {
            SourceFormat::Csv => self.decode_csv(bytes, &file_name)?,
            SourceFormat::Json => decode_json(bytes, &file_name)?,
            SourceFormat::Xlsx => {
                return Err(DataError::UnsupportedFormat {
                    format: format.to_string(),
                })
            }
        };
        let dataset = Dataset::from_rows(rows, file_name, format, &self.inferencer);
        info!(
            file = %dataset.schema.file_name,
            format = %format,
            rows = dataset.row_count(),
            columns = dataset.schema.columns.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
    fn decode_csv(&self, bytes: &[u8], file_name: &str) -> DataResult<Vec<Row>> {
        let csv_error = |source| DataError::Csv {
            file: file_name.to_string(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(DataError::EmptyFile {
                file: file_name.to_string(),
            });
        }
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let row: Row = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let cell = record.get(i).unwrap_or_default();
                    (h.clone(), Value::String(cell.to_string()))
                })
                .collect();
            rows.push(row);
        }
        debug!(file = file_name, rows = rows.len(), "csv decoded");
        Ok(rows)
    }
}

fn decode_json(bytes: &[u8], file_name: &str) -> DataResult<Vec<Row>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DataError::EmptyFile {
            file: file_name.to_string(),
        });
    }
    let document: Value = serde_json::from_slice(bytes).map_err(|source| DataError::Json {
        file: file_name.to_string(),
        source,
    })?;
    let records = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data").or_else(|| map.remove("rows")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(DataError::MissingRowArray {
                    file: file_name.to_string(),
                })
            }
        },
        _ => {
            return Err(DataError::MissingRowArray {
                file: file_name.to_string(),
            })
        }
    };
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, flatten_scalar(v)))
                .collect::<Row>()),
            _ => Err(DataError::NonObjectRow {
                file: file_name.to_string(),
                index,
            }),
        })
        .collect::<DataResult<Vec<Row>>>()?;
    debug!(file = file_name, rows = rows.len(), "json decoded");
    Ok(rows)
}

// Rows hold scalars only; nested structures are kept as their JSON text.
fn flatten_scalar(value: Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        scalar => scalar,
    }
}
