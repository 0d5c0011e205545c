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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum EaselError {
    #[error("Data loading error: {0}")]
    Data(#[from] DataError),
    #[error("Chart catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] SerialisationError),
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file '{path}': {source}")]
    DataFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV content in '{file}': {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("Malformed JSON content in '{file}': {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported data format: {format}")]
    UnsupportedFormat { format: String },
    #[error("Record {index} in '{file}' is not an object")]
    NonObjectRow { file: String, index: usize },
    #[error("JSON document in '{file}' holds no row array")]
    MissingRowArray { file: String },
    #[error("File '{file}' is empty")]
    EmptyFile { file: String },
}
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse YAML table: {source}")]
    YamlParseError {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Failed to read table file '{path}': {source}")]
    TableFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Duplicate chart type found: '{name}'")]
    DuplicateChartType { name: String },
    #[error("Chart catalog is empty")]
    EmptyCatalog,
    #[error("Keyword table '{table}' is empty")]
    EmptyKeywordTable { table: String },
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration YAML: {source}")]
    InvalidYaml {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {field} = {value}")]
    InvalidValue { field: String, value: String },
}
#[derive(Error, Debug)]
pub enum SerialisationError {
    #[error("JSON serialisation failed: {source}")]
    JsonSerialisationError {
        #[from]
        source: serde_json::Error,
    },
}
pub type Result<T> = std::result::Result<T, EaselError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type SerialisationResult<T> = std::result::Result<T, SerialisationError>;
impl EaselError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EaselError::Data(DataError::UnsupportedFormat { .. })
                | EaselError::Data(DataError::EmptyFile { .. })
                | EaselError::Data(DataError::Csv { .. })
                | EaselError::Data(DataError::Json { .. })
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            EaselError::Data(_) => "Data",
            EaselError::Catalog(_) => "Catalog",
            EaselError::Config(_) => "Configuration",
            EaselError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            EaselError::Data(DataError::UnsupportedFormat { .. }) => vec![
                "Save the file as .csv or .json".to_string(),
                "Check the file extension matches its content".to_string(),
            ],
            EaselError::Data(DataError::Csv { .. }) => vec![
                "Make sure the first line holds the column headers".to_string(),
                "Check for unbalanced quotes".to_string(),
            ],
            EaselError::Data(DataError::Json { .. })
            | EaselError::Data(DataError::MissingRowArray { .. })
            | EaselError::Data(DataError::NonObjectRow { .. }) => vec![
                "Provide an array of objects, one object per row".to_string(),
                "Or wrap the array in an object under a \"data\" or \"rows\" key".to_string(),
            ],
            EaselError::Data(DataError::EmptyFile { .. }) => {
                vec!["Provide a file with a header and at least one row".to_string()]
            }
            _ => vec!["Check the error message for specific guidance".to_string()],
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            EaselError::Data(DataError::UnsupportedFormat { format }) => {
                format!("Files of type '{format}' cannot be read. The previous dataset is still active.")
            }
            EaselError::Data(DataError::EmptyFile { .. }) => {
                "The file appears to be empty. Please provide data with at least one row.".to_string()
            }
            EaselError::Catalog(_) => {
                "Unable to load chart tables. Please check the configuration file.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
impl From<serde_json::Error> for EaselError {
    fn from(err: serde_json::Error) -> Self {
        EaselError::Serialisation(SerialisationError::JsonSerialisationError { source: err })
    }
}
