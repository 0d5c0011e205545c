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

use crate::compiler::CompilerConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::insights::InsightConfig;
use crate::schema::InferenceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Tunables for every stage. Missing sections and keys keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub inference: InferenceConfig,
    pub compiler: CompilerConfig,
    pub insights: InsightConfig,
}
impl EngineConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::ConfigFileError {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }
    pub fn from_yaml_str(yaml_content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = if yaml_content.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml_content)?
        };
        config.validate()?;
        debug!("engine configuration loaded");
        Ok(config)
    }
    pub fn validate(&self) -> ConfigResult<()> {
        let threshold = self.inference.datetime_confidence_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(invalid("inference.datetime_confidence_threshold", threshold));
        }
        if self.inference.max_sample_values == 0 {
            return Err(invalid("inference.max_sample_values", 0));
        }
        if self.compiler.palette.len() < 2 {
            return Err(invalid(
                "compiler.palette",
                format!("{} colours", self.compiler.palette.len()),
            ));
        }
        if self.compiler.histogram_max_bins == 0 {
            return Err(invalid("compiler.histogram_max_bins", 0));
        }
        if self.compiler.boxplot_extent <= 0.0 {
            return Err(invalid("compiler.boxplot_extent", self.compiler.boxplot_extent));
        }
        if self.insights.outlier_sigma <= 0.0 {
            return Err(invalid("insights.outlier_sigma", self.insights.outlier_sigma));
        }
        if self.insights.trend_factor < 0.0 {
            return Err(invalid("insights.trend_factor", self.insights.trend_factor));
        }
        Ok(())
    }
    pub fn for_light_theme() -> Self {
        Self {
            compiler: CompilerConfig::for_light_theme(),
            ..Default::default()
        }
    }
    pub fn for_strict_analysis() -> Self {
        Self {
            inference: InferenceConfig::for_strict_dates(),
            insights: InsightConfig::for_strict_outliers(),
            ..Default::default()
        }
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
