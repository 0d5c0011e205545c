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
use crate::error::Result;
use crate::insights::Insight;
use crate::recommend::ChartRecommendation;
use crate::VisualisationEngine;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Holds the active dataset. A failed load leaves the previous one in place.
#[derive(Debug, Default)]
pub struct Session {
    engine: VisualisationEngine,
    active: Option<Dataset>,
}
impl Session {
    pub fn new(engine: VisualisationEngine) -> Self {
        Self {
            engine,
            active: None,
        }
    }
    pub fn engine(&self) -> &VisualisationEngine {
        &self.engine
    }
    pub fn active(&self) -> Option<&Dataset> {
        self.active.as_ref()
    }
    pub fn clear(&mut self) {
        self.active = None;
    }
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&Dataset> {
        let loaded = self.engine.load_path(path.as_ref());
        self.replace(loaded, &path.as_ref().display().to_string())
    }
    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        format: SourceFormat,
    ) -> Result<&Dataset> {
        let loaded = self.engine.load_bytes(bytes, file_name, format);
        self.replace(loaded, file_name)
    }
    pub fn load_rows(
        &mut self,
        rows: Vec<Row>,
        file_name: &str,
        format: SourceFormat,
    ) -> &Dataset {
        let dataset = self.engine.dataset_from_rows(rows, file_name, format);
        self.active.insert(dataset)
    }
    fn replace(&mut self, loaded: Result<Dataset>, source: &str) -> Result<&Dataset> {
        match loaded {
            Ok(dataset) => {
                info!(source, rows = dataset.row_count(), "active dataset replaced");
                Ok(self.active.insert(dataset))
            }
            Err(err) => {
                warn!(
                    source,
                    error = %err,
                    kept_previous = self.active.is_some(),
                    "load rejected"
                );
                Err(err)
            }
        }
    }
    pub fn recommendations(&self) -> Vec<ChartRecommendation> {
        self.active
            .as_ref()
            .map(|d| self.engine.recommend(d))
            .unwrap_or_default()
    }
    pub fn generate(&self, text: &str) -> Option<Value> {
        self.active
            .as_ref()
            .and_then(|d| self.engine.generate_from_text(text, d))
    }
    pub fn insights(&self, x_field: Option<&str>, y_field: Option<&str>) -> Vec<Insight> {
        self.active
            .as_ref()
            .map(|d| self.engine.insights(d, x_field, y_field))
            .unwrap_or_default()
    }
}
