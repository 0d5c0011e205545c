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

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod dataset;
pub mod error;
pub mod insights;
pub mod intent;
pub mod loader;
pub mod recommend;
pub mod schema;
pub mod session;

pub use catalog::{ArchetypeDescriptor, ChartCatalog, ChartCategory, ChartType, Requirements};
pub use compiler::{to_pretty_json, CompileFlags, CompilerConfig, SpecCompiler};
pub use config::EngineConfig;
pub use dataset::{
    ColumnSchema, ColumnType, Dataset, DatasetSchema, Row, SourceFormat,
    MAX_CATEGORICAL_CARDINALITY,
};
pub use error::{CatalogError, ConfigError, DataError, EaselError, Result};
pub use insights::{Insight, InsightConfig, InsightGenerator, InsightKind, InsightValue};
pub use intent::{Aggregation, ChartIntent, IntentParser, KeywordTables};
pub use loader::DatasetLoader;
pub use recommend::{ChartRecommendation, ChartScorer, FieldBindings};
pub use schema::{DatasetSummary, InferenceConfig, SchemaInferencer};
pub use session::Session;

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Ties the pipeline stages together over injectable catalog and keyword tables.
#[derive(Debug, Clone)]
pub struct VisualisationEngine {
    catalog: ChartCatalog,
    keywords: KeywordTables,
    loader: DatasetLoader,
    compiler: SpecCompiler,
    insights: InsightGenerator,
}
impl Default for VisualisationEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}
impl VisualisationEngine {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: EngineConfig) -> Self {
        info!("visualisation engine initialised");
        Self {
            catalog: ChartCatalog::builtin().clone(),
            keywords: KeywordTables::builtin().clone(),
            loader: DatasetLoader::new()
                .with_inferencer(SchemaInferencer::with_config(config.inference)),
            compiler: SpecCompiler::with_config(config.compiler),
            insights: InsightGenerator::with_config(config.insights),
        }
    }
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_config(EngineConfig::from_yaml_file(path)?))
    }
    pub fn with_catalog(mut self, catalog: ChartCatalog) -> Self {
        self.catalog = catalog;
        self
    }
    pub fn with_keywords(mut self, keywords: KeywordTables) -> Self {
        self.keywords = keywords;
        self
    }
    pub fn with_loader(mut self, loader: DatasetLoader) -> Self {
        self.loader = loader;
        self
    }
    pub fn catalog(&self) -> &ChartCatalog {
        &self.catalog
    }
    pub fn keywords(&self) -> &KeywordTables {
        &self.keywords
    }
    pub fn compiler(&self) -> &SpecCompiler {
        &self.compiler
    }
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        Ok(self.loader.load_path(path)?)
    }
    pub fn load_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
        format: SourceFormat,
    ) -> Result<Dataset> {
        Ok(self.loader.load_bytes(bytes, file_name, format)?)
    }
    pub fn dataset_from_rows(
        &self,
        rows: Vec<Row>,
        file_name: &str,
        format: SourceFormat,
    ) -> Dataset {
        let inferencer = self.loader.inferencer();
        Dataset::from_rows(rows, file_name, format, inferencer)
    }
    pub fn summary(&self, dataset: &Dataset) -> DatasetSummary {
        DatasetSummary::from_schema(&dataset.schema)
    }
    pub fn recommend(&self, dataset: &Dataset) -> Vec<ChartRecommendation> {
        ChartScorer::new(&self.catalog, &self.compiler).recommend(dataset)
    }
    pub fn parse_intent(&self, text: &str, schema: &DatasetSchema) -> ChartIntent {
        IntentParser::new(&self.keywords).parse(text, schema)
    }
    pub fn compile_intent(&self, dataset: &Dataset, intent: &ChartIntent) -> Option<Value> {
        self.compiler
            .compile_intent(&dataset.rows, &dataset.schema, intent)
    }
    /// A compiled spec for the request, or `None` when no chart can be resolved.
    pub fn generate_from_text(&self, text: &str, dataset: &Dataset) -> Option<Value> {
        let intent = self.parse_intent(text, &dataset.schema);
        let spec = self.compile_intent(dataset, &intent);
        debug!(resolved = spec.is_some(), "free-text request handled");
        spec
    }
    pub fn insights(
        &self,
        dataset: &Dataset,
        x_field: Option<&str>,
        y_field: Option<&str>,
    ) -> Vec<Insight> {
        self.insights.generate(dataset, x_field, y_field)
    }
}
