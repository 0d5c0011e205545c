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

mod marks;
mod plan;
mod theme;

pub use plan::{
    secondary_measure, AreaPlan, BarPlan, ChartPlan, ComboPlan, CompileFlags, DistributionPlan,
    PointPlan, RadialPlan, SeriesPlan,
};
pub use theme::{config_block, default_palette, ThemeColors, DEFAULT_PALETTE};

use crate::catalog::ChartType;
use crate::dataset::{DatasetSchema, Row};
use crate::error::SerialisationResult;
use crate::intent::ChartIntent;
use crate::recommend::FieldBindings;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeHint {
    Pixels(u32),
    Keyword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub schema_url: String,
    pub width: SizeHint,
    pub height: SizeHint,
    pub palette: Vec<String>,
    pub theme: ThemeColors,
    pub donut_inner_radius: u32,
    pub histogram_max_bins: u32,
    pub boxplot_extent: f64,
    pub heatmap_scheme: String,
}
impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            schema_url: VEGA_LITE_SCHEMA.to_string(),
            width: SizeHint::Keyword("container".to_string()),
            height: SizeHint::Pixels(300),
            palette: default_palette(),
            theme: ThemeColors::default(),
            donut_inner_radius: 60,
            histogram_max_bins: 20,
            boxplot_extent: 1.5,
            heatmap_scheme: "viridis".to_string(),
        }
    }
}
impl CompilerConfig {
    pub fn for_light_theme() -> Self {
        Self {
            theme: ThemeColors::light(),
            ..Default::default()
        }
    }
    pub fn for_export(width: u32, height: u32) -> Self {
        Self {
            width: SizeHint::Pixels(width),
            height: SizeHint::Pixels(height),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpecCompiler {
    config: CompilerConfig,
}
impl SpecCompiler {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }
    /// `None` when the bindings lack a field the chart family needs.
    pub fn compile(
        &self,
        rows: &[Row],
        chart_type: ChartType,
        bindings: &FieldBindings,
        flags: &CompileFlags,
    ) -> Option<Value> {
        let plan = ChartPlan::from_bindings(chart_type, bindings, flags)?;
        Some(self.compile_plan(rows, &plan, flags))
    }
    pub fn compile_plan(&self, rows: &[Row], plan: &ChartPlan, flags: &CompileFlags) -> Value {
        let mut document = Map::new();
        document.insert("$schema".to_string(), json!(self.config.schema_url));
        document.insert("data".to_string(), json!({ "values": rows }));
        if !flags.filters.is_empty() {
            let transform: Vec<Value> = flags
                .filters
                .iter()
                .map(|f| json!({"filter": {"field": f.field, "equal": f.value}}))
                .collect();
            document.insert("transform".to_string(), Value::Array(transform));
        }
        document.extend(marks::render(plan, flags, &self.config));
        document.insert("width".to_string(), json!(self.config.width));
        document.insert("height".to_string(), json!(self.config.height));
        document.insert("background".to_string(), json!("transparent"));
        document.insert(
            "config".to_string(),
            config_block(&self.config.theme, &self.config.palette),
        );
        debug!(family = plan.family(), rows = rows.len(), "spec compiled");
        Value::Object(document)
    }
    /// Needs at least a chart type and an x field; otherwise no spec.
    pub fn compile_intent(
        &self,
        rows: &[Row],
        schema: &DatasetSchema,
        intent: &ChartIntent,
    ) -> Option<Value> {
        let Some(chart_type) = intent.chart_type else {
            debug!("intent has no chart type, no spec produced");
            return None;
        };
        if intent.x_field.is_none() {
            debug!(chart_type = %chart_type, "intent has no x field, no spec produced");
            return None;
        }
        let bindings = FieldBindings {
            x: intent.x_field.clone(),
            y: intent.y_field.clone(),
            color: intent.color_field.clone(),
            size: intent.size_field.clone(),
        };
        let flags = CompileFlags::from_intent(intent, schema);
        self.compile(rows, chart_type, &bindings, &flags)
    }
}

pub fn to_pretty_json(spec: &Value) -> SerialisationResult<String> {
    Ok(serde_json::to_string_pretty(spec)?)
}
