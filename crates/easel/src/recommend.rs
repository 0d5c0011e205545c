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

use crate::catalog::{ArchetypeDescriptor, ChartCatalog, ChartCategory, ChartType};
use crate::compiler::{secondary_measure, CompileFlags, SpecCompiler};
use crate::dataset::{ColumnSchema, Dataset, DatasetSchema};
use crate::schema::DatasetSummary;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const BASE_SCORE: i32 = 50;
const EXACT_MATCH_BONUS: i32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecommendation {
    pub chart_type: ChartType,
    pub title: String,
    pub description: String,
    pub category: ChartCategory,
    pub score: u8,
    pub bindings: FieldBindings,
    pub spec: Value,
}

#[derive(Debug, Clone, Copy)]
pub struct ChartScorer<'a> {
    catalog: &'a ChartCatalog,
    compiler: &'a SpecCompiler,
}
impl<'a> ChartScorer<'a> {
    pub fn new(catalog: &'a ChartCatalog, compiler: &'a SpecCompiler) -> Self {
        Self { catalog, compiler }
    }
    /// Suitability in `0..=100`. Zero means the archetype's minimums are not met.
    pub fn score(&self, descriptor: &ArchetypeDescriptor, summary: &DatasetSummary) -> u8 {
        let req = &descriptor.requirements;
        let numeric = summary.numeric_count;
        let categorical = summary.categorical_count;
        let has_temporal = summary.has_temporal();
        if !req.is_satisfied_by(numeric, categorical, has_temporal) {
            return 0;
        }
        let mut score = BASE_SCORE;
        if numeric == req.min_numeric {
            score += EXACT_MATCH_BONUS;
        }
        if categorical == req.min_categorical {
            score += EXACT_MATCH_BONUS;
        }
        if req.requires_temporal == has_temporal {
            score += EXACT_MATCH_BONUS;
        }
        score += match descriptor.chart_type {
            ChartType::Bar if categorical >= 1 && numeric >= 1 => 15,
            ChartType::Line if has_temporal => 20,
            ChartType::Scatter if numeric >= 2 => 15,
            ChartType::Pie if categorical == 1 && numeric == 1 => 10,
            _ => 0,
        };
        score.clamp(0, 100) as u8
    }
    pub fn recommend(&self, dataset: &Dataset) -> Vec<ChartRecommendation> {
        let schema = &dataset.schema;
        let summary = DatasetSummary::from_schema(schema);
        let eligible: Vec<(&ArchetypeDescriptor, u8)> = self
            .catalog
            .iter()
            .map(|descriptor| (descriptor, self.score(descriptor, &summary)))
            .filter(|(_, score)| *score > 0)
            .collect();
        let compiled: Vec<Option<ChartRecommendation>> = eligible
            .par_iter()
            .map(|(descriptor, score)| self.build(descriptor, *score, dataset))
            .collect();
        let mut recommendations: Vec<ChartRecommendation> =
            compiled.into_iter().flatten().collect();
        recommendations.sort_by(|a, b| b.score.cmp(&a.score));
        debug!(
            archetypes = self.catalog.len(),
            eligible = eligible.len(),
            recommended = recommendations.len(),
            "charts scored"
        );
        recommendations
    }
    fn build(
        &self,
        descriptor: &ArchetypeDescriptor,
        score: u8,
        dataset: &Dataset,
    ) -> Option<ChartRecommendation> {
        let bindings = suggest_bindings(descriptor, &dataset.schema);
        let flags = CompileFlags::default()
            .with_secondary_measure(secondary_measure(&dataset.schema, bindings.y.as_deref()));
        let Some(spec) =
            self.compiler
                .compile(&dataset.rows, descriptor.chart_type, &bindings, &flags)
        else {
            warn!(
                chart_type = %descriptor.chart_type,
                "archetype passed its gate but produced no spec"
            );
            return None;
        };
        Some(ChartRecommendation {
            chart_type: descriptor.chart_type,
            title: synthesise_title(descriptor.category, &bindings),
            description: descriptor.description.clone(),
            category: descriptor.category,
            score,
            bindings,
            spec,
        })
    }
}

fn name_of(column: Option<&ColumnSchema>) -> Option<String> {
    column.map(|c| c.name.clone())
}

/// Channel assignment for one archetype. Independent of its score.
pub fn suggest_bindings(descriptor: &ArchetypeDescriptor, schema: &DatasetSchema) -> FieldBindings {
    let chart_type = descriptor.chart_type;
    let numeric: Vec<&ColumnSchema> = schema.numeric_columns().collect();
    let categorical: Vec<&ColumnSchema> = schema.categorical_columns().collect();
    let temporal = if descriptor.requirements.requires_temporal {
        schema.first_temporal()
    } else {
        None
    };
    let generic_x = temporal
        .or_else(|| categorical.first().copied())
        .or_else(|| numeric.first().copied());
    let x = if chart_type.is_point() {
        numeric.get(1).copied().or(generic_x)
    } else {
        generic_x
    };
    let color = categorical
        .get(1)
        .or_else(|| categorical.first().filter(|_| !chart_type.is_radial()))
        .copied();
    let size = if chart_type.is_point() {
        numeric.get(2).copied()
    } else {
        None
    };
    FieldBindings {
        x: name_of(x),
        y: name_of(numeric.first().copied()),
        color: name_of(color),
        size: name_of(size),
    }
}

pub fn synthesise_title(category: ChartCategory, bindings: &FieldBindings) -> String {
    let x = bindings.x.as_deref().unwrap_or_default();
    let y = bindings.y.as_deref().unwrap_or_default();
    match category {
        ChartCategory::Trend => format!("{y} over {x}"),
        ChartCategory::Comparison => match bindings.color.as_deref() {
            Some(color) if Some(color) != bindings.x.as_deref() => {
                format!("{y} by {x} and {color}")
            }
            _ => format!("{y} by {x}"),
        },
        ChartCategory::Distribution => {
            let subject = bindings
                .y
                .as_deref()
                .or(bindings.x.as_deref())
                .unwrap_or_default();
            format!("Distribution of {subject}")
        }
        ChartCategory::Relationship => format!("{y} vs {x}"),
        ChartCategory::Composition => format!("Composition of {y} by {x}"),
    }
}
