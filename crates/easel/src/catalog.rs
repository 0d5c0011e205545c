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

use crate::error::{CatalogError, CatalogResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, error};

const BUILTIN_CATALOG: &str = include_str!("../config/chart_catalog.yml");

static DEFAULT_CATALOG: Lazy<ChartCatalog> = Lazy::new(|| {
    ChartCatalog::from_yaml_str(BUILTIN_CATALOG).unwrap_or_else(|err| {
        error!(error = %err, "built-in chart catalog failed to load");
        ChartCatalog::default()
    })
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    HorizontalBar,
    StackedBar,
    Line,
    Area,
    StackedArea,
    Scatter,
    Bubble,
    Histogram,
    Boxplot,
    Heatmap,
    Pie,
    Donut,
    Combo,
}
impl ChartType {
    pub const ALL: [ChartType; 14] = [
        ChartType::Bar,
        ChartType::HorizontalBar,
        ChartType::StackedBar,
        ChartType::Line,
        ChartType::Area,
        ChartType::StackedArea,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Histogram,
        ChartType::Boxplot,
        ChartType::Heatmap,
        ChartType::Pie,
        ChartType::Donut,
        ChartType::Combo,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::HorizontalBar => "horizontal_bar",
            ChartType::StackedBar => "stacked_bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::StackedArea => "stacked_area",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Histogram => "histogram",
            ChartType::Boxplot => "boxplot",
            ChartType::Heatmap => "heatmap",
            ChartType::Pie => "pie",
            ChartType::Donut => "donut",
            ChartType::Combo => "combo",
        }
    }
    /// Unrecognised tags fall back to [`ChartType::Bar`].
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .unwrap_or(ChartType::Bar)
    }
    pub fn is_point(&self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }
    pub fn is_radial(&self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Donut)
    }
}
impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartCategory {
    Trend,
    Comparison,
    Distribution,
    Relationship,
    Composition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub min_numeric: usize,
    pub min_categorical: usize,
    pub requires_temporal: bool,
}
impl Requirements {
    pub fn is_satisfied_by(&self, numeric: usize, categorical: usize, has_temporal: bool) -> bool {
        numeric >= self.min_numeric
            && categorical >= self.min_categorical
            && (!self.requires_temporal || has_temporal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDescriptor {
    pub chart_type: ChartType,
    pub name: String,
    pub description: String,
    pub category: ChartCategory,
    pub requirements: Requirements,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    charts: Vec<ArchetypeDescriptor>,
}

#[derive(Debug, Clone, Default)]
pub struct ChartCatalog {
    charts: Vec<ArchetypeDescriptor>,
    index_by_type: HashMap<ChartType, usize>,
}
impl ChartCatalog {
    /// The embedded fourteen-archetype table, parsed on first use.
    pub fn builtin() -> &'static ChartCatalog {
        &DEFAULT_CATALOG
    }
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|source| CatalogError::TableFileError {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }
    pub fn from_yaml_str(yaml_content: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml_content)?;
        Self::from_descriptors(file.charts)
    }
    pub fn from_descriptors(charts: Vec<ArchetypeDescriptor>) -> CatalogResult<Self> {
        if charts.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        let mut index_by_type = HashMap::new();
        for (idx, chart) in charts.iter().enumerate() {
            if index_by_type.insert(chart.chart_type, idx).is_some() {
                return Err(CatalogError::DuplicateChartType {
                    name: chart.chart_type.to_string(),
                });
            }
        }
        debug!(archetypes = charts.len(), "chart catalog loaded");
        Ok(Self {
            charts,
            index_by_type,
        })
    }
    pub fn get(&self, chart_type: ChartType) -> Option<&ArchetypeDescriptor> {
        self.index_by_type
            .get(&chart_type)
            .and_then(|idx| self.charts.get(*idx))
    }
    pub fn by_category(&self, category: ChartCategory) -> Vec<&ArchetypeDescriptor> {
        self.charts
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }
    pub fn iter(&self) -> impl Iterator<Item = &ArchetypeDescriptor> {
        self.charts.iter()
    }
    pub fn len(&self) -> usize {
        self.charts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
