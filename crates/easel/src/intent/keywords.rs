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

use super::parser::normalise_text;
use super::{Aggregation, SortOrder, TimeGranularity};
use crate::catalog::ChartType;
use crate::error::{CatalogError, CatalogResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;
use tracing::{debug, error};

const BUILTIN_KEYWORDS: &str = include_str!("../../config/intent_keywords.yml");

static DEFAULT_KEYWORDS: Lazy<KeywordTables> = Lazy::new(|| {
    KeywordTables::from_yaml_str(BUILTIN_KEYWORDS).unwrap_or_else(|err| {
        error!(error = %err, "built-in keyword tables failed to load");
        KeywordTables::default()
    })
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledKeywords<T> {
    pub label: T,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TemporalKeywords {
    chart_type: ChartType,
    keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FilterKeywords {
    #[serde(default)]
    connectors: Vec<String>,
    #[serde(default)]
    postfix: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    #[serde(default = "default_chart_type")]
    default_chart_type: ChartType,
    chart_types: Vec<LabelledKeywords<ChartType>>,
    temporal: TemporalKeywords,
    #[serde(default)]
    aggregations: Vec<LabelledKeywords<Aggregation>>,
    #[serde(default)]
    sort: Vec<LabelledKeywords<SortOrder>>,
    #[serde(default)]
    granularity: Vec<LabelledKeywords<TimeGranularity>>,
    #[serde(default)]
    filters: FilterKeywords,
}

fn default_chart_type() -> ChartType {
    ChartType::Bar
}

/// Keyword lists flattened to `(normalised keyword, label)` pairs, each list
/// ordered longest keyword first. Equal lengths keep declaration order.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    default_chart_type: ChartType,
    chart_types: Vec<(String, ChartType)>,
    temporal_chart_type: ChartType,
    temporal: Vec<String>,
    aggregations: Vec<(String, Aggregation)>,
    sort: Vec<(String, SortOrder)>,
    granularity: Vec<(String, TimeGranularity)>,
    filter_connectors: Vec<String>,
    filter_postfix: Vec<String>,
}
impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            default_chart_type: ChartType::Bar,
            chart_types: Vec::new(),
            temporal_chart_type: ChartType::Line,
            temporal: Vec::new(),
            aggregations: Vec::new(),
            sort: Vec::new(),
            granularity: Vec::new(),
            filter_connectors: Vec::new(),
            filter_postfix: Vec::new(),
        }
    }
}
impl KeywordTables {
    pub fn builtin() -> &'static KeywordTables {
        &DEFAULT_KEYWORDS
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
        let file: KeywordFile = serde_yaml::from_str(yaml_content)?;
        if file.chart_types.iter().all(|entry| entry.keywords.is_empty()) {
            return Err(CatalogError::EmptyKeywordTable {
                table: "chart_types".to_string(),
            });
        }
        let tables = Self {
            default_chart_type: file.default_chart_type,
            chart_types: flatten_longest_first(&file.chart_types),
            temporal_chart_type: file.temporal.chart_type,
            temporal: longest_first(file.temporal.keywords.iter().map(|k| normalise_text(k))),
            aggregations: flatten_longest_first(&file.aggregations),
            sort: flatten_longest_first(&file.sort),
            granularity: flatten_longest_first(&file.granularity),
            filter_connectors: file.filters.connectors.iter().map(|k| normalise_text(k)).collect(),
            filter_postfix: file.filters.postfix.iter().map(|k| normalise_text(k)).collect(),
        };
        debug!(
            chart_keywords = tables.chart_types.len(),
            aggregation_keywords = tables.aggregations.len(),
            "keyword tables loaded"
        );
        Ok(tables)
    }
    pub fn default_chart_type(&self) -> ChartType {
        self.default_chart_type
    }
    pub fn chart_keywords(&self) -> &[(String, ChartType)] {
        &self.chart_types
    }
    pub fn temporal_chart_type(&self) -> ChartType {
        self.temporal_chart_type
    }
    pub fn temporal_keywords(&self) -> &[String] {
        &self.temporal
    }
    pub fn aggregation_keywords(&self) -> &[(String, Aggregation)] {
        &self.aggregations
    }
    pub fn sort_keywords(&self) -> &[(String, SortOrder)] {
        &self.sort
    }
    pub fn granularity_keywords(&self) -> &[(String, TimeGranularity)] {
        &self.granularity
    }
    pub fn filter_connectors(&self) -> &[String] {
        &self.filter_connectors
    }
    pub fn filter_postfix(&self) -> &[String] {
        &self.filter_postfix
    }
}

fn flatten_longest_first<T: Copy>(entries: &[LabelledKeywords<T>]) -> Vec<(String, T)> {
    let mut flat: Vec<(String, T)> = entries
        .iter()
        .flat_map(|entry| {
            entry
                .keywords
                .iter()
                .map(move |k| (normalise_text(k), entry.label))
        })
        .filter(|(k, _)| !k.is_empty())
        .collect();
    flat.sort_by_key(|(k, _)| Reverse(k.chars().count()));
    flat
}

fn longest_first(keywords: impl Iterator<Item = String>) -> Vec<String> {
    let mut list: Vec<String> = keywords.filter(|k| !k.is_empty()).collect();
    list.sort_by_key(|k| Reverse(k.chars().count()));
    list
}
