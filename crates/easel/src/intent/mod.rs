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

mod keywords;
mod parser;

pub use keywords::{KeywordTables, LabelledKeywords};
pub use parser::{normalise_text, IntentParser};

use crate::catalog::ChartType;
use crate::recommend::ChartRecommendation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}
impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}
impl TimeGranularity {
    pub fn time_unit(&self) -> &'static str {
        match self {
            TimeGranularity::Daily => "yearmonthdate",
            TimeGranularity::Weekly => "yearweek",
            TimeGranularity::Monthly => "yearmonth",
            TimeGranularity::Quarterly => "yearquarter",
            TimeGranularity::Yearly => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub field: String,
    pub value: Value,
}

/// Structured reading of a chart request. Unset fields mean "use defaults".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartIntent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterPredicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_granularity: Option<TimeGranularity>,
}
impl ChartIntent {
    pub fn from_recommendation(recommendation: &ChartRecommendation) -> Self {
        let bindings = &recommendation.bindings;
        Self {
            chart_type: Some(recommendation.chart_type),
            x_field: bindings.x.clone(),
            y_field: bindings.y.clone(),
            color_field: bindings.color.clone(),
            size_field: bindings.size.clone(),
            ..Default::default()
        }
    }
    pub fn is_resolvable(&self) -> bool {
        self.chart_type.is_some() && self.x_field.is_some()
    }
}
