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

use crate::catalog::ChartType;
use crate::dataset::DatasetSchema;
use crate::intent::{Aggregation, ChartIntent, FilterPredicate, SortOrder, TimeGranularity};
use crate::recommend::FieldBindings;

/// Per-compilation options that sit beside the field bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileFlags {
    pub aggregate: Aggregation,
    pub secondary_measure: Option<String>,
    pub sort: Option<SortOrder>,
    pub time_unit: Option<TimeGranularity>,
    pub filters: Vec<FilterPredicate>,
}
impl CompileFlags {
    pub fn from_intent(intent: &ChartIntent, schema: &DatasetSchema) -> Self {
        let temporal_x = intent
            .x_field
            .as_deref()
            .and_then(|x| schema.column(x))
            .is_some_and(|c| c.column_type.is_temporal());
        Self {
            aggregate: intent.aggregation.unwrap_or_default(),
            secondary_measure: secondary_measure(schema, intent.y_field.as_deref()),
            sort: intent.sort,
            time_unit: intent.time_granularity.filter(|_| temporal_x),
            filters: intent.filters.clone(),
        }
    }
    pub fn with_secondary_measure(mut self, measure: Option<String>) -> Self {
        self.secondary_measure = measure;
        self
    }
}

/// First numeric column other than the primary measure.
pub fn secondary_measure(schema: &DatasetSchema, primary: Option<&str>) -> Option<String> {
    schema
        .numeric_columns()
        .find(|c| Some(c.name.as_str()) != primary)
        .map(|c| c.name.clone())
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPlan {
    pub category: String,
    pub measure: Option<String>,
    pub color: Option<String>,
    pub horizontal: bool,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlan {
    pub time: String,
    pub measure: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaPlan {
    pub series: SeriesPlan,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointPlan {
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DistributionPlan {
    Histogram {
        field: String,
    },
    Boxplot {
        group: String,
        measure: String,
    },
    Heatmap {
        x: String,
        y: Option<String>,
        value: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialPlan {
    pub category: String,
    pub measure: Option<String>,
    pub donut: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComboPlan {
    pub category: String,
    pub bar_measure: String,
    pub line_measure: String,
}

/// Chart families the compiler knows how to draw, each carrying the
/// bindings it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartPlan {
    Bar(BarPlan),
    Line(SeriesPlan),
    Area(AreaPlan),
    Point(PointPlan),
    Distribution(DistributionPlan),
    Radial(RadialPlan),
    Combo(ComboPlan),
}
impl ChartPlan {
    /// `None` when a binding the family cannot draw without is missing.
    pub fn from_bindings(
        chart_type: ChartType,
        bindings: &FieldBindings,
        flags: &CompileFlags,
    ) -> Option<Self> {
        let x = bindings.x.clone()?;
        let y = bindings.y.clone();
        let color = bindings.color.clone();
        let plan = match chart_type {
            ChartType::Bar | ChartType::HorizontalBar | ChartType::StackedBar => {
                ChartPlan::Bar(BarPlan {
                    category: x,
                    measure: y,
                    color,
                    horizontal: chart_type == ChartType::HorizontalBar,
                    stacked: chart_type == ChartType::StackedBar,
                })
            }
            ChartType::Line => ChartPlan::Line(SeriesPlan {
                time: x,
                measure: y,
                color,
            }),
            ChartType::Area | ChartType::StackedArea => ChartPlan::Area(AreaPlan {
                series: SeriesPlan {
                    time: x,
                    measure: y,
                    color,
                },
                stacked: chart_type == ChartType::StackedArea,
            }),
            ChartType::Scatter | ChartType::Bubble => ChartPlan::Point(PointPlan {
                x,
                y: y?,
                color,
                size: bindings.size.clone(),
            }),
            ChartType::Histogram => ChartPlan::Distribution(DistributionPlan::Histogram {
                field: y.unwrap_or(x),
            }),
            ChartType::Boxplot => ChartPlan::Distribution(DistributionPlan::Boxplot {
                group: x,
                measure: y?,
            }),
            ChartType::Heatmap => ChartPlan::Distribution(DistributionPlan::Heatmap {
                x,
                y: color,
                value: y,
            }),
            ChartType::Pie | ChartType::Donut => ChartPlan::Radial(RadialPlan {
                category: x,
                measure: y,
                donut: chart_type == ChartType::Donut,
            }),
            ChartType::Combo => {
                let bar_measure = y?;
                let line_measure = flags
                    .secondary_measure
                    .clone()
                    .filter(|m| *m != bar_measure)?;
                ChartPlan::Combo(ComboPlan {
                    category: x,
                    bar_measure,
                    line_measure,
                })
            }
        };
        Some(plan)
    }
    pub fn family(&self) -> &'static str {
        match self {
            ChartPlan::Bar(_) => "bar",
            ChartPlan::Line(_) => "line",
            ChartPlan::Area(_) => "area",
            ChartPlan::Point(_) => "point",
            ChartPlan::Distribution(_) => "distribution",
            ChartPlan::Radial(_) => "radial",
            ChartPlan::Combo(_) => "combo",
        }
    }
}
