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

use super::plan::{
    AreaPlan, BarPlan, ChartPlan, ComboPlan, CompileFlags, DistributionPlan, PointPlan,
    RadialPlan, SeriesPlan,
};
use super::CompilerConfig;
use crate::intent::{Aggregation, SortOrder};
use serde_json::{json, Map, Value};

/// Mark, encoding and any layer/resolve keys for one plan.
pub(crate) fn render(
    plan: &ChartPlan,
    flags: &CompileFlags,
    config: &CompilerConfig,
) -> Map<String, Value> {
    let body = match plan {
        ChartPlan::Bar(bar) => bar_body(bar, flags),
        ChartPlan::Line(series) => line_body(series, flags),
        ChartPlan::Area(area) => area_body(area, flags),
        ChartPlan::Point(point) => point_body(point),
        ChartPlan::Distribution(dist) => distribution_body(dist, config),
        ChartPlan::Radial(radial) => radial_body(radial, flags, config),
        ChartPlan::Combo(combo) => combo_body(combo, flags, config),
    };
    match body {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn nominal(field: &str) -> Value {
    json!({"field": field, "type": "nominal"})
}

fn quantitative(field: &str) -> Value {
    json!({"field": field, "type": "quantitative"})
}

fn temporal(field: &str, flags: &CompileFlags) -> Value {
    let mut channel = json!({"field": field, "type": "temporal"});
    if let Some(unit) = flags.time_unit {
        channel["timeUnit"] = json!(unit.time_unit());
    }
    channel
}

fn measure(field: Option<&str>, aggregate: Aggregation) -> Value {
    match field {
        Some(field) if aggregate != Aggregation::Count => {
            json!({"field": field, "aggregate": aggregate.as_str(), "type": "quantitative"})
        }
        _ => json!({"aggregate": "count", "type": "quantitative"}),
    }
}

fn with_color(mut encoding: Value, color: Option<&str>) -> Value {
    if let Some(color) = color {
        encoding["color"] = nominal(color);
    }
    encoding
}

fn bar_body(plan: &BarPlan, flags: &CompileFlags) -> Value {
    let mut category = match flags.time_unit {
        Some(unit) => {
            json!({"field": plan.category, "timeUnit": unit.time_unit(), "type": "ordinal"})
        }
        None => nominal(&plan.category),
    };
    let mut value = measure(plan.measure.as_deref(), flags.aggregate);
    if plan.stacked && plan.color.is_some() {
        value["stack"] = json!("normalize");
    }
    let measure_axis = if plan.horizontal { "x" } else { "y" };
    if let Some(order) = flags.sort {
        category["sort"] = match order {
            SortOrder::Descending => json!(format!("-{measure_axis}")),
            SortOrder::Ascending => json!(measure_axis),
        };
    }
    let encoding = if plan.horizontal {
        json!({"x": value, "y": category})
    } else {
        json!({"x": category, "y": value})
    };
    json!({
        "mark": {"type": "bar", "tooltip": true},
        "encoding": with_color(encoding, plan.color.as_deref()),
    })
}

fn series_encoding(plan: &SeriesPlan, flags: &CompileFlags) -> Value {
    let encoding = json!({
        "x": temporal(&plan.time, flags),
        "y": measure(plan.measure.as_deref(), flags.aggregate),
    });
    with_color(encoding, plan.color.as_deref())
}

fn line_body(plan: &SeriesPlan, flags: &CompileFlags) -> Value {
    json!({
        "mark": {"type": "line", "point": true, "tooltip": true},
        "encoding": series_encoding(plan, flags),
    })
}

fn area_body(plan: &AreaPlan, flags: &CompileFlags) -> Value {
    let mut encoding = series_encoding(&plan.series, flags);
    if plan.stacked && plan.series.color.is_some() {
        encoding["y"]["stack"] = json!("normalize");
    }
    json!({
        "mark": {"type": "area", "line": true, "tooltip": true},
        "encoding": encoding,
    })
}

fn point_body(plan: &PointPlan) -> Value {
    let mut encoding = with_color(
        json!({"x": quantitative(&plan.x), "y": quantitative(&plan.y)}),
        plan.color.as_deref(),
    );
    if let Some(size) = &plan.size {
        encoding["size"] = quantitative(size);
    }
    json!({
        "mark": {"type": "circle", "opacity": 0.8, "tooltip": true},
        "encoding": encoding,
    })
}

fn distribution_body(plan: &DistributionPlan, config: &CompilerConfig) -> Value {
    match plan {
        DistributionPlan::Histogram { field } => json!({
            "mark": {"type": "bar", "tooltip": true},
            "encoding": {
                "x": {"field": field, "bin": {"maxbins": config.histogram_max_bins}, "type": "quantitative"},
                "y": {"aggregate": "count", "type": "quantitative"},
            },
        }),
        DistributionPlan::Boxplot { group, measure } => json!({
            "mark": {"type": "boxplot", "extent": config.boxplot_extent},
            "encoding": {
                "x": nominal(group),
                "y": quantitative(measure),
                "color": {"field": group, "type": "nominal", "legend": null},
            },
        }),
        DistributionPlan::Heatmap { x, y, value } => {
            let mut color = match value {
                Some(value) => json!({"field": value, "aggregate": "mean", "type": "quantitative"}),
                None => json!({"aggregate": "count", "type": "quantitative"}),
            };
            color["scale"] = json!({"scheme": config.heatmap_scheme});
            let mut encoding = json!({"x": nominal(x), "color": color});
            if let Some(y) = y {
                encoding["y"] = nominal(y);
            }
            json!({
                "mark": {"type": "rect", "tooltip": true},
                "encoding": encoding,
            })
        }
    }
}

fn radial_body(plan: &RadialPlan, flags: &CompileFlags, config: &CompilerConfig) -> Value {
    let inner_radius = if plan.donut {
        config.donut_inner_radius
    } else {
        0
    };
    json!({
        "mark": {"type": "arc", "innerRadius": inner_radius, "tooltip": true},
        "encoding": {
            "theta": measure(plan.measure.as_deref(), flags.aggregate),
            "color": nominal(&plan.category),
        },
    })
}

fn combo_body(plan: &ComboPlan, flags: &CompileFlags, config: &CompilerConfig) -> Value {
    let bar_color = config.palette.first().cloned().unwrap_or_default();
    let line_color = config.palette.get(1).cloned().unwrap_or_default();
    json!({
        "encoding": {"x": nominal(&plan.category)},
        "layer": [
            {
                "mark": {"type": "bar", "color": bar_color, "tooltip": true},
                "encoding": {"y": measure(Some(&plan.bar_measure), flags.aggregate)},
            },
            {
                "mark": {"type": "line", "color": line_color, "point": true, "tooltip": true},
                "encoding": {"y": measure(Some(&plan.line_measure), flags.aggregate)},
            },
        ],
        "resolve": {"scale": {"y": "independent"}},
    })
}
