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

use easel::compiler::{DEFAULT_PALETTE, VEGA_LITE_SCHEMA};
use easel::intent::{FilterPredicate, SortOrder, TimeGranularity};
use easel::{
    to_pretty_json, Aggregation, ChartIntent, ChartType, CompileFlags, CompilerConfig, Dataset,
    FieldBindings, Row, SourceFormat, SpecCompiler, VisualisationEngine,
};
use serde_json::{json, Value};

fn sample() -> Dataset {
    let rows: Vec<Row> = [
        ("2024-01-01", "North", "Retail", 120, 12),
        ("2024-02-01", "South", "Online", 80, 9),
        ("2024-03-01", "North", "Online", 150, 20),
        ("2024-04-01", "West", "Retail", 60, 4),
    ]
    .iter()
    .map(|(date, region, channel, sales, profit)| {
        json!({"Date": date, "Region": region, "Channel": channel, "Sales": sales, "Profit": profit})
            .as_object()
            .unwrap()
            .clone()
    })
    .collect();
    VisualisationEngine::new().dataset_from_rows(rows, "sample.json", SourceFormat::Json)
}

fn bind(x: Option<&str>, y: Option<&str>, color: Option<&str>, size: Option<&str>) -> FieldBindings {
    FieldBindings {
        x: x.map(String::from),
        y: y.map(String::from),
        color: color.map(String::from),
        size: size.map(String::from),
    }
}

fn compile(chart_type: ChartType, bindings: &FieldBindings, flags: &CompileFlags) -> Option<Value> {
    SpecCompiler::new().compile(&sample().rows, chart_type, bindings, flags)
}

#[test]
fn test_bar_document_layout() {
    let dataset = sample();
    let spec = SpecCompiler::new()
        .compile(
            &dataset.rows,
            ChartType::Bar,
            &bind(Some("Region"), Some("Sales"), None, None),
            &CompileFlags::default(),
        )
        .unwrap();
    let keys: Vec<&str> = spec.as_object().unwrap().keys().map(|k| k.as_str()).collect();

    assert_eq!(
        keys,
        vec!["$schema", "data", "mark", "encoding", "width", "height", "background", "config"]
    );
    assert_eq!(spec["$schema"], json!(VEGA_LITE_SCHEMA));
    assert_eq!(spec["data"]["values"], json!(dataset.rows));
    assert_eq!(spec["mark"]["type"], json!("bar"));
    assert_eq!(spec["encoding"]["x"], json!({"field": "Region", "type": "nominal"}));
    assert_eq!(
        spec["encoding"]["y"],
        json!({"field": "Sales", "aggregate": "sum", "type": "quantitative"})
    );
    assert_eq!(spec["width"], json!("container"));
    assert_eq!(spec["height"], json!(300));
    assert_eq!(spec["background"], json!("transparent"));
    assert_eq!(spec["config"]["range"]["category"], json!(DEFAULT_PALETTE));
}

#[test]
fn test_horizontal_bar_swaps_axes_and_sort_channel() {
    let flags = CompileFlags {
        sort: Some(SortOrder::Descending),
        ..Default::default()
    };
    let spec = compile(
        ChartType::HorizontalBar,
        &bind(Some("Region"), Some("Sales"), None, None),
        &flags,
    )
    .unwrap();

    assert_eq!(spec["encoding"]["x"]["type"], json!("quantitative"));
    assert_eq!(spec["encoding"]["y"]["field"], json!("Region"));
    assert_eq!(spec["encoding"]["y"]["sort"], json!("-x"));
}

#[test]
fn test_vertical_bar_sorts_by_measure() {
    let ascending = CompileFlags {
        sort: Some(SortOrder::Ascending),
        ..Default::default()
    };
    let descending = CompileFlags {
        sort: Some(SortOrder::Descending),
        ..Default::default()
    };
    let bindings = bind(Some("Region"), Some("Sales"), None, None);

    let spec = compile(ChartType::Bar, &bindings, &ascending).unwrap();
    assert_eq!(spec["encoding"]["x"]["sort"], json!("y"));
    let spec = compile(ChartType::Bar, &bindings, &descending).unwrap();
    assert_eq!(spec["encoding"]["x"]["sort"], json!("-y"));
}

#[test]
fn test_stacking_normalises_only_with_colour() {
    let flags = CompileFlags::default();
    let with_color = compile(
        ChartType::StackedBar,
        &bind(Some("Region"), Some("Sales"), Some("Channel"), None),
        &flags,
    )
    .unwrap();
    let without_color = compile(
        ChartType::StackedBar,
        &bind(Some("Region"), Some("Sales"), None, None),
        &flags,
    )
    .unwrap();

    assert_eq!(with_color["encoding"]["y"]["stack"], json!("normalize"));
    assert_eq!(with_color["encoding"]["color"]["field"], json!("Channel"));
    assert!(without_color["encoding"]["y"].get("stack").is_none());
    assert!(without_color["encoding"].get("color").is_none());

    let area = compile(
        ChartType::StackedArea,
        &bind(Some("Date"), Some("Sales"), Some("Region"), None),
        &flags,
    )
    .unwrap();
    let plain_area = compile(
        ChartType::Area,
        &bind(Some("Date"), Some("Sales"), Some("Region"), None),
        &flags,
    )
    .unwrap();
    assert_eq!(area["mark"]["type"], json!("area"));
    assert_eq!(area["encoding"]["y"]["stack"], json!("normalize"));
    assert!(plain_area["encoding"]["y"].get("stack").is_none());
}

#[test]
fn test_line_time_unit_and_count_aggregate() {
    let flags = CompileFlags {
        aggregate: Aggregation::Count,
        time_unit: Some(TimeGranularity::Monthly),
        ..Default::default()
    };
    let spec = compile(
        ChartType::Line,
        &bind(Some("Date"), Some("Sales"), None, None),
        &flags,
    )
    .unwrap();

    assert_eq!(spec["mark"]["type"], json!("line"));
    assert_eq!(spec["mark"]["point"], json!(true));
    assert_eq!(spec["encoding"]["x"]["type"], json!("temporal"));
    assert_eq!(spec["encoding"]["x"]["timeUnit"], json!("yearmonth"));
    assert_eq!(
        spec["encoding"]["y"],
        json!({"aggregate": "count", "type": "quantitative"})
    );
}

#[test]
fn test_point_charts_need_both_axes() {
    let flags = CompileFlags::default();
    let scatter = compile(
        ChartType::Scatter,
        &bind(Some("Profit"), Some("Sales"), Some("Region"), None),
        &flags,
    )
    .unwrap();

    assert_eq!(scatter["mark"]["type"], json!("circle"));
    assert_eq!(scatter["encoding"]["x"]["field"], json!("Profit"));
    assert_eq!(scatter["encoding"]["y"]["type"], json!("quantitative"));
    assert!(scatter["encoding"].get("size").is_none());
    assert!(compile(ChartType::Scatter, &bind(Some("Profit"), None, None, None), &flags).is_none());
}

#[test]
fn test_distribution_family() {
    let flags = CompileFlags::default();
    let histogram = compile(
        ChartType::Histogram,
        &bind(Some("Region"), Some("Sales"), None, None),
        &flags,
    )
    .unwrap();
    let boxplot = compile(
        ChartType::Boxplot,
        &bind(Some("Region"), Some("Sales"), None, None),
        &flags,
    )
    .unwrap();
    let heatmap = compile(
        ChartType::Heatmap,
        &bind(Some("Region"), Some("Sales"), Some("Channel"), None),
        &flags,
    )
    .unwrap();

    assert_eq!(histogram["encoding"]["x"]["field"], json!("Sales"));
    assert_eq!(histogram["encoding"]["x"]["bin"]["maxbins"], json!(20));
    assert_eq!(histogram["encoding"]["y"]["aggregate"], json!("count"));

    assert_eq!(boxplot["mark"]["type"], json!("boxplot"));
    assert_eq!(boxplot["mark"]["extent"], json!(1.5));
    assert_eq!(boxplot["encoding"]["color"]["legend"], Value::Null);

    assert_eq!(heatmap["mark"]["type"], json!("rect"));
    assert_eq!(heatmap["encoding"]["y"]["field"], json!("Channel"));
    assert_eq!(heatmap["encoding"]["color"]["aggregate"], json!("mean"));
    assert_eq!(heatmap["encoding"]["color"]["scale"]["scheme"], json!("viridis"));
}

#[test]
fn test_pie_and_donut_differ_only_in_inner_radius() {
    let flags = CompileFlags::default();
    let bindings = bind(Some("Region"), Some("Sales"), None, None);
    let pie = compile(ChartType::Pie, &bindings, &flags).unwrap();
    let donut = compile(ChartType::Donut, &bindings, &flags).unwrap();

    assert_eq!(pie["mark"]["type"], json!("arc"));
    assert_eq!(pie["mark"]["innerRadius"], json!(0));
    assert_eq!(donut["mark"]["innerRadius"], json!(60));
    assert_eq!(pie["encoding"], donut["encoding"]);
    assert_eq!(pie["encoding"]["theta"]["aggregate"], json!("sum"));
}

#[test]
fn test_combo_layers_two_measures_on_independent_scales() {
    let bindings = bind(Some("Region"), Some("Sales"), None, None);
    let flags = CompileFlags::default().with_secondary_measure(Some("Profit".to_string()));
    let spec = compile(ChartType::Combo, &bindings, &flags).unwrap();
    let layers = spec["layer"].as_array().unwrap();

    assert_eq!(spec["encoding"]["x"]["field"], json!("Region"));
    assert_eq!(layers[0]["mark"]["type"], json!("bar"));
    assert_eq!(layers[0]["mark"]["color"], json!(DEFAULT_PALETTE[0]));
    assert_eq!(layers[1]["mark"]["type"], json!("line"));
    assert_eq!(layers[1]["mark"]["color"], json!(DEFAULT_PALETTE[1]));
    assert_eq!(layers[1]["encoding"]["y"]["field"], json!("Profit"));
    assert_eq!(spec["resolve"]["scale"]["y"], json!("independent"));

    let same_measure = CompileFlags::default().with_secondary_measure(Some("Sales".to_string()));
    assert!(compile(ChartType::Combo, &bindings, &same_measure).is_none());
    assert!(compile(ChartType::Combo, &bindings, &CompileFlags::default()).is_none());
}

#[test]
fn test_every_family_requires_x() {
    let bindings = bind(None, Some("Sales"), Some("Region"), Some("Profit"));
    let flags = CompileFlags::default().with_secondary_measure(Some("Profit".to_string()));
    for chart_type in ChartType::ALL {
        assert!(
            compile(chart_type, &bindings, &flags).is_none(),
            "{chart_type} compiled without x"
        );
    }
}

#[test]
fn test_filters_become_equality_transforms() {
    let flags = CompileFlags {
        filters: vec![
            FilterPredicate {
                field: "Region".to_string(),
                value: json!("North"),
            },
            FilterPredicate {
                field: "Profit".to_string(),
                value: json!(12),
            },
        ],
        ..Default::default()
    };
    let spec = compile(
        ChartType::Bar,
        &bind(Some("Region"), Some("Sales"), None, None),
        &flags,
    )
    .unwrap();

    assert_eq!(
        spec["transform"],
        json!([
            {"filter": {"field": "Region", "equal": "North"}},
            {"filter": {"field": "Profit", "equal": 12}},
        ])
    );
}

#[test]
fn test_compile_intent_needs_chart_type_and_x() {
    let dataset = sample();
    let compiler = SpecCompiler::new();
    let no_type = ChartIntent {
        x_field: Some("Region".to_string()),
        ..Default::default()
    };
    let no_x = ChartIntent {
        chart_type: Some(ChartType::Bar),
        y_field: Some("Sales".to_string()),
        ..Default::default()
    };

    assert!(compiler.compile_intent(&dataset.rows, &dataset.schema, &no_type).is_none());
    assert!(compiler.compile_intent(&dataset.rows, &dataset.schema, &no_x).is_none());
    assert!(!no_x.is_resolvable());
}

#[test]
fn test_time_unit_applies_only_to_temporal_x() {
    let dataset = sample();
    let compiler = SpecCompiler::new();
    let temporal = ChartIntent {
        chart_type: Some(ChartType::Bar),
        x_field: Some("Date".to_string()),
        y_field: Some("Sales".to_string()),
        time_granularity: Some(TimeGranularity::Quarterly),
        ..Default::default()
    };
    let categorical = ChartIntent {
        x_field: Some("Region".to_string()),
        ..temporal.clone()
    };

    let spec = compiler
        .compile_intent(&dataset.rows, &dataset.schema, &temporal)
        .unwrap();
    assert_eq!(spec["encoding"]["x"]["timeUnit"], json!("yearquarter"));
    assert_eq!(spec["encoding"]["x"]["type"], json!("ordinal"));

    let spec = compiler
        .compile_intent(&dataset.rows, &dataset.schema, &categorical)
        .unwrap();
    assert!(spec["encoding"]["x"].get("timeUnit").is_none());
}

#[test]
fn test_config_presets_reach_the_document() {
    let dataset = sample();
    let bindings = bind(Some("Region"), Some("Sales"), None, None);
    let export = SpecCompiler::with_config(CompilerConfig::for_export(800, 400));
    let light = SpecCompiler::with_config(CompilerConfig::for_light_theme());
    let dark = SpecCompiler::new();

    let spec = export
        .compile(&dataset.rows, ChartType::Bar, &bindings, &CompileFlags::default())
        .unwrap();
    assert_eq!(spec["width"], json!(800));
    assert_eq!(spec["height"], json!(400));

    let light_spec = light
        .compile(&dataset.rows, ChartType::Bar, &bindings, &CompileFlags::default())
        .unwrap();
    let dark_spec = dark
        .compile(&dataset.rows, ChartType::Bar, &bindings, &CompileFlags::default())
        .unwrap();
    assert_ne!(
        light_spec["config"]["axis"]["labelColor"],
        dark_spec["config"]["axis"]["labelColor"]
    );
    assert_eq!(light_spec["config"]["background"], json!("transparent"));
}

#[test]
fn test_pretty_json_round_trips() {
    let spec = compile(
        ChartType::Line,
        &bind(Some("Date"), Some("Sales"), None, None),
        &CompileFlags::default(),
    )
    .unwrap();
    let text = to_pretty_json(&spec).unwrap();

    assert!(text.starts_with("{\n  \"$schema\""));
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, spec);
}
