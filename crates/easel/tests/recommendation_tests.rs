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

use easel::compiler::VEGA_LITE_SCHEMA;
use easel::{
    ChartCatalog, ChartScorer, ChartType, Dataset, DatasetSummary, Row, SourceFormat,
    SpecCompiler, VisualisationEngine,
};
use proptest::prelude::*;
use serde_json::json;

const REGIONS: [&str; 3] = ["North", "South", "West"];

fn monthly_sales() -> Dataset {
    let rows: Vec<Row> = (1..=12usize)
        .map(|m| {
            let region = REGIONS[m % 3];
            json!({"Month": format!("2024-{m:02}"), "Region": region, "Sales": 100 + m * 10})
                .as_object()
                .unwrap()
                .clone()
        })
        .collect();
    VisualisationEngine::new().dataset_from_rows(rows, "sales.csv", SourceFormat::Csv)
}

fn shaped_rows(numeric: usize, categorical: usize, temporal: bool) -> Vec<Row> {
    (0..6usize)
        .map(|i| {
            let mut row = Row::new();
            if temporal {
                row.insert("when".to_string(), json!(format!("2024-01-0{}", i + 1)));
            }
            for j in 0..categorical {
                row.insert(format!("cat{j}"), json!(REGIONS[(i + j) % 3]));
            }
            for j in 0..numeric {
                row.insert(format!("num{j}"), json!((i * (j + 2)) as f64 + 0.5));
            }
            row
        })
        .collect()
}

fn catalog_position(chart_type: ChartType) -> usize {
    ChartCatalog::builtin()
        .iter()
        .position(|d| d.chart_type == chart_type)
        .unwrap()
}

#[test]
fn test_month_region_sales_ranks_line_then_bar() {
    let dataset = monthly_sales();
    let recommendations = VisualisationEngine::new().recommend(&dataset);

    assert!(recommendations.len() >= 2);
    assert_eq!(recommendations[0].chart_type, ChartType::Line);
    assert_eq!(recommendations[0].score, 90);
    assert_eq!(recommendations[1].chart_type, ChartType::Bar);
    assert_eq!(recommendations[1].score, 85);

    let excluded = [
        ChartType::Heatmap,
        ChartType::StackedBar,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Combo,
    ];
    for rec in &recommendations {
        assert!(
            !excluded.contains(&rec.chart_type),
            "{} should not pass its gate",
            rec.chart_type
        );
        assert!(rec.score > 0);
        assert_eq!(rec.spec["$schema"], json!(VEGA_LITE_SCHEMA));
        assert_eq!(rec.spec["data"]["values"].as_array().unwrap().len(), 12);
    }
}

#[test]
fn test_line_and_bar_bindings_and_titles() {
    let dataset = monthly_sales();
    let recommendations = VisualisationEngine::new().recommend(&dataset);
    let line = recommendations
        .iter()
        .find(|r| r.chart_type == ChartType::Line)
        .unwrap();
    let bar = recommendations
        .iter()
        .find(|r| r.chart_type == ChartType::Bar)
        .unwrap();

    assert_eq!(line.bindings.x.as_deref(), Some("Month"));
    assert_eq!(line.bindings.y.as_deref(), Some("Sales"));
    assert_eq!(line.bindings.color.as_deref(), Some("Region"));
    assert_eq!(line.title, "Sales over Month");
    assert_eq!(line.spec["encoding"]["x"]["type"], json!("temporal"));

    assert_eq!(bar.bindings.x.as_deref(), Some("Region"));
    assert_eq!(bar.title, "Sales by Region");
    assert_eq!(bar.spec["mark"]["type"], json!("bar"));
    assert_eq!(bar.spec["encoding"]["y"]["aggregate"], json!("sum"));
}

#[test]
fn test_ties_keep_catalog_order() {
    let recommendations = VisualisationEngine::new().recommend(&monthly_sales());
    let types: Vec<ChartType> = recommendations.iter().map(|r| r.chart_type).collect();
    let stacked_area = types.iter().position(|t| *t == ChartType::StackedArea).unwrap();
    let pie = types.iter().position(|t| *t == ChartType::Pie).unwrap();

    assert_eq!(recommendations[stacked_area].score, recommendations[pie].score);
    assert!(stacked_area < pie);
}

#[test]
fn test_numeric_only_dataset_offers_scatter_and_histogram() {
    let rows: Vec<Row> = (0..10)
        .map(|i| json!({"a": i, "b": i * 2}).as_object().unwrap().clone())
        .collect();
    let dataset = VisualisationEngine::new().dataset_from_rows(rows, "n.json", SourceFormat::Json);
    let recommendations = VisualisationEngine::new().recommend(&dataset);
    let types: Vec<ChartType> = recommendations.iter().map(|r| r.chart_type).collect();

    assert_eq!(types, vec![ChartType::Scatter, ChartType::Histogram]);
    assert_eq!(recommendations[0].score, 95);
    assert_eq!(recommendations[0].bindings.x.as_deref(), Some("b"));
    assert_eq!(recommendations[0].bindings.y.as_deref(), Some("a"));
    assert_eq!(recommendations[0].title, "a vs b");
    assert_eq!(recommendations[1].title, "Distribution of a");
    assert_eq!(recommendations[1].spec["encoding"]["x"]["bin"]["maxbins"], json!(20));
}

#[test]
fn test_third_measure_drives_bubble_size() {
    let rows: Vec<Row> = (0..8usize)
        .map(|i| {
            let region = REGIONS[i % 3];
            json!({"Region": region, "a": i, "b": i * 3, "c": 10 + i})
                .as_object()
                .unwrap()
                .clone()
        })
        .collect();
    let dataset = VisualisationEngine::new().dataset_from_rows(rows, "b.json", SourceFormat::Json);
    let recommendations = VisualisationEngine::new().recommend(&dataset);
    let bubble = recommendations
        .iter()
        .find(|r| r.chart_type == ChartType::Bubble)
        .unwrap();

    assert_eq!(bubble.bindings.size.as_deref(), Some("c"));
    assert_eq!(bubble.spec["encoding"]["size"]["field"], json!("c"));
    assert_eq!(bubble.spec["mark"]["type"], json!("circle"));
}

#[test]
fn test_pie_uses_category_as_colour_only() {
    let recommendations = VisualisationEngine::new().recommend(&monthly_sales());
    let pie = recommendations
        .iter()
        .find(|r| r.chart_type == ChartType::Pie)
        .unwrap();

    assert_eq!(pie.bindings.x.as_deref(), Some("Region"));
    assert_eq!(pie.bindings.color, None);
    assert_eq!(pie.title, "Composition of Sales by Region");
    assert_eq!(pie.spec["encoding"]["color"]["field"], json!("Region"));
    assert_eq!(pie.spec["encoding"]["theta"]["field"], json!("Sales"));
}

#[test]
fn test_combo_pairs_first_two_measures() {
    let rows: Vec<Row> = (0..6usize)
        .map(|i| {
            let region = REGIONS[i % 3];
            json!({"Region": region, "Sales": 100 + i, "Profit": 10 + i})
                .as_object()
                .unwrap()
                .clone()
        })
        .collect();
    let dataset = VisualisationEngine::new().dataset_from_rows(rows, "c.json", SourceFormat::Json);
    let recommendations = VisualisationEngine::new().recommend(&dataset);
    let combo = recommendations
        .iter()
        .find(|r| r.chart_type == ChartType::Combo)
        .unwrap();
    let layers = combo.spec["layer"].as_array().unwrap();

    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0]["encoding"]["y"]["field"], json!("Sales"));
    assert_eq!(layers[1]["encoding"]["y"]["field"], json!("Profit"));
}

#[test]
fn test_empty_dataset_yields_no_recommendations() {
    let dataset = VisualisationEngine::new().dataset_from_rows(Vec::new(), "e.csv", SourceFormat::Csv);

    assert!(VisualisationEngine::new().recommend(&dataset).is_empty());
}

proptest! {
    #[test]
    fn test_score_is_bounded_and_gated(
        numeric in 0usize..6,
        categorical in 0usize..6,
        temporal in any::<bool>(),
    ) {
        let summary = DatasetSummary {
            total_columns: numeric + categorical + usize::from(temporal),
            numeric_count: numeric,
            categorical_count: categorical,
            temporal_count: usize::from(temporal),
            ..Default::default()
        };
        let richer = DatasetSummary {
            numeric_count: numeric + 1,
            categorical_count: categorical + 1,
            ..summary.clone()
        };
        let compiler = SpecCompiler::new();
        let scorer = ChartScorer::new(ChartCatalog::builtin(), &compiler);
        for descriptor in ChartCatalog::builtin().iter() {
            let score = scorer.score(descriptor, &summary);
            prop_assert!(score <= 100);
            if descriptor.requirements.is_satisfied_by(numeric, categorical, temporal) {
                prop_assert!(score >= 50);
                prop_assert!(scorer.score(descriptor, &richer) > 0);
            } else {
                prop_assert_eq!(score, 0);
            }
        }
    }

    #[test]
    fn test_recommendations_are_sorted_and_eligible(
        numeric in 0usize..4,
        categorical in 0usize..3,
        temporal in any::<bool>(),
    ) {
        let engine = VisualisationEngine::new();
        let dataset = engine.dataset_from_rows(
            shaped_rows(numeric, categorical, temporal),
            "shape.json",
            SourceFormat::Json,
        );
        let summary = engine.summary(&dataset);
        prop_assert_eq!(summary.numeric_count, numeric);
        prop_assert_eq!(summary.categorical_count, categorical);

        let recommendations = engine.recommend(&dataset);
        let eligible = ChartCatalog::builtin()
            .iter()
            .filter(|d| d.requirements.is_satisfied_by(numeric, categorical, temporal))
            .count();
        prop_assert_eq!(recommendations.len(), eligible);
        for pair in recommendations.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(
                    catalog_position(pair[0].chart_type) < catalog_position(pair[1].chart_type)
                );
            }
        }
    }
}
