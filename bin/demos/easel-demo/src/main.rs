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

mod args;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use easel::{to_pretty_json, DatasetSummary, InsightValue, Session, VisualisationEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
    let engine = match &args.config {
        Some(path) => VisualisationEngine::from_config_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => VisualisationEngine::new(),
    };
    let mut session = Session::new(engine);
    if let Err(err) = session.load_path(&args.file) {
        eprintln!("{}", err.user_message());
        for hint in err.suggestions() {
            eprintln!("  - {hint}");
        }
        return Err(err).with_context(|| format!("loading {}", args.file.display()));
    }
    let Some(dataset) = session.active() else {
        anyhow::bail!("no dataset is active");
    };
    info!(file = %args.file.display(), "analysing dataset");
    println!("\n=== Schema ===");
    println!("{}", DatasetSummary::from_schema(&dataset.schema));
    for column in &dataset.schema.columns {
        println!(
            "  {:<24} {:<9} unique={:<5} nulls={:.0}%",
            column.name,
            column.column_type,
            column.unique_count,
            column.null_ratio * 100.0
        );
    }
    println!("\n=== Recommendations ===");
    let recommendations = session.recommendations();
    if recommendations.is_empty() {
        println!("No chart type fits this dataset.");
    }
    for rec in recommendations.iter().take(args.top) {
        println!("  [{:>3}] {:<15} {}", rec.score, rec.chart_type, rec.title);
        if args.json {
            println!("{}", to_pretty_json(&rec.spec)?);
        }
    }
    if let Some(prompt) = &args.prompt {
        println!("\n=== Request: {prompt} ===");
        let intent = session.engine().parse_intent(prompt, &dataset.schema);
        println!("{}", serde_json::to_string(&intent)?);
        match session.generate(prompt) {
            Some(spec) if args.json => println!("{}", to_pretty_json(&spec)?),
            Some(_) => println!("Chart spec compiled (use --json to print it)."),
            None => println!("Could not determine a chart for this request."),
        }
    }
    println!("\n=== Insights ===");
    for insight in session.insights(args.x_field.as_deref(), args.y_field.as_deref()) {
        let value = match &insight.value {
            Some(InsightValue::Number(n)) => format!(" [{n}]"),
            Some(InsightValue::Text(t)) => format!(" [{t}]"),
            None => String::new(),
        };
        println!("  {}: {}{value}", insight.title, insight.description);
    }
    Ok(())
}
