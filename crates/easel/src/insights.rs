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

use crate::dataset::{coerce_number, is_missing, value_key, ColumnSchema, Dataset};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Max,
    Min,
    Trend,
    Outlier,
    Comparison,
    Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsightValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<InsightValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}
impl Trend {
    pub fn classify(slope: f64, mean: f64, factor: f64) -> Self {
        if slope > factor * mean {
            Trend::Increasing
        } else if slope < -factor * mean {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}
impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub trend_factor: f64,
    pub outlier_sigma: f64,
    pub iqr_fence: f64,
    pub variability_threshold: f64,
}
impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            trend_factor: 0.1,
            outlier_sigma: 2.0,
            iqr_fence: 1.5,
            variability_threshold: 0.5,
        }
    }
}
impl InsightConfig {
    pub fn for_strict_outliers() -> Self {
        Self {
            outlier_sigma: 3.0,
            iqr_fence: 3.0,
            ..Default::default()
        }
    }
}

/// Descriptive statistics over a measure, in row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
    pub slope: f64,
}
impl MeasureStatistics {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let sorted: Vec<f64> = values
            .iter()
            .copied()
            .sorted_by(|a, b| a.total_cmp(b))
            .collect();
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            count: values.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median: quantile(&sorted, 0.5),
            std_dev: variance.sqrt(),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
            slope: index_slope(values),
        })
    }
    /// Standard deviation over the signed mean, so a negative mean never reads
    /// as high variability. Zero at a zero mean.
    pub fn spread_ratio(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }
    /// Beyond `sigma` standard deviations or outside the interquartile fences.
    pub fn is_outlier(&self, value: f64, config: &InsightConfig) -> bool {
        let beyond_sigma =
            self.std_dev > 0.0 && (value - self.mean).abs() > config.outlier_sigma * self.std_dev;
        let iqr = self.q3 - self.q1;
        let beyond_fence = value < self.q1 - config.iqr_fence * iqr
            || value > self.q3 + config.iqr_fence * iqr;
        beyond_sigma || beyond_fence
    }
}

// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

// Least-squares slope against the record index.
fn index_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let (covariance, spread) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(cov, var), (i, y)| {
            let dx = i as f64 - mean_x;
            (cov + dx * (y - mean_y), var + dx * dx)
        });
    if spread == 0.0 {
        0.0
    } else {
        covariance / spread
    }
}

/// `1.2M`, `3.4K`, unscaled integers, otherwise two decimals.
pub fn format_magnitude(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    config: InsightConfig,
}
impl InsightGenerator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: InsightConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &InsightConfig {
        &self.config
    }
    /// The named y field when it is numeric, else the first numeric column.
    pub fn target_column<'d>(
        &self,
        dataset: &'d Dataset,
        y_field: Option<&str>,
    ) -> Option<&'d ColumnSchema> {
        y_field
            .and_then(|y| dataset.schema.column(y))
            .filter(|c| c.column_type.is_numeric())
            .or_else(|| dataset.schema.first_numeric())
    }
    pub fn statistics(&self, dataset: &Dataset, target: &str) -> Option<MeasureStatistics> {
        let values: Vec<f64> = dataset
            .rows
            .iter()
            .filter_map(|row| row.get(target))
            .filter_map(coerce_number)
            .collect();
        MeasureStatistics::from_values(&values)
    }
    pub fn generate(
        &self,
        dataset: &Dataset,
        x_field: Option<&str>,
        y_field: Option<&str>,
    ) -> Vec<Insight> {
        if dataset.rows.is_empty() {
            return Vec::new();
        }
        let Some(target) = self.target_column(dataset, y_field) else {
            debug!("no numeric column, no insights");
            return Vec::new();
        };
        let name = target.name.as_str();
        let Some(stats) = self.statistics(dataset, name) else {
            return Vec::new();
        };
        let mut insights = vec![
            Insight {
                kind: InsightKind::Max,
                title: format!("Highest {name}"),
                description: format!("The highest {name} is {}.", format_magnitude(stats.max)),
                value: Some(InsightValue::Number(stats.max)),
            },
            Insight {
                kind: InsightKind::Min,
                title: format!("Lowest {name}"),
                description: format!("The lowest {name} is {}.", format_magnitude(stats.min)),
                value: Some(InsightValue::Number(stats.min)),
            },
        ];
        if let Some(x) = x_field {
            let trend = Trend::classify(stats.slope, stats.mean, self.config.trend_factor);
            insights.push(Insight {
                kind: InsightKind::Trend,
                title: format!("{name} trend is {trend}"),
                description: format!(
                    "Across {} records ordered by {x}, {name} is {trend}.",
                    stats.count
                ),
                value: Some(InsightValue::Text(trend.to_string())),
            });
        }
        let outliers = dataset
            .rows
            .iter()
            .filter_map(|row| row.get(name))
            .filter_map(coerce_number)
            .filter(|v| stats.is_outlier(*v, &self.config))
            .count();
        if outliers > 0 {
            let noun = if outliers == 1 { "outlier" } else { "outliers" };
            insights.push(Insight {
                kind: InsightKind::Outlier,
                title: format!("{outliers} {noun} in {name}"),
                description: format!(
                    "{outliers} {name} {} far from the typical range around {}.",
                    if outliers == 1 { "value sits" } else { "values sit" },
                    format_magnitude(stats.mean)
                ),
                value: Some(InsightValue::Number(outliers as f64)),
            });
        }
        let ratio = stats.spread_ratio();
        let level = if ratio > self.config.variability_threshold {
            "High"
        } else {
            "Low"
        };
        insights.push(Insight {
            kind: InsightKind::Distribution,
            title: format!("{level} variability"),
            description: format!(
                "{name} has a spread ratio of {ratio:.2} (standard deviation over mean)."
            ),
            value: Some(InsightValue::Number(ratio)),
        });
        if let Some(top) = x_field
            .and_then(|x| dataset.schema.column(x))
            .filter(|c| c.is_categorical())
            .and_then(|x| top_category(dataset, &x.name, name))
        {
            insights.push(Insight {
                kind: InsightKind::Comparison,
                title: format!("Top {}: {}", top.dimension, top.category),
                description: format!(
                    "{} has the highest total {name} ({}).",
                    top.category,
                    format_magnitude(top.total)
                ),
                value: Some(InsightValue::Text(top.category)),
            });
        }
        debug!(target = name, insights = insights.len(), "insights generated");
        insights
    }
}

struct TopCategory {
    dimension: String,
    category: String,
    total: f64,
}

// Totals in first-seen order; the stable sort keeps that order among ties.
fn top_category(dataset: &Dataset, dimension: &str, measure: &str) -> Option<TopCategory> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for row in &dataset.rows {
        let key = row.get(dimension);
        if is_missing(key) {
            continue;
        }
        let Some(value) = row.get(measure).and_then(coerce_number) else {
            continue;
        };
        let key = key.map(value_key).unwrap_or_default();
        match totals.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += value,
            None => totals.push((key, value)),
        }
    }
    totals
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .next()
        .map(|(category, total)| TopCategory {
            dimension: dimension.to_string(),
            category,
            total,
        })
}
