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

use super::{ChartIntent, FilterPredicate, KeywordTables};
use crate::catalog::ChartType;
use crate::dataset::{parse_number, ColumnSchema, DatasetSchema};
use regex::Regex;
use serde_json::Value;
use std::cmp::Reverse;
use tracing::debug;

/// Lowercases, turns punctuation into spaces and collapses whitespace.
/// `=` survives so it can act as a filter connector. Dotted and dotless i fold
/// together, so upper-case Turkish such as "ISI HARİTASI" still matches.
pub fn normalise_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| match c {
            'ı' => 'i',
            c if c.is_alphanumeric() || c.is_whitespace() || c == '=' => c,
            _ => ' ',
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_phrase(padded: &str, phrase: &str) -> bool {
    padded.contains(&format!(" {phrase} "))
}

fn first_phrase<T: Copy>(padded: &str, table: &[(String, T)]) -> Option<T> {
    table
        .iter()
        .find(|(keyword, _)| contains_phrase(padded, keyword))
        .map(|(_, label)| *label)
}

struct Mention<'s> {
    column: &'s ColumnSchema,
    normalised: String,
}

#[derive(Debug, Clone, Copy)]
pub struct IntentParser<'k> {
    keywords: &'k KeywordTables,
}
impl Default for IntentParser<'static> {
    fn default() -> Self {
        Self::new(KeywordTables::builtin())
    }
}
impl<'k> IntentParser<'k> {
    pub fn new(keywords: &'k KeywordTables) -> Self {
        Self { keywords }
    }
    pub fn parse(&self, text: &str, schema: &DatasetSchema) -> ChartIntent {
        let normalised = normalise_text(text);
        let chart_type = self.detect_chart_type(&normalised);
        let mentions = mentioned_columns(&normalised, schema);
        let mut intent = assign_roles(chart_type, &mentions, schema);
        let residual = strip_mentions(&normalised, &mentions);
        intent.aggregation = Some(
            first_phrase(&residual, self.keywords.aggregation_keywords()).unwrap_or_default(),
        );
        intent.sort = first_phrase(&residual, self.keywords.sort_keywords());
        intent.time_granularity = first_phrase(&residual, self.keywords.granularity_keywords());
        intent.filters = self.detect_filters(text, schema);
        debug!(
            chart_type = %chart_type,
            x = ?intent.x_field,
            y = ?intent.y_field,
            color = ?intent.color_field,
            filters = intent.filters.len(),
            "intent parsed"
        );
        intent
    }
    /// Longest keyword first across every chart type; the first hit wins.
    pub fn detect_chart_type(&self, normalised: &str) -> ChartType {
        if let Some((_, chart_type)) = self
            .keywords
            .chart_keywords()
            .iter()
            .find(|(keyword, _)| normalised.contains(keyword.as_str()))
        {
            return *chart_type;
        }
        if self
            .keywords
            .temporal_keywords()
            .iter()
            .any(|keyword| normalised.contains(keyword.as_str()))
        {
            return self.keywords.temporal_chart_type();
        }
        self.keywords.default_chart_type()
    }
    fn detect_filters(&self, text: &str, schema: &DatasetSchema) -> Vec<FilterPredicate> {
        let (symbolic, worded): (Vec<&String>, Vec<&String>) = self
            .keywords
            .filter_connectors()
            .iter()
            .partition(|c| !c.chars().any(char::is_alphanumeric));
        let mut connectors = Vec::new();
        if !worded.is_empty() {
            connectors.push(format!(r"\s+(?:{})\s+", alternation(&worded)));
        }
        if !symbolic.is_empty() {
            connectors.push(format!(r"\s*(?:{})\s*", alternation(&symbolic)));
        }
        let postfix: Vec<&String> = self.keywords.filter_postfix().iter().collect();
        let mut filters: Vec<FilterPredicate> = Vec::new();
        for column in &schema.columns {
            let name = regex::escape(column.name.trim());
            if name.is_empty() {
                continue;
            }
            let mut patterns = Vec::new();
            if !connectors.is_empty() {
                patterns.push(format!(
                    r#"(?i)(?:^|[^\p{{L}}\p{{N}}_]){name}(?:{}){value}"#,
                    connectors.join("|"),
                    value = VALUE_PATTERN
                ));
            }
            if !postfix.is_empty() {
                patterns.push(format!(
                    r#"(?i)(?:^|[^\p{{L}}\p{{N}}_]){name}\s+{value}\s+(?:{})(?:$|[^\p{{L}}\p{{N}}_])"#,
                    alternation(&postfix),
                    value = VALUE_PATTERN
                ));
            }
            let found = patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .find_map(|re| re.captures(text).and_then(|caps| captured_value(&caps)));
            if let Some(raw) = found {
                if let Some(value) = filter_value(column, &raw) {
                    filters.push(FilterPredicate {
                        field: column.name.clone(),
                        value,
                    });
                }
            }
        }
        filters
    }
}

const VALUE_PATTERN: &str = r#"(?:"([^"]+)"|'([^']+)'|([^\s,;!?"']+))"#;

fn alternation(items: &[&String]) -> String {
    let mut sorted: Vec<&String> = items.to_vec();
    sorted.sort_by_key(|s| Reverse(s.chars().count()));
    sorted
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|")
}

fn captured_value(caps: &regex::Captures<'_>) -> Option<String> {
    (1..=3)
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().trim_end_matches('.').trim().to_string())
        .filter(|s| !s.is_empty())
}

fn filter_value(column: &ColumnSchema, raw: &str) -> Option<Value> {
    if column.column_type.is_numeric() {
        let number = parse_number(raw)?;
        if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
            return Some(Value::from(number as i64));
        }
        return serde_json::Number::from_f64(number).map(Value::Number);
    }
    Some(Value::String(raw.to_string()))
}

// Whole-word mentions in schema order.
fn mentioned_columns<'s>(normalised: &str, schema: &'s DatasetSchema) -> Vec<Mention<'s>> {
    let padded = format!(" {normalised} ");
    schema
        .columns
        .iter()
        .filter_map(|column| {
            let name = normalise_text(&column.name);
            (!name.is_empty() && contains_phrase(&padded, &name)).then_some(Mention {
                column,
                normalised: name,
            })
        })
        .collect()
}

// Removes whole-word column mentions so names like "Total" or "Count" do not
// read as keywords.
fn strip_mentions(normalised: &str, mentions: &[Mention<'_>]) -> String {
    let mut residual = format!(" {normalised} ");
    let mut names: Vec<&str> = mentions.iter().map(|m| m.normalised.as_str()).collect();
    names.sort_by_key(|name| Reverse(name.len()));
    for name in names {
        let needle = format!(" {name} ");
        while residual.contains(&needle) {
            residual = residual.replace(&needle, " ");
        }
    }
    format!(" {} ", residual.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn columns_where<'s>(
    mentions: &[Mention<'s>],
    pred: impl Fn(&ColumnSchema) -> bool,
) -> Vec<&'s ColumnSchema> {
    mentions
        .iter()
        .map(|m| m.column)
        .filter(|c| pred(*c))
        .collect()
}

fn next_numeric<'s>(
    mentioned: &[&'s ColumnSchema],
    schema: &'s DatasetSchema,
    exclude: &[Option<&str>],
) -> Option<&'s ColumnSchema> {
    let free = |c: &&ColumnSchema| !exclude.contains(&Some(c.name.as_str()));
    mentioned
        .iter()
        .copied()
        .find(free)
        .or_else(|| schema.numeric_columns().find(free))
}

fn assign_roles(
    chart_type: ChartType,
    mentions: &[Mention<'_>],
    schema: &DatasetSchema,
) -> ChartIntent {
    let mentioned_numeric = columns_where(mentions, |c| c.column_type.is_numeric());
    let mentioned_categorical = columns_where(mentions, |c| c.is_categorical());
    let mentioned_temporal = columns_where(mentions, |c| c.column_type.is_temporal());
    let y = mentioned_numeric
        .first()
        .copied()
        .or_else(|| schema.first_numeric());
    let y_name = y.map(|c| c.name.as_str());
    let grouping = mentioned_temporal
        .first()
        .copied()
        .or_else(|| schema.first_temporal())
        .or_else(|| schema.first_categorical());
    // Point charts read "y vs x": the second numeric column takes x.
    let x = match chart_type {
        t if t.is_point() => next_numeric(&mentioned_numeric, schema, &[y_name]).or(grouping),
        ChartType::Histogram => grouping.or(y),
        _ => grouping,
    };
    let x_name = x.map(|c| c.name.as_str());
    let color = mentioned_categorical
        .iter()
        .copied()
        .find(|c| Some(c.name.as_str()) != x_name)
        .or_else(|| {
            schema
                .categorical_columns()
                .find(|c| Some(c.name.as_str()) != x_name)
        });
    let size = if chart_type.is_point() {
        next_numeric(&mentioned_numeric, schema, &[y_name, x_name])
    } else {
        None
    };
    ChartIntent {
        chart_type: Some(chart_type),
        x_field: x.map(|c| c.name.clone()),
        y_field: y.map(|c| c.name.clone()),
        color_field: color.map(|c| c.name.clone()),
        size_field: size.map(|c| c.name.clone()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn normalisation_strips_punctuation_and_collapses_space() {
        assert_eq!(normalise_text("  Show, SALES!!  by\tRegion? "), "show sales by region");
        assert_eq!(normalise_text("Satış_Miktarı"), "satış miktari");
        assert_eq!(normalise_text("ISI HARİTASI"), normalise_text("ısı haritası"));
        assert_eq!(normalise_text("region=North"), "region=north");
    }
    #[test]
    fn phrases_match_whole_words_only() {
        let padded = " sales by country ";
        assert!(!contains_phrase(padded, "count"));
        assert!(contains_phrase(padded, "by country"));
    }
}
