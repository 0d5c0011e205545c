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

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#6366f1", "#22d3ee", "#f59e0b", "#10b981", "#ef4444", "#a855f7", "#ec4899", "#84cc16",
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub axis_label: String,
    pub axis_title: String,
    pub grid: String,
    pub domain: String,
    pub legend_label: String,
    pub legend_title: String,
    pub title: String,
    pub font: String,
}
impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            axis_label: "#94a3b8".to_string(),
            axis_title: "#cbd5e1".to_string(),
            grid: "#1e293b".to_string(),
            domain: "#334155".to_string(),
            legend_label: "#94a3b8".to_string(),
            legend_title: "#cbd5e1".to_string(),
            title: "#f1f5f9".to_string(),
            font: "Inter, system-ui, sans-serif".to_string(),
        }
    }
}
impl ThemeColors {
    pub fn light() -> Self {
        Self {
            axis_label: "#475569".to_string(),
            axis_title: "#1e293b".to_string(),
            grid: "#e2e8f0".to_string(),
            domain: "#cbd5e1".to_string(),
            legend_label: "#475569".to_string(),
            legend_title: "#1e293b".to_string(),
            title: "#0f172a".to_string(),
            ..Default::default()
        }
    }
}

/// The `config` block shared by every compiled document.
pub fn config_block(colors: &ThemeColors, palette: &[String]) -> Value {
    json!({
        "background": "transparent",
        "font": colors.font,
        "view": {"stroke": "transparent"},
        "axis": {
            "labelColor": colors.axis_label,
            "titleColor": colors.axis_title,
            "gridColor": colors.grid,
            "domainColor": colors.domain,
            "tickColor": colors.domain,
        },
        "legend": {
            "labelColor": colors.legend_label,
            "titleColor": colors.legend_title,
        },
        "title": {"color": colors.title},
        "range": {"category": palette},
    })
}
