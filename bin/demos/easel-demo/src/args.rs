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

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "easel-demo",
    version,
    about = "Recommend charts, answer chart requests and summarise a csv or json file"
)]
pub struct Args {
    #[arg(help = "Path to a .csv or .json file")]
    pub file: PathBuf,
    #[arg(
        long = "prompt",
        short = 'p',
        help = "Free-text chart request, e.g. \"total sales by region as a pie chart\""
    )]
    pub prompt: Option<String>,
    #[arg(long = "x", help = "Field currently on the x axis, used for insights")]
    pub x_field: Option<String>,
    #[arg(long = "y", help = "Measure to summarise; defaults to the first numeric column")]
    pub y_field: Option<String>,
    #[arg(long = "config", help = "YAML file overriding engine defaults")]
    pub config: Option<PathBuf>,
    #[arg(
        long = "top",
        default_value_t = 5,
        help = "How many recommendations to list"
    )]
    pub top: usize,
    #[arg(
        long = "json",
        default_value_t = false,
        help = "Print full chart specs as JSON"
    )]
    pub json: bool,
    #[arg(long = "debug", default_value_t = false, help = "Enable debug logging")]
    pub debug: bool,
}
