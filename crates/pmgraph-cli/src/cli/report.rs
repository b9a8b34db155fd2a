// Dweve PmGraph - pmbench report aggregation and pivot engine
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Commands over result documents and standalone reports.

use super::{AccessArg, AreaArg, ResolutionArg};
use crate::commands;
use crate::error::CliError;
use clap::Subcommand;
use pmgraph::PivotMode;
use std::path::PathBuf;

fn parse_pivot(name: &str) -> Result<PivotMode, String> {
    match PivotMode::from_name(name) {
        Some(PivotMode::Manual) => Err("the manual table is built by 'import'".to_string()),
        Some(mode) => Ok(mode),
        None => Err(format!(
            "unknown pivot '{}'; expected trials, os, device, memory, mapsize, jobs, delay, ratio or nice",
            name
        )),
    }
}

/// Commands over pmbench results.
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Export one pivot table as CSV
    ///
    /// Builds the pivot table of `--pivot` around the series `--at` and
    /// writes it as `<signature>.csv` into the output directory, or to the
    /// output path when it ends in `.csv`.
    Export {
        /// Folder holding the result documents
        #[arg(short, long, value_name = "DIR")]
        data: PathBuf,

        /// Document and series key of the base series
        #[arg(long, num_args = 2, value_names = ["KEY1", "KEY2"], required = true)]
        at: Vec<String>,

        /// Dimension to vary, or `trials`
        #[arg(short, long, value_parser = parse_pivot, default_value = "trials")]
        pivot: PivotMode,

        #[arg(short, long, value_enum, default_value_t)]
        resolution: ResolutionArg,

        /// Output directory or `.csv` path
        #[arg(short, long, value_name = "PATH", default_value = ".")]
        output: PathBuf,
    },

    /// Export every pivot table of every series
    ///
    /// Tables comparing fewer than two trials are skipped. Ctrl-C stops the
    /// export before the next series.
    ExportAll {
        #[arg(short, long, value_name = "DIR")]
        data: PathBuf,

        /// Directory the CSV files are written to
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t)]
        resolution: ResolutionArg,
    },

    /// Average every series and list the invalid ones
    Verify {
        #[arg(short, long, value_name = "DIR")]
        data: PathBuf,
    },

    /// Print the chart series of a pivot table as JSON
    Series {
        #[arg(short, long, value_name = "DIR")]
        data: PathBuf,

        #[arg(long, num_args = 2, value_names = ["KEY1", "KEY2"], required = true)]
        at: Vec<String>,

        #[arg(short, long, value_parser = parse_pivot, default_value = "trials")]
        pivot: PivotMode,

        /// Only series of this access type
        #[arg(long, value_enum)]
        access: Option<AccessArg>,

        #[arg(long, value_enum, default_value_t)]
        area: AreaArg,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the statistics of one series
    ///
    /// Prints the read and write spikes, net average latency and the time
    /// spent per latency zone by every trial of the series.
    Stats {
        #[arg(short, long, value_name = "DIR")]
        data: PathBuf,

        #[arg(long, num_args = 2, value_names = ["KEY1", "KEY2"], required = true)]
        at: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Import standalone reports into the manual table
    Import {
        /// Report files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Average every imported report under this name
        #[arg(short, long, value_name = "NAME")]
        average: Option<String>,

        /// Export the manual table to this CSV path
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Write the average back as a standalone report
        #[arg(long, value_name = "PATH", requires = "average")]
        save_average: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t)]
        resolution: ResolutionArg,
    },
}

impl ReportCommands {
    /// Execute the report command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            ReportCommands::Export {
                data,
                at,
                pivot,
                resolution,
                output,
            } => commands::export(&data, &at, pivot, resolution.into(), &output),
            ReportCommands::ExportAll {
                data,
                output,
                resolution,
            } => commands::export_all(&data, &output, resolution.into()),
            ReportCommands::Verify { data } => commands::verify(&data),
            ReportCommands::Series {
                data,
                at,
                pivot,
                access,
                area,
                output,
            } => commands::series(
                &data,
                &at,
                pivot,
                access.map(Into::into),
                area.into(),
                output.as_deref(),
            ),
            ReportCommands::Stats { data, at, json } => commands::stats(&data, &at, json),
            ReportCommands::Import {
                files,
                average,
                output,
                save_average,
                resolution,
            } => commands::import(
                &files,
                average.as_deref(),
                output.as_deref(),
                save_average.as_deref(),
                resolution.into(),
            ),
        }
    }
}
