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

//! CLI command definitions and argument parsing.
//!
//! Commands are organized into two modules:
//!
//! - [`report`]: commands over a folder of result documents or standalone
//!   reports (export, export-all, verify, series, stats, import)
//! - [`utility`]: shell completion

mod report;
mod utility;

use clap::{Parser, Subcommand, ValueEnum};
use pmgraph::{Access, ChartArea, Resolution};

pub use report::ReportCommands;
pub use utility::UtilityCommands;

/// pmgraph - pmbench report aggregation and pivot engine
///
/// Averages the trials of pmbench result documents, builds pivot tables
/// around a series and exports them as multi-table CSV files.
///
/// # Examples
///
/// ```bash
/// # Compare every read/write ratio of one series
/// pmgraph export --data results --at 0_0_0 0_0_0_1_0 --pivot ratio
///
/// # Export every pivot table of every series
/// pmgraph export-all --data results --output csv
///
/// # Average two standalone reports
/// pmgraph import a.xml b.xml --average Baseline --output manual.csv
/// ```
#[derive(Parser)]
#[command(name = "pmgraph")]
#[command(author, version, about = "pmgraph - pmbench report aggregation and pivot engine", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands enum.
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Report(ReportCommands),

    #[command(flatten)]
    Utility(UtilityCommands),
}

impl Commands {
    /// Execute the command with the provided arguments.
    pub fn execute(self) -> Result<(), crate::error::CliError> {
        match self {
            Commands::Report(cmd) => cmd.execute(),
            Commands::Utility(cmd) => cmd.execute(),
        }
    }
}

/// Export resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResolutionArg {
    /// One row per bucket
    Coarse,
    /// One row per hex sub-bucket
    #[default]
    Fine,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Coarse => Resolution::Coarse,
            ResolutionArg::Fine => Resolution::Fine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccessArg {
    Read,
    Write,
}

impl From<AccessArg> for Access {
    fn from(arg: AccessArg) -> Self {
        match arg {
            AccessArg::Read => Access::Read,
            AccessArg::Write => Access::Write,
        }
    }
}

/// Chart a series is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AreaArg {
    /// Coarse overview points
    Mini,
    /// Fine points
    #[default]
    Full,
    /// Fine points with empty sub-buckets lifted to one
    Log,
}

impl From<AreaArg> for ChartArea {
    fn from(arg: AreaArg) -> Self {
        match arg {
            AreaArg::Mini => ChartArea::Mini,
            AreaArg::Full => ChartArea::Full,
            AreaArg::Log => ChartArea::Log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["pmgraph", "-vv", "verify", "--data", "results"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_at_takes_two_keys() {
        let parsed = Cli::try_parse_from([
            "pmgraph", "stats", "--data", "results", "--at", "0_0_0",
        ]);
        assert!(parsed.is_err());
    }
}
