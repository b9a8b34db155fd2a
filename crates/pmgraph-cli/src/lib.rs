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

//! pmgraph CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! ## Result sets
//!
//! - **export**: export one pivot table around a series as CSV
//! - **export-all**: export every pivot table of every series (Ctrl-C cancels)
//! - **verify**: average every series and list the invalid ones
//! - **series**: chart series of a pivot table as JSON
//! - **stats**: spikes, net average latency and time per latency zone
//!
//! ## Manual mode
//!
//! - **import**: load standalone reports, average them, export the manual
//!   table and write the average back as a report
//!
//! ## Utilities
//!
//! - **completion**: shell completion scripts
//!
//! # Examples
//!
//! ```no_run
//! use pmgraph::{PivotMode, Resolution};
//! use pmgraph_cli::commands::export;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), pmgraph_cli::error::CliError> {
//! let at = ["0_0_0".to_string(), "0_0_0_1_0".to_string()];
//! export(Path::new("results"), &at, PivotMode::Trials, Resolution::Fine, Path::new("."))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. The filter comes from
//! `PMGRAPH_LOG`, then `RUST_LOG`, then the `-v` count.

pub mod cli;
pub mod commands;
pub mod error;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PMGRAPH_LOG";

/// Filter used when neither `PMGRAPH_LOG` nor `RUST_LOG` is set.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "pmgraph=info",
        1 => "pmgraph=debug",
        _ => "pmgraph=trace",
    }
}

/// Install the stderr subscriber.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_default_level() {
        assert_eq!(default_directive(0), "pmgraph=info");
        assert_eq!(default_directive(1), "pmgraph=debug");
        assert_eq!(default_directive(5), "pmgraph=trace");
    }
}
