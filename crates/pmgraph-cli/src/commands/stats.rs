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

//! Stats command - spikes, net latency and time spent per latency zone

use super::{base_series, open_session, series_keys};
use crate::error::CliError;
use colored::Colorize;
use pmgraph::{CancellationToken, PivotMode, RuntimeStats, DEFAULT_ZONES};
use std::fmt::Write as _;
use std::path::Path;

fn zone_header() -> String {
    let mut out = String::from("Series");
    for upper in DEFAULT_ZONES {
        let _ = write!(out, "\t<={}s", upper);
    }
    out
}

fn runtime_table(runtime: &RuntimeStats) -> String {
    let mut out = zone_header();
    for item in runtime.series.iter().chain(&runtime.aggregated) {
        out.push('\n');
        out.push_str(&item.name);
        for spent in &item.time_spent {
            let _ = write!(out, "\t{:.6}", spent);
        }
    }
    out
}

/// Show the statistics of one series and the runtime of each of its trials.
pub fn stats(data: &Path, at: &[String], json: bool) -> Result<(), CliError> {
    let (key1, key2) = series_keys(at)?;
    let mut session = open_session(data, &CancellationToken::new())?;
    let base = base_series(&mut session, key1, key2)?;
    let key = session.build_pivot(base, PivotMode::Trials)?;
    let runtime = session.runtime_stats(&key, &DEFAULT_ZONES)?;
    let Some(group) = session.group(base) else {
        return Err(CliError::MissingSeries {
            key1: key1.to_string(),
            key2: key2.to_string(),
        });
    };

    if json {
        let value = serde_json::json!({
            "key1": key1,
            "key2": key2,
            "trials": group.trials().len(),
            "stats": group.stats(),
            "zones": DEFAULT_ZONES,
            "runtime": runtime,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {} {}", "Series".bright_blue().bold(), key1, key2);
    println!("Trials:\t{}", group.trials().len());
    println!("{}", group.stats());
    println!();
    println!("{}", "Time spent per latency zone (s)".bright_blue().bold());
    println!("{}", runtime_table(&runtime));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_header_has_one_column_per_zone() {
        let header = zone_header();
        assert_eq!(header.split('\t').count(), DEFAULT_ZONES.len() + 1);
        assert!(header.starts_with("Series\t<=0.0000005s\t<=0.000003s"));
    }

    #[test]
    fn test_empty_runtime_table_is_header_only() {
        assert_eq!(runtime_table(&RuntimeStats::default()), zone_header());
    }
}
