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

//! Export commands - single pivot tables and the whole result set

use super::{base_series, open_session, series_keys};
use crate::error::CliError;
use colored::Colorize;
use pmgraph::csv::ExportConfig;
use pmgraph::{mass_export, CancellationToken, PivotMode, Resolution};
use std::fs;
use std::path::Path;
use tracing::warn;

fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
}

/// Export the pivot table of `mode` around one series.
///
/// `output` is a directory, where the file is named after the table
/// signature, or an explicit `.csv` path.
pub fn export(
    data: &Path,
    at: &[String],
    mode: PivotMode,
    resolution: Resolution,
    output: &Path,
) -> Result<(), CliError> {
    let (key1, key2) = series_keys(at)?;
    let mut session = open_session(data, &CancellationToken::new())?;
    let base = base_series(&mut session, key1, key2)?;
    let key = session.build_pivot(base, mode)?;
    let config = ExportConfig {
        resolution,
        ..ExportConfig::default()
    };

    let path = if is_csv_path(output) {
        session.export_pivot_to_path(&key, output, &config)?;
        output.to_path_buf()
    } else {
        fs::create_dir_all(output).map_err(|e| CliError::io_error(output, e))?;
        session.export_pivot(&key, output, &config)?
    };
    println!("{}", path.display());
    Ok(())
}

/// Export every pivot table of every loaded series into `output`.
///
/// Ctrl-C requests cancellation; files written before it stay in place.
pub fn export_all(data: &Path, output: &Path, resolution: Resolution) -> Result<(), CliError> {
    let token = CancellationToken::new();
    let handler = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler.cancel()) {
        warn!(error = %e, "Ctrl-C handler not installed");
    }

    let mut session = open_session(data, &token)?;
    fs::create_dir_all(output).map_err(|e| CliError::io_error(output, e))?;
    let config = ExportConfig {
        resolution,
        ..ExportConfig::default()
    };
    let outcome = mass_export(&mut session, output, &config, &token)?;

    println!(
        "{} {} file(s) written to {}, {} single-trial table(s) skipped",
        "Exported:".green().bold(),
        outcome.files_written,
        output.display(),
        outcome.tables_skipped
    );
    if outcome.cancelled {
        eprintln!("{}", "Export interrupted".yellow().bold());
        return Err(CliError::Cancelled);
    }
    Ok(())
}
