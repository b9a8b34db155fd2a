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

//! Import command - standalone reports into the manual table
//!
//! Report files are read in parallel with rayon; parsing and averaging run
//! on the session afterwards.

use super::{read_file, write_output};
use crate::error::CliError;
use colored::Colorize;
use pmgraph::csv::ExportConfig;
use pmgraph::{Resolution, Session, SessionConfig};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Display name of a report file: its stem, or the whole path.
fn report_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Import report files into the manual table.
///
/// With `average`, every imported report is averaged into a new trial of
/// that name; `save_average` writes it back as a standalone report.
/// `output` exports the manual table as CSV.
pub fn import(
    files: &[PathBuf],
    average: Option<&str>,
    output: Option<&Path>,
    save_average: Option<&Path>,
    resolution: Resolution,
) -> Result<(), CliError> {
    let mut session = Session::new(SessionConfig::from_env());
    let max = session.config().max_file_size;

    let read: Vec<(PathBuf, Result<String, CliError>)> = files
        .par_iter()
        .map(|path| (path.clone(), read_file(path, max)))
        .collect();

    let mut failures: Vec<(PathBuf, String)> = Vec::new();
    let mut reports = Vec::new();
    for (path, text) in read {
        match text {
            Ok(text) => reports.push((report_name(&path), text)),
            Err(e) => failures.push((path, e.to_string())),
        }
    }
    let outcome = session.import_reports(reports);
    failures.extend(
        outcome
            .failed
            .iter()
            .map(|(name, e)| (PathBuf::from(name), e.to_string())),
    );

    println!(
        "{} {} report(s)",
        "Imported:".green().bold(),
        outcome.imported.len()
    );
    if !failures.is_empty() {
        eprintln!("{}", "Import failures:".red().bold());
        for (path, error) in &failures {
            eprintln!("  {} {} - {}", "✗".red(), path.display(), error);
        }
    }
    if outcome.imported.is_empty() {
        return Err(CliError::NothingImported);
    }

    if let Some(name) = average {
        for &crony in &outcome.imported {
            session.flag_for_average(crony, true)?;
        }
        let averaged = session.average_selected(Some(name))?;
        println!("{} {}", "Averaged:".green().bold(), name);
        if let Some(path) = save_average {
            let xml = session.report_xml(averaged)?;
            write_output(&xml, Some(path))?;
        }
    }

    if let Some(path) = output {
        let key = session.manual_pivot();
        let config = ExportConfig {
            resolution,
            ..ExportConfig::default()
        };
        session.export_pivot_to_path(&key, path, &config)?;
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_name_is_the_file_stem() {
        assert_eq!(report_name(Path::new("runs/baseline.xml")), "baseline");
        assert_eq!(report_name(Path::new("run")), "run");
    }
}
