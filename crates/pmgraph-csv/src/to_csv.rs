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

//! Export pivot tables as CSV.
//!
//! The file is a sequence of tables separated by blank lines:
//!
//! 1. the dimension header row and the signature row (`*` marks the
//!    varying dimension)
//! 2. one thread table per crony
//! 3. the read latency table and the write latency table, one column per
//!    crony that has the series
//! 4. one memory table per crony
//!
//! Rows have different widths, so the writer runs in flexible mode.

use crate::error::{CsvError, Result};
use pmgraph_core::report::HEXES_PER_BUCKET;
use pmgraph_core::{
    Access, Dimension, Histogram, MemoryFields, ParameterSet, PivotMode, PivotTable, Platform,
    Resolution, SiblingArena, ThreadResult, TrialRecord,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Column headers of the Linux memory table.
pub const LINUX_MEMORY_HEADERS: [&str; 10] = [
    "Free KiB",
    "Buffer KiB",
    "Cache KiB",
    "Active KiB",
    "Inactive KiB",
    "Page in/s",
    "Page out/s",
    "Swap in/s",
    "Swap out/s",
    "Major faults",
];

/// Configuration for CSV export.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig {
    /// Latency table granularity (default: fine, one row per hex sub-bucket)
    pub resolution: Resolution,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Fine,
            delimiter: b',',
        }
    }
}

struct Crony<'a> {
    label: String,
    params: &'a ParameterSet,
    record: &'a TrialRecord,
}

impl Crony<'_> {
    fn histogram(&self, access: Access) -> Option<&Histogram> {
        let expected = match access {
            Access::Read => self.params.has_read(),
            Access::Write => self.params.has_write(),
        };
        if expected && self.record.has_series(access) {
            self.record.data().histogram(access)
        } else {
            None
        }
    }
}

fn resolve<'a>(table: &PivotTable, arena: &'a SiblingArena) -> Vec<Crony<'a>> {
    table
        .cronies()
        .iter()
        .filter_map(|&crony| {
            let Some((params, record)) = arena.resolve(crony) else {
                warn!(table = %table.key(), group = %crony.group, "crony no longer exists");
                return None;
            };
            let label = table.label(arena, crony)?;
            Some(Crony {
                label,
                params,
                record,
            })
        })
        .collect()
}

/// Dimensions shown as `*` in the signature row.
fn wildcards(table: &PivotTable, cronies: &[Crony<'_>]) -> [bool; 8] {
    let mut marks = [false; 8];
    match table.mode() {
        PivotMode::Dimension(dim) => marks[dim.position()] = true,
        PivotMode::Trials => {}
        PivotMode::Manual => {
            if let Some((first, rest)) = cronies.split_first() {
                for dim in Dimension::ALL {
                    let value = first.params.value_text(dim);
                    marks[dim.position()] = rest.iter().any(|c| c.params.value_text(dim) != value);
                }
            }
        }
    }
    marks
}

/// File name (without extension) of an exported table.
///
/// The dimension values of the base series joined by `_`, with `all` in
/// place of the varying dimension. Manual tables are named `manual`.
pub fn export_file_name(table: &PivotTable) -> String {
    let (PivotMode::Dimension(_) | PivotMode::Trials, Some(base)) = (table.mode(), table.base())
    else {
        return "manual".to_string();
    };
    let pivot = table.mode().dimension();
    Dimension::ALL
        .iter()
        .map(|&dim| {
            if pivot == Some(dim) {
                "all".to_string()
            } else {
                base.value_text(dim)
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}

fn num(value: f64) -> String {
    value.to_string()
}

struct Sections {
    builder: csv::WriterBuilder,
    buf: Vec<u8>,
}

impl Sections {
    fn new(delimiter: u8) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(delimiter).flexible(true);
        Self {
            builder,
            buf: Vec::new(),
        }
    }

    /// Write one group of rows, optionally followed by a blank line.
    fn write<F>(&mut self, blank_after: bool, rows: F) -> Result<()>
    where
        F: FnOnce(&mut csv::Writer<&mut Vec<u8>>) -> Result<()>,
    {
        let mut wtr = self.builder.from_writer(&mut self.buf);
        rows(&mut wtr)?;
        wtr.flush()?;
        drop(wtr);
        if blank_after {
            self.buf.push(b'\n');
        }
        Ok(())
    }
}

/// Write a pivot table to `writer`.
///
/// # Errors
///
/// Fails when no crony of the table resolves any more, or on I/O errors.
pub fn export_pivot<W: Write>(
    table: &PivotTable,
    arena: &SiblingArena,
    mut writer: W,
    config: &ExportConfig,
) -> Result<()> {
    let cronies = resolve(table, arena);
    let Some(first) = cronies.first() else {
        return Err(CsvError::EmptyTable(table.key().to_string()));
    };
    let base = table.base().unwrap_or(first.params);
    let marks = wildcards(table, &cronies);

    let mut out = Sections::new(config.delimiter);
    out.write(true, |w| {
        w.write_record(Dimension::ALL.iter().map(|d| d.header()))?;
        w.write_record(Dimension::ALL.iter().map(|&d| {
            if marks[d.position()] {
                "*".to_string()
            } else {
                base.value_text(d)
            }
        }))?;
        Ok(())
    })?;

    out.write(true, |w| {
        for crony in &cronies {
            write_threads(w, &crony.label, &crony.record.data().threads)?;
        }
        Ok(())
    })?;

    for access in Access::BOTH {
        let members: Vec<(&str, &Histogram)> = cronies
            .iter()
            .filter_map(|c| c.histogram(access).map(|h| (c.label.as_str(), h)))
            .collect();
        if members.is_empty() {
            debug!(table = %table.key(), %access, "no latency table");
            continue;
        }
        out.write(true, |w| write_latencies(w, access, &members, config.resolution))?;
    }

    out.write(false, |w| {
        for crony in &cronies {
            write_memory(w, crony)?;
        }
        Ok(())
    })?;

    writer.write_all(&out.buf)?;
    writer.flush()?;
    Ok(())
}

/// Export a pivot table to an in-memory string.
pub fn export_pivot_to_string(
    table: &PivotTable,
    arena: &SiblingArena,
    config: &ExportConfig,
) -> Result<String> {
    let mut buffer = Vec::new();
    export_pivot(table, arena, &mut buffer, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Export a pivot table to an explicit file path.
pub fn export_pivot_to_path(
    table: &PivotTable,
    arena: &SiblingArena,
    path: &Path,
    config: &ExportConfig,
) -> Result<()> {
    let file = File::create(path)?;
    export_pivot(table, arena, BufWriter::new(file), config)?;
    debug!(path = %path.display(), table = %table.key(), "exported pivot table");
    Ok(())
}

/// Export a pivot table to `<dir>/<export_file_name>.csv` and return the path.
pub fn export_to_dir(
    table: &PivotTable,
    arena: &SiblingArena,
    dir: &Path,
    config: &ExportConfig,
) -> Result<PathBuf> {
    let path = dir.join(format!("{}.csv", export_file_name(table)));
    export_pivot_to_path(table, arena, &path, config)?;
    Ok(path)
}

fn write_threads<W: Write>(
    w: &mut csv::Writer<W>,
    label: &str,
    threads: &[ThreadResult],
) -> Result<()> {
    let header = [label, "Thread #"]
        .into_iter()
        .chain(ThreadResult::EXPORT_HEADERS);
    w.write_record(header)?;
    for thread in threads {
        let row = [String::new(), thread.thread_num.to_string()]
            .into_iter()
            .chain(thread.export_values().into_iter().map(num));
        w.write_record(row)?;
    }
    Ok(())
}

fn write_latencies<W: Write>(
    w: &mut csv::Writer<W>,
    access: Access,
    members: &[(&str, &Histogram)],
    resolution: Resolution,
) -> Result<()> {
    let title = match access {
        Access::Read => "Read latencies",
        Access::Write => "Write latencies",
    };
    w.write_record([title, ""].into_iter().chain(members.iter().map(|(l, _)| *l)))?;

    let row = |lo: f64, hi: f64, values: Vec<f64>| {
        [num(lo), num(hi)]
            .into_iter()
            .chain(values.into_iter().map(num))
            .collect::<Vec<String>>()
    };

    let first_low: Vec<f64> = members
        .iter()
        .map(|(_, h)| h.first_low().map_or(0.0, |b| b.sum_count))
        .collect();
    w.write_record(row(0.0, 256.0, first_low))?;

    for index in 1u8..=15 {
        match resolution {
            Resolution::Fine => {
                let lo = 2f64.powi(i32::from(index) + 7);
                let hi = 2f64.powi(i32::from(index) + 8);
                let step = (hi - lo) / HEXES_PER_BUCKET as f64;
                for j in 0..HEXES_PER_BUCKET {
                    let values = members
                        .iter()
                        .map(|(_, h)| {
                            h.bucket(index)
                                .and_then(|b| b.hexes)
                                .map_or(0.0, |hexes| hexes[j])
                        })
                        .collect();
                    let gap = lo + j as f64 * step;
                    w.write_record(row(gap, gap + step, values))?;
                }
            }
            Resolution::Coarse => {
                let (lo, hi) = members
                    .iter()
                    .find_map(|(_, h)| h.bucket(index))
                    .map_or((i32::from(index) + 7, i32::from(index) + 8), |b| {
                        (b.interval_lo, b.interval_hi)
                    });
                let values = members
                    .iter()
                    .map(|(_, h)| h.bucket(index).map_or(0.0, |b| b.sum_count))
                    .collect();
                w.write_record(row(2f64.powi(lo), 2f64.powi(hi), values))?;
            }
        }
    }

    // members may disagree on the tail length; short ones read as zero
    let tail = members
        .iter()
        .map(|(_, h)| h.tail_low())
        .max_by_key(|t| t.len())
        .unwrap_or(&[]);
    for (k, low) in tail.iter().enumerate() {
        let values = members
            .iter()
            .map(|(_, h)| h.tail_low().get(k).map_or(0.0, |b| b.sum_count))
            .collect();
        w.write_record(row(
            2f64.powi(low.interval_lo),
            2f64.powi(low.interval_hi),
            values,
        ))?;
    }
    Ok(())
}

fn write_memory<W: Write>(w: &mut csv::Writer<W>, crony: &Crony<'_>) -> Result<()> {
    let memory = &crony.record.data().memory;
    let platform = memory
        .first()
        .map_or_else(|| crony.params.platform(), |m| m.info.platform());
    let headers: &[&str] = match platform {
        Platform::Linux => &LINUX_MEMORY_HEADERS,
        Platform::Windows => MemoryFields::names(platform),
    };
    w.write_record(std::iter::once(crony.label.as_str()).chain(headers.iter().copied()))?;

    let values = |fields: &MemoryFields| fields.values().iter().copied().map(num).collect::<Vec<_>>();
    for snapshot in memory {
        w.write_record(std::iter::once(snapshot.label()).chain(values(&snapshot.info)))?;
        if let Some(delta) = &snapshot.delta {
            w.write_record(std::iter::once("Delta".to_string()).chain(values(delta)))?;
        }
    }
    Ok(())
}
