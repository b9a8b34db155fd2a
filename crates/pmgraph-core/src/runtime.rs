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

//! Time spent per latency zone.
//!
//! Every histogram sample is weighted by its latency, and the products are
//! summed into ascending zones. This shows where a run actually spent its
//! time, which the raw counts hide for long-tail latencies.

use crate::report::{Access, Histogram, HEXES_PER_BUCKET};
use crate::series::exponent_to_seconds;

/// Default zone upper bounds in seconds.
pub const DEFAULT_ZONES: [f64; 5] = [0.5e-6, 3e-6, 50e-6, 500e-6, 100.0];

/// Latency-weighted time per zone of one histogram.
///
/// Latencies above the last bound are counted in the last zone.
pub fn time_spent(histogram: &Histogram, zones: &[f64]) -> Vec<f64> {
    let mut result = vec![0.0; zones.len()];
    if zones.is_empty() {
        return result;
    }
    let mut zone = 0;
    let mut add = |seconds: f64, count: f64, halve: bool| {
        while zone + 1 < zones.len() && seconds > zones[zone] {
            zone += 1;
        }
        let weight = if halve { seconds / 2.0 } else { seconds };
        result[zone] += weight * count;
    };

    if let Some(first) = histogram.first_low() {
        add(exponent_to_seconds(8.0), first.sum_count, true);
    }
    for bucket in &histogram.buckets {
        let lo = f64::from(bucket.interval_lo);
        let width = f64::from(bucket.interval_hi - bucket.interval_lo) / HEXES_PER_BUCKET as f64;
        for (j, count) in bucket.hexes.iter().flatten().enumerate() {
            add(exponent_to_seconds(lo + (0.5 + j as f64) * width), *count, false);
        }
    }
    for low in histogram.tail_low() {
        let mid = f64::from(low.interval_lo) + f64::from(low.interval_hi - low.interval_lo) / 2.0;
        add(exponent_to_seconds(mid), low.sum_count, false);
    }
    result
}

/// Time spent by one named series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeItem {
    pub name: String,
    pub time_spent: Vec<f64>,
}

/// Runtime statistics of a set of series.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeStats {
    /// One entry per series.
    pub series: Vec<RuntimeItem>,
    /// Read and write series of the same trial summed together.
    pub aggregated: Vec<RuntimeItem>,
}

/// Compute per-series and per-trial runtime statistics.
///
/// `inputs` holds `(trial name, access, histogram)` triples; series of the
/// same trial name are merged in the aggregate.
pub fn runtime_stats<'a, I>(inputs: I, zones: &[f64]) -> RuntimeStats
where
    I: IntoIterator<Item = (&'a str, Access, &'a Histogram)>,
{
    let mut stats = RuntimeStats::default();
    for (trial, access, histogram) in inputs {
        let spent = time_spent(histogram, zones);
        stats.series.push(RuntimeItem {
            name: crate::series::series_name(trial, access),
            time_spent: spent.clone(),
        });
        match stats.aggregated.iter_mut().find(|a| a.name == trial) {
            Some(agg) => {
                for (a, s) in agg.time_spent.iter_mut().zip(&spent) {
                    *a += s;
                }
            }
            None => stats.aggregated.push(RuntimeItem {
                name: trial.to_string(),
                time_spent: spent,
            }),
        }
    }
    stats
}
