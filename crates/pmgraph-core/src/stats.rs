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

//! Summary statistics of an averaged series.

use crate::report::{Access, Histogram, TrialData};
use std::fmt;

/// Tallest histogram bucket and tallest hex sub-bucket.
///
/// The two maxima are found independently, so `hex_bin` need not lie
/// inside the bucket named by `interval_hi`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spike {
    /// Largest `sum_count` over every bucket, index-0 ones included.
    pub count: f64,
    /// `interval_hi` exponent of that bucket, if any bucket was non-empty.
    pub interval_hi: Option<i32>,
    /// Largest hex sub-bucket count over buckets 1..15.
    pub hex_count: f64,
    /// Sub-bucket index of `hex_count`.
    pub hex_bin: Option<usize>,
}

impl Spike {
    /// Find the spike of a histogram.
    ///
    /// Buckets are scanned in document order and only a strictly larger
    /// value replaces the current one, so ties go to the earliest bucket.
    pub fn of(histogram: &Histogram) -> Spike {
        let mut spike = Spike::default();
        let sums = histogram
            .first_low()
            .map(|b| (b.sum_count, b.interval_hi))
            .into_iter()
            .chain(histogram.buckets.iter().map(|b| (b.sum_count, b.interval_hi)))
            .chain(histogram.tail_low().iter().map(|b| (b.sum_count, b.interval_hi)));
        for (count, hi) in sums {
            if count > spike.count {
                spike.count = count;
                spike.interval_hi = Some(hi);
            }
        }
        for bucket in &histogram.buckets {
            for (bin, &hex) in bucket.hexes.iter().flatten().enumerate() {
                if hex > spike.hex_count {
                    spike.hex_count = hex;
                    spike.hex_bin = Some(bin);
                }
            }
        }
        spike
    }
}

/// Statistics computed once per sibling group from its average.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupStats {
    pub read_spike: Option<Spike>,
    pub write_spike: Option<Spike>,
    /// Mean of the per-thread net average latency in microseconds.
    pub net_average_latency: f64,
    /// Mean sample count per thread.
    pub samples_per_thread: f64,
}

impl GroupStats {
    pub fn compute(average: &TrialData) -> GroupStats {
        let threads = average.threads.len();
        let (net, samples) = if threads == 0 {
            (0.0, 0.0)
        } else {
            let n = threads as f64;
            (
                average.threads.iter().map(|t| t.netavg_us).sum::<f64>() / n,
                average.threads.iter().map(|t| t.samples).sum::<f64>() / n,
            )
        };
        GroupStats {
            read_spike: average.read.as_ref().map(Spike::of),
            write_spike: average.write.as_ref().map(Spike::of),
            net_average_latency: net,
            samples_per_thread: samples,
        }
    }

    pub fn spike(&self, access: Access) -> Option<&Spike> {
        match access {
            Access::Read => self.read_spike.as_ref(),
            Access::Write => self.write_spike.as_ref(),
        }
    }
}

impl fmt::Display for GroupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Net average latency:\t{}", self.net_average_latency)?;
        write!(f, "Average samples per thread:\t{}", self.samples_per_thread)?;
        for access in Access::BOTH {
            if let Some(spike) = self.spike(access) {
                write!(f, "\n{} spike:\t{}", crate::report::phase_label(access.as_str()), spike.count)?;
                if let Some(hi) = spike.interval_hi {
                    write!(f, " at bucket 2^{}", hi)?;
                }
                if let Some(bin) = spike.hex_bin {
                    write!(f, "; {} at bin {}", spike.hex_count, bin)?;
                }
            }
        }
        Ok(())
    }
}
