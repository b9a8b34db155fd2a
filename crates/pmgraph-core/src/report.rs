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

//! Typed contents of one pmbench report.
//!
//! A report carries per-thread latency results, up to two latency
//! histograms (read and write) and a sequence of system memory snapshots.
//! All numeric leaves are `f64` so that a synthesized average has the
//! same shape as a raw trial.

use crate::error::{PmError, Result};
use crate::params::Platform;
use smallvec::SmallVec;
use std::fmt;

/// Number of hex sub-buckets in each of buckets 1..15.
pub const HEXES_PER_BUCKET: usize = 16;

/// Declared index range of the hex-resolved buckets.
pub const BUCKET_INDICES: std::ops::RangeInclusive<u8> = 1..=15;

/// Access type of a histogram or chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub const BOTH: [Access; 2] = [Access::Read, Access::Write];

    /// Value of the histogram `type` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }

    /// The other access type.
    pub fn partner(self) -> Access {
        match self {
            Access::Read => Access::Write,
            Access::Write => Access::Read,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latency results of one worker thread.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreadResult {
    /// 1-based thread number.
    pub thread_num: u32,
    pub netavg_us: f64,
    pub netavg_clk: f64,
    pub latency_us: f64,
    pub latency_clk: f64,
    pub samples: f64,
    pub overhead_us: f64,
    pub overhead_clk: f64,
    pub total: f64,
}

impl ThreadResult {
    /// Column headers of the exported thread table, excluding the thread number.
    pub const EXPORT_HEADERS: [&'static str; 7] = [
        "Net avg. (us)",
        "Net avg. (clk)",
        "Latency (us)",
        "Latency (clk)",
        "Samples",
        "Overhead (us)",
        "Overhead (clk)",
    ];

    /// Values shown in exports, in [`EXPORT_HEADERS`](Self::EXPORT_HEADERS) order.
    pub fn export_values(&self) -> [f64; 7] {
        [
            self.netavg_us,
            self.netavg_clk,
            self.latency_us,
            self.latency_clk,
            self.samples,
            self.overhead_us,
            self.overhead_clk,
        ]
    }

    /// Mutable access to every averaged leaf.
    pub fn leaves_mut(&mut self) -> [&mut f64; 8] {
        [
            &mut self.netavg_us,
            &mut self.netavg_clk,
            &mut self.latency_us,
            &mut self.latency_clk,
            &mut self.samples,
            &mut self.overhead_us,
            &mut self.overhead_clk,
            &mut self.total,
        ]
    }

    /// Every averaged leaf.
    pub fn leaves(&self) -> [f64; 8] {
        [
            self.netavg_us,
            self.netavg_clk,
            self.latency_us,
            self.latency_clk,
            self.samples,
            self.overhead_us,
            self.overhead_clk,
            self.total,
        ]
    }
}

/// One of buckets 1..15, covering latencies `[2^interval_lo, 2^interval_hi)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bucket {
    pub index: u8,
    pub interval_lo: i32,
    pub interval_hi: i32,
    pub sum_count: f64,
    /// Sixteen linear sub-bucket counts; `None` when the report carried none.
    /// Individual missing counts read as zero.
    pub hexes: Option<[f64; HEXES_PER_BUCKET]>,
}

/// An index-0 bucket: the sub-`2^8` bucket or one of the large-latency buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LowBucket {
    pub interval_lo: i32,
    pub interval_hi: i32,
    pub sum_count: f64,
}

/// Latency histogram of one access type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram {
    pub access: Access,
    /// Buckets with declared indices 1..15 in document order.
    pub buckets: Vec<Bucket>,
    /// Index-0 buckets in document order; the first covers `[0, 2^8)`.
    pub bucket0: SmallVec<[LowBucket; 9]>,
}

impl Histogram {
    /// An empty histogram.
    pub fn new(access: Access) -> Self {
        Self {
            access,
            buckets: Vec::new(),
            bucket0: SmallVec::new(),
        }
    }

    /// Bucket with a declared index.
    pub fn bucket(&self, index: u8) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.index == index)
    }

    /// The sub-`2^8` bucket, when present.
    pub fn first_low(&self) -> Option<&LowBucket> {
        self.bucket0.first()
    }

    /// Index-0 buckets after the first.
    pub fn tail_low(&self) -> &[LowBucket] {
        self.bucket0.get(1..).unwrap_or(&[])
    }

    /// Total sample count over all buckets.
    pub fn total_count(&self) -> f64 {
        self.buckets.iter().map(|b| b.sum_count).sum::<f64>()
            + self.bucket0.iter().map(|b| b.sum_count).sum::<f64>()
    }
}

/// Memory counters of a Linux host.
pub const LINUX_MEMORY_FIELDS: [&str; 10] = [
    "free_kib",
    "buffer_kib",
    "cache_kib",
    "active_kib",
    "inactive_kib",
    "pgpgin",
    "pgpgout",
    "pswpin",
    "pswpout",
    "pgmajfault",
];

/// Memory counters of a Windows host.
pub const WINDOWS_MEMORY_FIELDS: [&str; 5] = [
    "AvailPhys",
    "dwMemoryLoad",
    "TotalPageFile",
    "AvailPageFile",
    "AvailVirtual",
];

/// Platform-specific memory counters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryFields {
    Linux([f64; 10]),
    Windows([f64; 5]),
}

impl MemoryFields {
    /// Zeroed counters for a platform.
    pub fn zeroed(platform: Platform) -> Self {
        match platform {
            Platform::Linux => MemoryFields::Linux([0.0; 10]),
            Platform::Windows => MemoryFields::Windows([0.0; 5]),
        }
    }

    /// XML element names of the counters for a platform.
    pub fn names(platform: Platform) -> &'static [&'static str] {
        match platform {
            Platform::Linux => &LINUX_MEMORY_FIELDS,
            Platform::Windows => &WINDOWS_MEMORY_FIELDS,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            MemoryFields::Linux(_) => Platform::Linux,
            MemoryFields::Windows(_) => Platform::Windows,
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            MemoryFields::Linux(v) => v,
            MemoryFields::Windows(v) => v,
        }
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        match self {
            MemoryFields::Linux(v) => v,
            MemoryFields::Windows(v) => v,
        }
    }
}

/// One named memory snapshot (`pre-warmup`, `pre-run`, `mid-run`, `post-run`, ...).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemorySnapshot {
    pub phase: String,
    pub info: MemoryFields,
    /// Change until the following snapshot; absent on the last one.
    pub delta: Option<MemoryFields>,
}

impl MemorySnapshot {
    /// Display label of the snapshot phase.
    pub fn label(&self) -> String {
        phase_label(&self.phase)
    }
}

/// Capitalized label for a snapshot phase name (`pre-run` becomes `Pre-run`).
pub fn phase_label(phase: &str) -> String {
    let mut chars = phase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything measured in one trial.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialData {
    pub threads: Vec<ThreadResult>,
    pub read: Option<Histogram>,
    pub write: Option<Histogram>,
    pub memory: Vec<MemorySnapshot>,
}

impl TrialData {
    /// Histogram of one access type.
    pub fn histogram(&self, access: Access) -> Option<&Histogram> {
        match access {
            Access::Read => self.read.as_ref(),
            Access::Write => self.write.as_ref(),
        }
    }

    pub(crate) fn histogram_mut(&mut self, access: Access) -> Option<&mut Histogram> {
        match access {
            Access::Read => self.read.as_mut(),
            Access::Write => self.write.as_mut(),
        }
    }

    /// Result of the thread with the given number.
    pub fn thread(&self, thread_num: u32) -> Option<&ThreadResult> {
        self.threads.iter().find(|t| t.thread_num == thread_num)
    }

    /// Samples over all threads.
    pub fn total_samples(&self) -> f64 {
        self.threads.iter().map(|t| t.samples).sum()
    }

    /// Fail on the first NaN or infinite leaf.
    pub fn check_finite(&self) -> Result<()> {
        let bad = |context: String| Err(PmError::malformed(context, "non-finite value"));
        for t in &self.threads {
            if t.leaves().iter().any(|v| !v.is_finite()) {
                return bad(format!("thread {}", t.thread_num));
            }
        }
        for h in self.read.iter().chain(self.write.iter()) {
            for b in &h.buckets {
                let hexes_ok = b
                    .hexes
                    .map_or(true, |hx| hx.iter().all(|v| v.is_finite()));
                if !b.sum_count.is_finite() || !hexes_ok {
                    return bad(format!("{} histogram bucket {}", h.access, b.index));
                }
            }
            if h.bucket0.iter().any(|b| !b.sum_count.is_finite()) {
                return bad(format!("{} histogram bucket 0", h.access));
            }
        }
        for m in &self.memory {
            let delta_ok = m
                .delta
                .as_ref()
                .map_or(true, |d| d.values().iter().all(|v| v.is_finite()));
            if m.info.values().iter().any(|v| !v.is_finite()) || !delta_ok {
                return bad(format!("memory snapshot {}", m.phase));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_label() {
        assert_eq!(phase_label("pre-warmup"), "Pre-warmup");
        assert_eq!(phase_label("post-run"), "Post-run");
        assert_eq!(phase_label(""), "");
    }

    #[test]
    fn test_check_finite() {
        let mut data = TrialData {
            threads: vec![ThreadResult {
                thread_num: 1,
                samples: 10.0,
                ..ThreadResult::default()
            }],
            ..TrialData::default()
        };
        assert!(data.check_finite().is_ok());
        assert_eq!(data.total_samples(), 10.0);

        data.threads[0].latency_us = f64::NAN;
        let err = data.check_finite().unwrap_err();
        assert!(matches!(err, PmError::MalformedData { ref context, .. } if context == "thread 1"));
    }

    #[test]
    fn test_histogram_accessors() {
        let mut h = Histogram::new(Access::Read);
        assert!(h.first_low().is_none());
        assert!(h.tail_low().is_empty());
        h.bucket0.push(LowBucket {
            interval_lo: 0,
            interval_hi: 8,
            sum_count: 3.0,
        });
        h.buckets.push(Bucket {
            index: 1,
            interval_lo: 8,
            interval_hi: 9,
            sum_count: 4.0,
            hexes: None,
        });
        assert_eq!(h.total_count(), 7.0);
        assert!(h.bucket(1).is_some());
        assert!(h.bucket(2).is_none());
        assert_eq!(Access::Read.partner(), Access::Write);
    }
}
