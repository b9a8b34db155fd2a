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

//! Benchmark parameter dimensions and their ordered value tables.

use crate::error::{PmError, Result};
use std::fmt;

/// One of the eight axes of the benchmark parameter space.
///
/// The discriminant is the dimension's position in a [`ParamIndices`]
/// tuple and in the exported signature row.
///
/// [`ParamIndices`]: crate::key::ParamIndices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimension {
    /// Operating system / kernel the benchmark ran on.
    OperatingSystem = 0,
    /// Swap device backing the run.
    SwapDevice = 1,
    /// Physical memory in MiB.
    Memory = 2,
    /// Benchmark map size in MiB.
    Mapsize = 3,
    /// Number of worker threads.
    Jobs = 4,
    /// Delay between accesses, in clocks.
    Delay = 5,
    /// Read percentage of the access mix.
    Ratio = 6,
    /// Process niceness.
    Nice = 7,
}

impl Dimension {
    /// All dimensions in positional order.
    pub const ALL: [Dimension; 8] = [
        Dimension::OperatingSystem,
        Dimension::SwapDevice,
        Dimension::Memory,
        Dimension::Mapsize,
        Dimension::Jobs,
        Dimension::Delay,
        Dimension::Ratio,
        Dimension::Nice,
    ];

    /// Position of this dimension in an index tuple.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Dimension at a tuple position.
    pub fn from_position(position: usize) -> Option<Dimension> {
        Self::ALL.get(position).copied()
    }

    /// Column header used in exported signature rows.
    pub fn header(self) -> &'static str {
        match self {
            Dimension::OperatingSystem => "OS/kernel",
            Dimension::SwapDevice => "Swap device",
            Dimension::Memory => "Phys. memory",
            Dimension::Mapsize => "Map size",
            Dimension::Jobs => "Jobs",
            Dimension::Delay => "Delay",
            Dimension::Ratio => "Read/write ratio",
            Dimension::Nice => "Niceness",
        }
    }

    /// Parse a dimension from its command-line name.
    pub fn from_name(name: &str) -> Option<Dimension> {
        Self::ALL.iter().copied().find(|d| d.name() == name)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::OperatingSystem => "os",
            Dimension::SwapDevice => "device",
            Dimension::Memory => "memory",
            Dimension::Mapsize => "mapsize",
            Dimension::Jobs => "jobs",
            Dimension::Delay => "delay",
            Dimension::Ratio => "ratio",
            Dimension::Nice => "nice",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a pivot table chooses its cronies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PivotMode {
    /// Vary one dimension, holding the other seven fixed.
    Dimension(Dimension),
    /// The raw trials of a single series followed by their average.
    Trials,
    /// Manually imported or user-averaged trials.
    Manual,
}

impl PivotMode {
    /// Every mode that can be derived from a base series.
    pub fn derived() -> impl Iterator<Item = PivotMode> {
        Dimension::ALL
            .into_iter()
            .map(PivotMode::Dimension)
            .chain(std::iter::once(PivotMode::Trials))
    }

    /// The varying dimension, if any.
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            PivotMode::Dimension(d) => Some(d),
            _ => None,
        }
    }

    /// Parse a mode from a command-line name (`trials`, `manual` or a dimension name).
    pub fn from_name(name: &str) -> Option<PivotMode> {
        match name {
            "trials" | "none" => Some(PivotMode::Trials),
            "manual" => Some(PivotMode::Manual),
            other => Dimension::from_name(other).map(PivotMode::Dimension),
        }
    }
}

impl fmt::Display for PivotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotMode::Dimension(d) => write!(f, "{}", d),
            PivotMode::Trials => f.write_str("trials"),
            PivotMode::Manual => f.write_str("manual"),
        }
    }
}

/// Ordered value tables for every dimension.
///
/// The default reproduces the parameter grid of the published pmbench
/// result sets. Indices into these tables make up the series keys, so the
/// order of each table is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionTables {
    /// Kernel names, also used in result file names.
    pub kernels: Vec<String>,
    /// Swap device names.
    pub devices: Vec<String>,
    /// Physical memory sizes in MiB.
    pub memory: Vec<i32>,
    /// Map sizes in MiB.
    pub mapsize: Vec<i32>,
    /// Thread counts.
    pub jobs: Vec<i32>,
    /// Delays in clocks.
    pub delay: Vec<i32>,
    /// Read percentages.
    pub ratio: Vec<i32>,
    /// Niceness values.
    pub nice: Vec<i32>,
}

impl Default for DimensionTables {
    fn default() -> Self {
        Self {
            kernels: ["Fedora23_native", "Fedora23_Xen", "Windows10_native", "Windows10_Xen"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            devices: ["chatham", "NANDSSD", "RAMDISK"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            memory: vec![256, 512, 1024, 2048, 4096, 8192, 16384],
            mapsize: vec![512, 1024, 2048, 4096, 8192, 16384, 32768],
            jobs: vec![1, 8],
            delay: vec![0, 1000],
            ratio: vec![0, 50, 100],
            nice: vec![19, -20, 0],
        }
    }
}

impl DimensionTables {
    /// Number of values along a dimension.
    pub fn cardinality(&self, dim: Dimension) -> usize {
        match dim {
            Dimension::OperatingSystem => self.kernels.len(),
            Dimension::SwapDevice => self.devices.len(),
            Dimension::Memory => self.memory.len(),
            Dimension::Mapsize => self.mapsize.len(),
            Dimension::Jobs => self.jobs.len(),
            Dimension::Delay => self.delay.len(),
            Dimension::Ratio => self.ratio.len(),
            Dimension::Nice => self.nice.len(),
        }
    }

    /// Cardinalities of all dimensions in positional order.
    pub fn cardinalities(&self) -> [usize; 8] {
        Dimension::ALL.map(|d| self.cardinality(d))
    }

    fn check(&self, dim: Dimension, index: usize) -> Result<()> {
        let len = self.cardinality(dim);
        if index < len {
            Ok(())
        } else {
            Err(PmError::IndexOutOfRange {
                dimension: dim,
                index,
                len,
            })
        }
    }

    /// Integer value of a numeric dimension.
    ///
    /// The two string dimensions have no numeric value and return their index.
    pub fn int_value(&self, dim: Dimension, index: usize) -> Result<i32> {
        self.check(dim, index)?;
        Ok(match dim {
            Dimension::OperatingSystem | Dimension::SwapDevice => index as i32,
            Dimension::Memory => self.memory[index],
            Dimension::Mapsize => self.mapsize[index],
            Dimension::Jobs => self.jobs[index],
            Dimension::Delay => self.delay[index],
            Dimension::Ratio => self.ratio[index],
            Dimension::Nice => self.nice[index],
        })
    }

    /// Textual value as it appears in documents and keys.
    pub fn value_label(&self, dim: Dimension, index: usize) -> Result<String> {
        self.check(dim, index)?;
        Ok(match dim {
            Dimension::OperatingSystem => self.kernels[index].clone(),
            Dimension::SwapDevice => self.devices[index].clone(),
            _ => self.int_value(dim, index)?.to_string(),
        })
    }

    /// Index of a value label, the reverse of [`value_label`](Self::value_label).
    pub fn index_of(&self, dim: Dimension, label: &str) -> Option<usize> {
        match dim {
            Dimension::OperatingSystem => self.kernels.iter().position(|k| k == label),
            Dimension::SwapDevice => self.devices.iter().position(|d| d == label),
            _ => {
                let value: i32 = label.trim().parse().ok()?;
                (0..self.cardinality(dim)).find(|&i| self.int_value(dim, i).ok() == Some(value))
            }
        }
    }
}
