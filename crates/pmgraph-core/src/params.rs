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

//! Benchmark parameter sets.

use crate::dimension::{Dimension, DimensionTables};
use crate::error::Result;
use crate::key::ParamIndices;

/// Host platform of a report, which decides the memory field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Windows when the OS name mentions it or is unknown.
    pub fn detect(os_name: Option<&str>) -> Platform {
        match os_name {
            Some(name) if !name.contains("Windows") => Platform::Linux,
            _ => Platform::Windows,
        }
    }
}

/// Run options recorded in a report's `signature/params` block.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Benchmark duration in seconds.
    pub duration: i64,
    /// Map size in MiB as recorded by the run.
    pub mapsize: i64,
    /// Working set size in MiB.
    pub setsize: i64,
    /// Garbage initialization flag.
    pub initialize: i64,
    /// Access distribution shape.
    pub shape: f64,
    /// Delay in clocks.
    pub delay: i64,
    pub quiet: i64,
    /// Non-zero when the warmup phase was skipped.
    pub cold: i64,
    /// Number of threads.
    pub jobs: i64,
    pub offset: i64,
    /// Read percentage.
    pub ratio: i64,
    /// Access pattern name.
    pub pattern: String,
    /// Access method name.
    pub access: String,
    /// Timestamp source name.
    pub tsops: String,
    /// Extra allocation in MiB.
    pub xalloc_mib: i64,
    pub xalloc_path: String,
}

impl RunConfig {
    /// True when the run skipped warmup.
    pub fn is_cold(&self) -> bool {
        self.cold != 0
    }
}

/// The full identity of one benchmark series.
///
/// Dimension values are stored resolved. Series loaded from a result set
/// also keep their indices; manually imported reports have none.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSet {
    pub indices: Option<ParamIndices>,
    pub operating_system: String,
    pub swap_device: String,
    pub memory_mib: i32,
    pub mapsize_mib: i32,
    pub jobs: i32,
    pub delay: i32,
    pub ratio_percent: i32,
    pub nice: i32,
    pub run: RunConfig,
}

impl ParameterSet {
    /// Resolve a parameter set from dimension indices.
    pub fn from_indices(
        indices: ParamIndices,
        tables: &DimensionTables,
        run: RunConfig,
    ) -> Result<Self> {
        indices.validate(tables)?;
        Ok(Self {
            indices: Some(indices),
            operating_system: tables
                .value_label(Dimension::OperatingSystem, indices.get(Dimension::OperatingSystem))?,
            swap_device: tables.value_label(Dimension::SwapDevice, indices.get(Dimension::SwapDevice))?,
            memory_mib: tables.int_value(Dimension::Memory, indices.get(Dimension::Memory))?,
            mapsize_mib: tables.int_value(Dimension::Mapsize, indices.get(Dimension::Mapsize))?,
            jobs: tables.int_value(Dimension::Jobs, indices.get(Dimension::Jobs))?,
            delay: tables.int_value(Dimension::Delay, indices.get(Dimension::Delay))?,
            ratio_percent: tables.int_value(Dimension::Ratio, indices.get(Dimension::Ratio))?,
            nice: tables.int_value(Dimension::Nice, indices.get(Dimension::Nice))?,
            run,
        })
    }

    /// Parameter set of a standalone report, taken from its run options.
    pub fn from_run(operating_system: impl Into<String>, run: RunConfig) -> Self {
        Self {
            indices: None,
            operating_system: operating_system.into(),
            swap_device: String::new(),
            memory_mib: 0,
            mapsize_mib: run.mapsize as i32,
            jobs: run.jobs as i32,
            delay: run.delay as i32,
            ratio_percent: run.ratio as i32,
            nice: 0,
            run,
        }
    }

    /// Document key, when the set was resolved from indices.
    pub fn key1(&self) -> Option<String> {
        self.indices.map(|i| i.key1())
    }

    /// Series key within the document, when the set was resolved from indices.
    pub fn key2(&self) -> Option<String> {
        self.indices.map(|i| i.key2())
    }

    /// Platform derived from the OS name.
    pub fn platform(&self) -> Platform {
        let name = if self.operating_system.is_empty() {
            None
        } else {
            Some(self.operating_system.as_str())
        };
        Platform::detect(name)
    }

    /// Whether the series contains read accesses.
    pub fn has_read(&self) -> bool {
        self.ratio_percent > 0
    }

    /// Whether the series contains write accesses.
    pub fn has_write(&self) -> bool {
        self.ratio_percent < 100
    }

    /// Textual value of one dimension, as shown in exports.
    pub fn value_text(&self, dim: Dimension) -> String {
        match dim {
            Dimension::OperatingSystem => self.operating_system.clone(),
            Dimension::SwapDevice => self.swap_device.clone(),
            Dimension::Memory => format!("{}MiB", self.memory_mib),
            Dimension::Mapsize => format!("{}MiB", self.mapsize_mib),
            Dimension::Jobs => self.jobs.to_string(),
            Dimension::Delay => self.delay.to_string(),
            Dimension::Ratio => self.ratio_percent.to_string(),
            Dimension::Nice => self.nice.to_string(),
        }
    }

    /// One-line human readable description.
    pub fn readable(&self) -> String {
        format!(
            "{} {} {} MiB, with parameters -m {} -j {} -d {} -r {} -n {}",
            self.operating_system,
            self.swap_device,
            self.memory_mib,
            self.mapsize_mib,
            self.jobs,
            self.delay,
            self.ratio_percent,
            self.nice
        )
    }

    /// Location of the series node inside its result document.
    pub fn series_path(&self) -> String {
        format!(
            "/benchmark_set/test_content/test_mapsize[@iter='{}']/test_jobs[@iter='{}']/test_delay[@iter='{}']/test_ratio[@iter='{}']/test_nice[@iter='{}']",
            self.mapsize_mib, self.jobs, self.delay, self.ratio_percent, self.nice
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParameterSet {
        let tables = DimensionTables::default();
        let indices = ParamIndices::new([2, 1, 0, 3, 1, 0, 1, 2]);
        ParameterSet::from_indices(indices, &tables, RunConfig::default()).unwrap()
    }

    #[test]
    fn test_from_indices() {
        let p = sample();
        assert_eq!(p.operating_system, "Windows10_native");
        assert_eq!(p.swap_device, "NANDSSD");
        assert_eq!(p.memory_mib, 256);
        assert_eq!(p.mapsize_mib, 4096);
        assert_eq!(p.jobs, 8);
        assert_eq!(p.ratio_percent, 50);
        assert_eq!(p.nice, 0);
        assert_eq!(p.key1().as_deref(), Some("2_1_0"));
        assert_eq!(p.key2().as_deref(), Some("3_1_0_1_2"));
        assert_eq!(p.platform(), Platform::Windows);
        assert!(p.has_read() && p.has_write());
    }

    #[test]
    fn test_series_path() {
        assert_eq!(
            sample().series_path(),
            "/benchmark_set/test_content/test_mapsize[@iter='4096']/test_jobs[@iter='8']/test_delay[@iter='0']/test_ratio[@iter='50']/test_nice[@iter='0']"
        );
    }

    #[test]
    fn test_readable() {
        assert_eq!(
            sample().readable(),
            "Windows10_native NANDSSD 256 MiB, with parameters -m 4096 -j 8 -d 0 -r 50 -n 0"
        );
    }

    #[test]
    fn test_platform_detection() {
        assert_eq!(Platform::detect(Some("Fedora23_Xen")), Platform::Linux);
        assert_eq!(Platform::detect(Some("Windows10_Xen")), Platform::Windows);
        assert_eq!(Platform::detect(None), Platform::Windows);
    }

    #[test]
    fn test_from_run() {
        let run = RunConfig {
            mapsize: 1024,
            jobs: 2,
            ratio: 100,
            ..RunConfig::default()
        };
        let p = ParameterSet::from_run("Linux 4.2", run);
        assert!(p.indices.is_none());
        assert_eq!(p.mapsize_mib, 1024);
        assert!(p.has_read());
        assert!(!p.has_write());
        assert_eq!(p.platform(), Platform::Linux);
    }
}
