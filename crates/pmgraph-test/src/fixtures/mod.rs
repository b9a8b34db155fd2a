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

//! Canned pmbench result sets.
//!
//! [`sample_result_set`] covers two documents of the default dimension
//! tables:
//!
//! - `0_0_0` (`Fedora23_native`, `chatham`, 256 MiB, Linux counters)
//! - `2_0_0` (`Windows10_native`, `chatham`, 256 MiB, Windows counters)
//!
//! Both hold the same series layout at map size 512, delay 0, nice 19:
//!
//! | jobs | ratio | trials (scales)   |
//! |------|-------|-------------------|
//! | 1    | 0     | 1, 2, 6           |
//! | 1    | 50    | 1, 2, 6           |
//! | 1    | 100   | 1, 2, 6           |
//! | 8    | 50    | 2                 |
//!
//! The Linux document additionally has a broken series at jobs 1,
//! ratio 50, nice -20 whose second trial lacks its write histogram.

pub mod builders;
pub mod errors;

use builders::{BenchmarkSetBuilder, ReportBuilder, SeriesBuilder};
use pmgraph_core::{Access, Platform};

/// Trial scales of the three-trial series; their mean is 3.
pub const SCALES: [f64; 3] = [1.0, 2.0, 6.0];

/// File name of a result document.
pub fn result_file_name(kernel: &str, device: &str, memory: i32) -> String {
    format!("results_{}_{}_{}_final.xml", kernel, device, memory)
}

fn standard_set(template: &ReportBuilder) -> BenchmarkSetBuilder {
    let mut set = BenchmarkSetBuilder::new();
    for ratio in [0, 50, 100] {
        set = set.series(SeriesBuilder::new(512, 1, 0, ratio, 19).trials(template, &SCALES));
    }
    set.series(SeriesBuilder::new(512, 8, 0, 50, 19).trials(template, &[2.0]))
}

/// The Linux result document `0_0_0`.
pub fn linux_document() -> String {
    let template = ReportBuilder::new();
    standard_set(&template)
        .series(
            SeriesBuilder::new(512, 1, 0, 50, -20)
                .trial(template.clone())
                .trial(template.clone().without_histogram(Access::Write)),
        )
        .build()
}

/// The Windows result document `2_0_0`.
pub fn windows_document() -> String {
    standard_set(&ReportBuilder::new().platform(Platform::Windows)).build()
}

/// `(file name, xml)` pairs of the sample result set.
pub fn sample_result_set() -> Vec<(String, String)> {
    vec![
        (
            result_file_name("Fedora23_native", "chatham", 256),
            linux_document(),
        ),
        (
            result_file_name("Windows10_native", "chatham", 256),
            windows_document(),
        ),
    ]
}

/// Write the sample result set into a directory.
pub fn write_sample_result_set(dir: &std::path::Path) -> std::io::Result<()> {
    for (name, xml) in sample_result_set() {
        std::fs::write(dir.join(name), xml)?;
    }
    Ok(())
}

/// A standalone report, as produced by one pmbench invocation.
pub fn single_report(scale: f64) -> String {
    ReportBuilder::new().jobs(2).scale(scale).document()
}
