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

//! Inputs that must be rejected or degrade gracefully.

use super::builders::{BenchmarkSetBuilder, ReportBuilder, SeriesBuilder};
use pmgraph_core::Access;

/// Texts that are not well-formed XML.
pub fn malformed_xml_samples() -> Vec<(&'static str, &'static str)> {
    vec![
        ("empty", ""),
        ("unclosed", "<benchmark_set><test_content>"),
        ("mismatched", "<pmbenchmark><report></pmbenchmark>"),
        ("text_only", "not xml at all"),
    ]
}

/// Series whose trials disagree in structure, as `(name, document)` pairs.
///
/// Each document holds a single series at map size 512, one job, delay 0,
/// ratio 50 and nice 19, which cannot be averaged.
pub fn inconsistent_series() -> Vec<(&'static str, String)> {
    let base = ReportBuilder::new();
    let doc = |second: ReportBuilder| {
        BenchmarkSetBuilder::new()
            .series(
                SeriesBuilder::new(512, 1, 0, 50, 19)
                    .trial(base.clone())
                    .trial(second),
            )
            .build()
    };
    vec![
        ("missing_write", doc(base.clone().without_histogram(Access::Write))),
        ("short_bucket0", doc(base.clone().short_bucket0())),
        ("missing_thread", doc(base.clone().skip_thread(1))),
    ]
}
