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

//! Shared test fixtures for the pmgraph crates.
//!
//! # Quick Start
//!
//! ```rust
//! use pmgraph_test::fixtures;
//!
//! // A complete two-document result set
//! for (file_name, xml) in fixtures::sample_result_set() {
//!     assert!(file_name.ends_with("_final.xml"));
//!     assert!(xml.contains("<benchmark_set>"));
//! }
//!
//! // Custom documents
//! use pmgraph_test::fixtures::builders::{BenchmarkSetBuilder, ReportBuilder, SeriesBuilder};
//!
//! let xml = BenchmarkSetBuilder::new()
//!     .series(SeriesBuilder::new(1024, 8, 1000, 100, 0).trials(&ReportBuilder::new(), &[1.0, 3.0]))
//!     .build();
//! ```

pub mod fixtures;

pub use fixtures::builders::{BenchmarkSetBuilder, ReportBuilder, SeriesBuilder};

/// Absolute difference check for averaged floating point values.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
