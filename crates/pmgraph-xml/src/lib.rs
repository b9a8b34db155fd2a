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

//! pmbench XML input and output
//!
//! Reads the two document kinds pmbench produces and writes reports back:
//!
//! - **Result sets** (`<benchmark_set>`): many series, each with several
//!   trials, stored per (kernel, device, memory) in a [`DocumentStore`]
//! - **Single reports** (`<pmbenchmark>`): one trial, read with
//!   [`parse_single_report`]
//! - **Write-back**: [`write_report`] serializes any trial, including a
//!   synthesized average, as a single report
//!
//! Numeric fields are read leniently through [`SafeXml`]: an unreadable
//! value becomes zero, is logged and counted.
//!
//! # Examples
//!
//! ```rust
//! use pmgraph_core::{DimensionTables, ParamIndices, ParameterSet, RunConfig};
//! use pmgraph_xml::DocumentStore;
//!
//! let xml = r#"<benchmark_set><test_content>
//!   <test_mapsize iter="512"><test_jobs iter="1"><test_delay iter="0">
//!   <test_ratio iter="50"><test_nice iter="19">
//!     <test_round iter="1"><pmbenchmark><report/></pmbenchmark></test_round>
//!   </test_nice></test_ratio></test_delay></test_jobs></test_mapsize>
//! </test_content></benchmark_set>"#;
//!
//! let mut store = DocumentStore::default();
//! assert_eq!(store.insert("0_0_0", "example.xml", xml.to_string())?, 1);
//!
//! let indices = ParamIndices::from_keys("0_0_0", "0_0_0_1_0")?;
//! let params = ParameterSet::from_indices(indices, &DimensionTables::default(), RunConfig::default())?;
//! let series = store.extract("0_0_0", &params)?.expect("series exists");
//! assert_eq!(series.trials.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_debug_implementations)]

pub mod accessor;
mod error;
pub mod import;
pub mod report;
pub mod store;
pub mod to_xml;

pub use accessor::{select_node, select_nodes, SafeXml};
pub use error::{Result, XmlError};
pub use import::{parse_single_report, SingleReport};
pub use report::{parse_histogram, parse_memory, parse_run_config, parse_trial};
pub use store::{
    extract_series, result_file_name, DocumentStore, LoadSummary, SeriesAddress, SeriesExtract,
    DEFAULT_MAX_FILE_SIZE,
};
pub use to_xml::write_report;
