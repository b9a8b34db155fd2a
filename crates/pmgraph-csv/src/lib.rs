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

//! CSV export of pivot tables.
//!
//! A pivot table is written as one multi-table CSV file: the signature,
//! per-trial thread tables, latency histograms side by side and memory
//! snapshots. Exported files are named after their signature, with `all`
//! standing in for the varying dimension.
//!
//! # Features
//!
//! - **Two resolutions**: one row per bucket, or one row per hex sub-bucket
//! - **Configurable**: custom field delimiter
//! - **Signature read-back**: [`read_signature`] recovers the dimension
//!   values of an exported file
//!
//! # Examples
//!
//! ```no_run
//! use pmgraph_core::{PivotTable, SiblingArena};
//! use pmgraph_csv::{export_to_dir, ExportConfig};
//! use std::path::Path;
//!
//! # fn run(table: &PivotTable, arena: &SiblingArena) -> pmgraph_csv::Result<()> {
//! let path = export_to_dir(table, arena, Path::new("out"), &ExportConfig::default())?;
//! println!("wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_debug_implementations)]

mod error;
mod from_csv;
mod to_csv;

pub use error::{CsvError, Result};
pub use from_csv::{read_signature, Signature};
pub use to_csv::{
    export_file_name, export_pivot, export_pivot_to_path, export_pivot_to_string, export_to_dir,
    ExportConfig, LINUX_MEMORY_HEADERS,
};
