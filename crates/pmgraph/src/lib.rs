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

//! # PmGraph
//!
//! Aggregation and pivoting of pmbench results.
//!
//! pmbench writes one XML document per (kernel, swap device, memory) with
//! repeated trials for every point of the remaining parameter space. This
//! crate averages the trials of each point once, compares averages along
//! any one dimension and exports the comparisons as CSV or chart series.
//!
//! ## Quick Start
//!
//! ```rust
//! use pmgraph::{Dimension, Lookup, PivotMode, Session};
//! use pmgraph_test::fixtures;
//!
//! let mut session = Session::default();
//! let (name, xml) = fixtures::sample_result_set().remove(0);
//! session.insert_document("0_0_0", &name, xml)?;
//!
//! let Lookup::Found(id) = session.get_or_build("0_0_0", "0_0_0_1_0")? else {
//!     panic!("series exists");
//! };
//! assert_eq!(session.group(id).unwrap().trials_per_series(), 3);
//!
//! let key = session.build_pivot(id, PivotMode::Dimension(Dimension::Ratio))?;
//! assert_eq!(session.pivot(&key).unwrap().len(), 3);
//! # Ok::<(), pmgraph::Error>(())
//! ```
//!
//! ## Crates
//!
//! - `pmgraph-core`: data model, averaging, sibling groups, pivot tables
//! - `pmgraph-xml`: report parsing, document store, XML write-back
//! - `pmgraph-csv`: CSV export of pivot tables
//!
//! The most used types of each are re-exported here.

#![warn(missing_debug_implementations)]

pub mod bulk;
pub mod cache;
mod config;
mod error;
pub mod manual;
pub mod session;

pub use bulk::{mass_export, verify, BulkOutcome, VerifyOutcome};
pub use cache::{AggregateCache, PivotCache};
pub use config::{SessionConfig, MAX_FILE_SIZE_ENV};
pub use error::{Error, Result};
pub use manual::{ImportOutcome, ManualBench};
pub use session::{Lookup, Session};

pub use pmgraph_core::{
    average_trials, Access, CancellationToken, ChartArea, ChartSeries, Dimension,
    DimensionTables, GroupStats, ParamIndices, ParameterSet, PivotKey, PivotMode, PivotTable,
    Resolution, RuntimeStats, SiblingGroup, SiblingId, TrialData, TrialRef, TrialSlot,
    DEFAULT_ZONES,
};

/// Report parsing and write-back.
pub mod xml {
    pub use pmgraph_xml::{
        parse_single_report, write_report, DocumentStore, LoadSummary, SingleReport, XmlError,
    };
}

/// CSV export.
pub mod csv {
    pub use pmgraph_csv::{
        export_file_name, export_pivot, read_signature, CsvError, ExportConfig, Signature,
    };
}
