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

//! Core data model for pmbench result aggregation.
//!
//! This crate holds everything that does not touch a file format:
//!
//! - The parameter space: [`Dimension`], [`DimensionTables`], [`ParamIndices`]
//! - Typed report contents: [`TrialData`], [`Histogram`], [`MemorySnapshot`]
//! - The averaging engine: [`average_trials`]
//! - Sibling groups and their arena: [`SiblingGroup`], [`SiblingArena`]
//! - Pivot tables: [`PivotTable`]
//! - Chart series and runtime statistics: [`ChartSeries`], [`time_spent`]
//!
//! # Example
//!
//! ```rust
//! use pmgraph_core::{Dimension, DimensionTables, ParamIndices, ParameterSet, RunConfig};
//!
//! let tables = DimensionTables::default();
//! let indices = ParamIndices::from_keys("0_1_2", "3_0_1_2_0")?;
//! let params = ParameterSet::from_indices(indices, &tables, RunConfig::default())?;
//! assert_eq!(params.swap_device, "NANDSSD");
//! assert_eq!(tables.cardinality(Dimension::Ratio), 3);
//! # Ok::<(), pmgraph_core::PmError>(())
//! ```

#![warn(missing_debug_implementations)]

pub mod arena;
pub mod average;
pub mod cancel;
pub mod dimension;
pub mod error;
pub mod key;
pub mod params;
pub mod pivot;
pub mod report;
pub mod runtime;
pub mod series;
pub mod sibling;
pub mod stats;
pub mod trial;

pub use arena::{SiblingArena, SiblingId, TrialRef};
pub use average::average_trials;
pub use cancel::CancellationToken;
pub use dimension::{Dimension, DimensionTables, PivotMode};
pub use error::{PmError, Result};
pub use key::{IndexProduct, ParamIndices, PivotKey, SeriesKey};
pub use params::{ParameterSet, Platform, RunConfig};
pub use pivot::{dimension_label, DeletionOutcome, PivotTable};
pub use report::{
    phase_label, Access, Bucket, Histogram, LowBucket, MemoryFields, MemorySnapshot,
    ThreadResult, TrialData,
};
pub use runtime::{runtime_stats, time_spent, RuntimeItem, RuntimeStats, DEFAULT_ZONES};
pub use series::{
    series_name, series_points, ChartArea, ChartSeries, Resolution, SeriesPoint, COARSE_POINTS,
    FINE_POINTS,
};
pub use sibling::{SiblingGroup, TrialSlot};
pub use stats::{GroupStats, Spike};
pub use trial::{SeriesState, TrialRecord};
