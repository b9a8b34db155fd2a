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

//! The session object every entry point works on.
//!
//! A [`Session`] owns the loaded documents, the sibling group arena and the
//! aggregate and pivot caches. Nothing is global: two sessions never share
//! state.

use crate::cache::{AggregateCache, PivotCache};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::manual::ManualBench;
use pmgraph_core::{
    runtime_stats, Access, CancellationToken, ChartArea, ChartSeries, DimensionTables, GroupStats,
    Histogram, ParamIndices, ParameterSet, PivotKey, PivotMode, PivotTable, PmError, RunConfig,
    RuntimeStats, SiblingArena, SiblingGroup, SiblingId, TrialRef, TrialSlot,
};
use pmgraph_csv::ExportConfig;
use pmgraph_xml::{DocumentStore, LoadSummary};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of [`Session::get_or_build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The group exists, built now or earlier.
    Found(SiblingId),
    /// No document or no series for the keys.
    Missing,
    /// The series exists but has no valid average.
    Invalid,
}

impl Lookup {
    pub fn found(self) -> Option<SiblingId> {
        match self {
            Lookup::Found(id) => Some(id),
            _ => None,
        }
    }
}

/// Loaded documents plus everything computed from them.
#[derive(Debug)]
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) store: DocumentStore,
    pub(crate) arena: SiblingArena,
    pub(crate) aggregates: AggregateCache,
    pub(crate) pivots: PivotCache,
    pub(crate) manual: ManualBench,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            store: DocumentStore::new(config.max_file_size),
            config,
            arena: SiblingArena::new(),
            aggregates: AggregateCache::new(),
            pivots: PivotCache::new(),
            manual: ManualBench::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tables(&self) -> &DimensionTables {
        &self.config.tables
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn arena(&self) -> &SiblingArena {
        &self.arena
    }

    pub fn aggregates(&self) -> &AggregateCache {
        &self.aggregates
    }

    pub fn pivots(&self) -> &PivotCache {
        &self.pivots
    }

    /// Load every result document of a folder.
    ///
    /// Groups built from a document that gets replaced are evicted.
    pub fn load_folder(&mut self, dir: &Path, token: &CancellationToken) -> Result<LoadSummary> {
        let summary = self.store.load_folder(dir, &self.config.tables, token)?;
        for key1 in &summary.loaded {
            self.forget_document(key1);
        }
        info!(
            dir = %dir.display(),
            loaded = summary.loaded.len(),
            failed = summary.failed.len(),
            "result folder loaded"
        );
        Ok(summary)
    }

    /// Register a result document under `key1`.
    pub fn insert_document(&mut self, key1: &str, name: &str, text: String) -> Result<usize> {
        ParamIndices::from_keys(key1, "0_0_0_0_0")?;
        let series = self.store.insert(key1, name, text)?;
        self.forget_document(key1);
        Ok(series)
    }

    fn forget_document(&mut self, key1: &str) {
        for id in self.aggregates.remove_document(key1) {
            self.pivots.evict_group(id, None);
            self.arena.remove(id);
        }
    }

    /// The sibling group of a series, building and caching it on first use.
    ///
    /// Keys that do not decode, or whose indices fall outside the dimension
    /// tables, are errors. Absent data is [`Lookup::Missing`]; a series whose
    /// trials cannot be averaged is [`Lookup::Invalid`] and is logged once.
    pub fn get_or_build(&mut self, key1: &str, key2: &str) -> Result<Lookup> {
        if let Some(id) = self.aggregates.get(key1, key2) {
            return Ok(Lookup::Found(id));
        }
        let indices = ParamIndices::from_keys(key1, key2)?;
        let lookup = ParameterSet::from_indices(indices, &self.config.tables, RunConfig::default())?;
        if self.aggregates.is_invalid(key1, key2) {
            return Ok(Lookup::Invalid);
        }

        let extract = match self.store.extract(key1, &lookup) {
            Ok(Some(extract)) => extract,
            Ok(None) => {
                debug!(key1, key2, "no series");
                return Ok(Lookup::Missing);
            }
            Err(e) => return self.reject(key1, key2, e.into()),
        };
        if extract.failures > 0 {
            warn!(
                key1,
                key2,
                failures = extract.failures,
                "unreadable numeric fields read as zero"
            );
        }

        let params = ParameterSet {
            run: extract.run,
            ..lookup
        };
        let id = self.arena.next_id();
        match SiblingGroup::build(id, params, extract.trials) {
            Ok(group) => {
                let trials = group.trials_per_series();
                let id = self.arena.insert(group);
                self.aggregates.insert(key1, key2, id);
                debug!(key1, key2, group = %id, trials, "built sibling group");
                Ok(Lookup::Found(id))
            }
            Err(e) => self.reject(key1, key2, e.into()),
        }
    }

    fn reject(&mut self, key1: &str, key2: &str, error: Error) -> Result<Lookup> {
        if error.is_data_error() {
            warn!(key1, key2, %error, "series has no valid average");
            self.aggregates.mark_invalid(key1, key2);
            Ok(Lookup::Invalid)
        } else {
            Err(error)
        }
    }

    pub fn group(&self, id: SiblingId) -> Option<&SiblingGroup> {
        self.arena.get(id)
    }

    pub fn stats(&self, id: SiblingId) -> Option<&GroupStats> {
        self.arena.get(id).map(SiblingGroup::stats)
    }

    /// Build (or reuse) the pivot table of `mode` around a group.
    ///
    /// Dimension pivots look up every value of the varying dimension and
    /// skip the ones without a valid group.
    pub fn build_pivot(&mut self, base: SiblingId, mode: PivotMode) -> Result<PivotKey> {
        let group = self.arena.get(base).ok_or(Error::UnknownGroup(base))?;
        let table = match mode {
            PivotMode::Manual => return Ok(self.manual_pivot()),
            PivotMode::Trials => {
                let table = PivotTable::for_trials(group);
                if self.pivots.contains(table.key()) {
                    return Ok(table.key().clone());
                }
                table
            }
            PivotMode::Dimension(dim) => {
                let params = group.params().clone();
                let indices = params.indices.ok_or_else(|| {
                    PmError::malformed_key(params.readable(), "series has no dimension indices")
                })?;
                let key = PivotKey::new(&indices, mode);
                if self.pivots.contains(&key) {
                    return Ok(key);
                }
                let mut found = HashMap::new();
                for value in 0..self.config.tables.cardinality(dim) {
                    let point = indices.with(dim, value);
                    if let Lookup::Found(id) = self.get_or_build(&point.key1(), &point.key2())? {
                        found.insert(point, id);
                    }
                }
                PivotTable::for_dimension(&params, dim, &self.config.tables, |point| {
                    found.get(&point).copied()
                })?
            }
        };
        debug!(table = %table.key(), cronies = table.len(), "built pivot table");
        Ok(self.pivots.insert(table))
    }

    /// Pivot table of `mode` around the series `(key1, key2)`.
    ///
    /// `None` when the base series is missing or invalid.
    pub fn pivot_at(&mut self, key1: &str, key2: &str, mode: PivotMode) -> Result<Option<PivotKey>> {
        if mode == PivotMode::Manual {
            return Ok(Some(self.manual_pivot()));
        }
        match self.get_or_build(key1, key2)? {
            Lookup::Found(id) => self.build_pivot(id, mode).map(Some),
            Lookup::Missing | Lookup::Invalid => Ok(None),
        }
    }

    pub fn pivot(&self, key: &PivotKey) -> Option<&PivotTable> {
        self.pivots.get(key)
    }

    fn table(&self, key: &PivotKey) -> Result<&PivotTable> {
        self.pivots
            .get(key)
            .ok_or_else(|| Error::UnknownPivot(key.clone()))
    }

    fn table_mut(&mut self, key: &PivotKey) -> Result<&mut PivotTable> {
        self.pivots
            .get_mut(key)
            .ok_or_else(|| Error::UnknownPivot(key.clone()))
    }

    /// Drop a cached pivot table; it is rebuilt on the next request.
    pub fn release_pivot(&mut self, key: &PivotKey) -> bool {
        self.pivots.remove(key).is_some()
    }

    /// Export a cached table as `<dir>/<signature>.csv`.
    pub fn export_pivot(&self, key: &PivotKey, dir: &Path, config: &ExportConfig) -> Result<PathBuf> {
        let path = pmgraph_csv::export_to_dir(self.table(key)?, &self.arena, dir, config)?;
        Ok(path)
    }

    /// Export a cached table to an explicit path.
    pub fn export_pivot_to_path(
        &self,
        key: &PivotKey,
        path: &Path,
        config: &ExportConfig,
    ) -> Result<()> {
        pmgraph_csv::export_pivot_to_path(self.table(key)?, &self.arena, path, config)?;
        Ok(())
    }

    /// Histograms of every existing series of a table, with their crony labels.
    fn histograms(&self, key: &PivotKey) -> Result<Vec<(String, &Histogram)>> {
        let table = self.table(key)?;
        let mut out = Vec::new();
        for &crony in table.cronies() {
            let (Some(label), Some((_, record))) =
                (table.label(&self.arena, crony), self.arena.resolve(crony))
            else {
                continue;
            };
            for access in Access::BOTH {
                if !record.has_series(access) {
                    continue;
                }
                if let Some(histogram) = record.data().histogram(access) {
                    out.push((label.clone(), histogram));
                }
            }
        }
        Ok(out)
    }

    /// Chart series of every existing series of a table.
    pub fn chart_series(&self, key: &PivotKey, area: ChartArea) -> Result<Vec<ChartSeries>> {
        Ok(self
            .histograms(key)?
            .into_iter()
            .map(|(label, histogram)| ChartSeries::build(&label, histogram, area))
            .collect())
    }

    /// Time spent per latency zone by every series of a table.
    pub fn runtime_stats(&self, key: &PivotKey, zones: &[f64]) -> Result<RuntimeStats> {
        let histograms = self.histograms(key)?;
        Ok(runtime_stats(
            histograms
                .iter()
                .map(|(label, h)| (label.as_str(), h.access, *h)),
            zones,
        ))
    }

    pub fn set_selected(
        &mut self,
        key: &PivotKey,
        crony: TrialRef,
        access: Access,
        selected: bool,
    ) -> Result<()> {
        self.table_mut(key)?.set_selected(crony, access, selected);
        Ok(())
    }

    /// Toggle both series of a crony.
    pub fn toggle_pair(&mut self, key: &PivotKey, crony: TrialRef) -> Result<()> {
        let table = self
            .pivots
            .get_mut(key)
            .ok_or_else(|| Error::UnknownPivot(key.clone()))?;
        table.toggle_pair(&self.arena, crony);
        Ok(())
    }

    pub fn select_all(&mut self, key: &PivotKey) -> Result<()> {
        let table = self
            .pivots
            .get_mut(key)
            .ok_or_else(|| Error::UnknownPivot(key.clone()))?;
        table.select_all(&self.arena);
        Ok(())
    }

    pub fn clear_selection(&mut self, key: &PivotKey) -> Result<()> {
        self.table_mut(key)?.clear_selection();
        Ok(())
    }

    /// Delete the selected series of a table and return how many went.
    ///
    /// Only the entries touched by the deletion are evicted: other tables
    /// listing a changed group, and the aggregate of a group whose average
    /// died. Such a group leaves the arena together with its remaining raw
    /// trials, so the next lookup rebuilds it from the document.
    pub fn delete_selected(&mut self, key: &PivotKey) -> Result<usize> {
        let table = self
            .pivots
            .get_mut(key)
            .ok_or_else(|| Error::UnknownPivot(key.clone()))?;
        let outcome = table.delete_selected(&mut self.arena);

        for dead in &outcome.dead {
            let evicted = self.pivots.evict_group(dead.group, Some(key));
            if !evicted.is_empty() {
                debug!(group = %dead.group, tables = evicted.len(), "evicted pivot tables");
            }
            if dead.slot != TrialSlot::Average {
                continue;
            }
            if let Some((key1, key2)) = self.aggregates.remove_group(dead.group) {
                debug!(key1 = %key1, key2 = %key2, "evicted aggregate");
            }
            self.drop_group(key, dead.group);
        }
        info!(
            table = %key,
            series = outcome.deleted_series,
            trials = outcome.dead.len(),
            "deleted series"
        );
        Ok(outcome.deleted_series)
    }

    fn drop_group(&mut self, key: &PivotKey, group: SiblingId) {
        if self.arena.remove(group).is_some() {
            debug!(group = %group, "dropped sibling group");
        }
        if let Some(table) = self.pivots.get_mut(key) {
            table.forget_group(group);
        }
    }
}
