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

//! Pivot tables: ordered trial collections compared side by side.
//!
//! A pivot table fixes a base parameter set and varies one dimension (or
//! lists one series' raw trials). Its entries, the cronies, are
//! non-owning [`TrialRef`]s into a [`SiblingArena`].

use crate::arena::{SiblingArena, SiblingId, TrialRef};
use crate::dimension::{Dimension, DimensionTables, PivotMode};
use crate::error::{PmError, Result};
use crate::key::{ParamIndices, PivotKey};
use crate::params::ParameterSet;
use crate::report::Access;
use crate::sibling::{SiblingGroup, TrialSlot};
use std::collections::HashSet;
use tracing::debug;

/// Series counts affected by [`PivotTable::delete_selected`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletionOutcome {
    /// Number of series deleted.
    pub deleted_series: usize,
    /// Trials that lost their last series and left the table.
    pub dead: Vec<TrialRef>,
}

/// An ordered comparison of trials.
#[derive(Debug, Clone)]
pub struct PivotTable {
    key: PivotKey,
    mode: PivotMode,
    base: Option<ParameterSet>,
    cronies: Vec<TrialRef>,
    selection: HashSet<(TrialRef, Access)>,
}

impl PivotTable {
    /// The raw trials of one group followed by its average.
    pub fn for_trials(base: &SiblingGroup) -> Self {
        let key = match base.params().indices {
            Some(indices) => PivotKey::new(&indices, PivotMode::Trials),
            None => PivotKey(format!("trials:{}", base.id())),
        };
        Self {
            key,
            mode: PivotMode::Trials,
            base: Some(base.params().clone()),
            cronies: base
                .slots()
                .into_iter()
                .map(|slot| TrialRef {
                    group: base.id(),
                    slot,
                })
                .collect(),
            selection: HashSet::new(),
        }
    }

    /// The averages of every series that differs from `base` only along `dim`.
    ///
    /// `lookup` resolves an index tuple to a group; tuples it cannot resolve
    /// are skipped. Cronies follow the dimension's value order.
    pub fn for_dimension<F>(
        base: &ParameterSet,
        dim: Dimension,
        tables: &DimensionTables,
        mut lookup: F,
    ) -> Result<Self>
    where
        F: FnMut(ParamIndices) -> Option<SiblingId>,
    {
        let indices = base.indices.ok_or_else(|| {
            PmError::malformed_key(base.readable(), "series has no dimension indices")
        })?;
        indices.validate(tables)?;

        let mut cronies = Vec::new();
        for value in 0..tables.cardinality(dim) {
            let point = indices.with(dim, value);
            match lookup(point) {
                Some(group) => cronies.push(TrialRef::average(group)),
                None => debug!(series = %point, "no series for pivot position, skipping"),
            }
        }
        let mode = PivotMode::Dimension(dim);
        Ok(Self {
            key: PivotKey::new(&indices, mode),
            mode,
            base: Some(base.clone()),
            cronies,
            selection: HashSet::new(),
        })
    }

    /// Manually assembled table.
    pub fn manual(cronies: Vec<TrialRef>) -> Self {
        Self {
            key: PivotKey::manual(),
            mode: PivotMode::Manual,
            base: None,
            cronies,
            selection: HashSet::new(),
        }
    }

    pub fn key(&self) -> &PivotKey {
        &self.key
    }

    pub fn mode(&self) -> PivotMode {
        self.mode
    }

    /// Parameters the table was built around; `None` for manual tables.
    pub fn base(&self) -> Option<&ParameterSet> {
        self.base.as_ref()
    }

    pub fn cronies(&self) -> &[TrialRef] {
        &self.cronies
    }

    pub fn len(&self) -> usize {
        self.cronies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cronies.is_empty()
    }

    pub fn contains_group(&self, group: SiblingId) -> bool {
        self.cronies.iter().any(|c| c.group == group)
    }

    /// Append a trial to a manual table.
    pub fn push(&mut self, crony: TrialRef) {
        if !self.cronies.contains(&crony) {
            self.cronies.push(crony);
        }
    }

    /// Header label of a crony, as used in exports and series names.
    pub fn label(&self, arena: &SiblingArena, crony: TrialRef) -> Option<String> {
        let (params, record) = arena.resolve(crony)?;
        let slot_label = || match crony.slot {
            TrialSlot::Average => "Average".to_string(),
            TrialSlot::Raw(i) => format!("Trial {}", i),
        };
        Some(match self.mode {
            PivotMode::Trials => slot_label(),
            PivotMode::Manual => record
                .custom_name()
                .map(str::to_string)
                .unwrap_or_else(slot_label),
            PivotMode::Dimension(dim) => dimension_label(params, dim),
        })
    }

    /// Select or deselect one series.
    pub fn set_selected(&mut self, crony: TrialRef, access: Access, selected: bool) {
        if selected {
            self.selection.insert((crony, access));
        } else {
            self.selection.remove(&(crony, access));
        }
    }

    /// Toggle a series together with its partner of the other access type.
    pub fn toggle_pair(&mut self, arena: &SiblingArena, crony: TrialRef) {
        let any = Access::BOTH
            .iter()
            .any(|&a| self.selection.contains(&(crony, a)));
        for access in Access::BOTH {
            let exists = arena
                .resolve(crony)
                .map_or(false, |(_, r)| r.has_series(access));
            self.set_selected(crony, access, !any && exists);
        }
    }

    /// Select every existing series of every crony.
    pub fn select_all(&mut self, arena: &SiblingArena) {
        for &crony in &self.cronies {
            if let Some((_, record)) = arena.resolve(crony) {
                for access in Access::BOTH {
                    if record.has_series(access) {
                        self.selection.insert((crony, access));
                    }
                }
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_selected(&self, crony: TrialRef, access: Access) -> bool {
        self.selection.contains(&(crony, access))
    }

    /// Delete the selected series.
    ///
    /// Trials that lose their last series leave the table; dead raw trials
    /// are also dropped from their group.
    pub fn delete_selected(&mut self, arena: &mut SiblingArena) -> DeletionOutcome {
        let mut outcome = DeletionOutcome::default();
        let mut touched: Vec<TrialRef> = Vec::new();
        for &(crony, access) in &self.selection {
            if let Some(record) = arena.resolve_mut(crony) {
                if record.flag_for_deletion(access) && !touched.contains(&crony) {
                    touched.push(crony);
                }
            }
        }
        self.selection.clear();

        for crony in touched {
            let Some(record) = arena.resolve_mut(crony) else {
                continue;
            };
            outcome.deleted_series += record.apply_deletions();
            if record.is_dead() {
                outcome.dead.push(crony);
            }
        }

        self.cronies.retain(|c| !outcome.dead.contains(c));
        for dead in &outcome.dead {
            if let (TrialSlot::Raw(_), Some(group)) = (dead.slot, arena.get_mut(dead.group)) {
                group.remove_dead_trials();
            }
        }
        outcome
    }

    /// Remove every crony of a group, for instance after the group was evicted.
    pub fn forget_group(&mut self, group: SiblingId) {
        self.cronies.retain(|c| c.group != group);
        self.selection.retain(|(c, _)| c.group != group);
    }
}

/// Label of a series inside a table that varies `dim`.
pub fn dimension_label(params: &ParameterSet, dim: Dimension) -> String {
    match dim {
        Dimension::OperatingSystem => params.operating_system.clone(),
        Dimension::SwapDevice => params.swap_device.clone(),
        Dimension::Memory => format!("{} memory", params.memory_mib),
        Dimension::Mapsize => format!("{} map", params.mapsize_mib),
        Dimension::Jobs => params.jobs.to_string(),
        Dimension::Delay => match params.delay {
            0 => "None".to_string(),
            d => format!("{} clk", d),
        },
        Dimension::Ratio => match params.ratio_percent {
            0 => "Write-only".to_string(),
            100 => "Read-only".to_string(),
            r => format!("{}%", r),
        },
        Dimension::Nice => params.nice.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RunConfig;
    use crate::report::{Histogram, ThreadResult, TrialData};

    fn data(latency: f64) -> TrialData {
        TrialData {
            threads: vec![ThreadResult {
                thread_num: 1,
                latency_us: latency,
                ..ThreadResult::default()
            }],
            read: Some(Histogram::new(Access::Read)),
            write: Some(Histogram::new(Access::Write)),
            memory: Vec::new(),
        }
    }

    fn insert(arena: &mut SiblingArena, indices: ParamIndices, trials: usize) -> SiblingId {
        let tables = DimensionTables::default();
        let params = ParameterSet::from_indices(indices, &tables, RunConfig::default()).unwrap();
        let group = SiblingGroup::build(
            arena.next_id(),
            params,
            (0..trials).map(|i| data(i as f64)).collect(),
        )
        .unwrap();
        arena.insert(group)
    }

    // Ratio index 1 (50%) so both histograms are expected.
    const BASE: [usize; 8] = [0, 0, 0, 1, 0, 0, 1, 2];

    #[test]
    fn test_trials_table() {
        let mut arena = SiblingArena::new();
        let id = insert(&mut arena, ParamIndices::new(BASE), 3);
        let table = PivotTable::for_trials(arena.get(id).unwrap());
        assert_eq!(table.len(), 4);
        assert_eq!(table.key().0, "trials:0_0_0_1_0_0_1_2");
        let labels: Vec<_> = table
            .cronies()
            .iter()
            .map(|&c| table.label(&arena, c).unwrap())
            .collect();
        assert_eq!(labels, ["Trial 1", "Trial 2", "Trial 3", "Average"]);
    }

    #[test]
    fn test_dimension_table_skips_missing() {
        let mut arena = SiblingArena::new();
        let tables = DimensionTables::default();
        let base = ParamIndices::new(BASE);
        let mut found = std::collections::HashMap::new();
        for os in [0usize, 2] {
            let idx = base.with(Dimension::OperatingSystem, os);
            found.insert(idx, insert(&mut arena, idx, 1));
        }
        let base_params = arena.get(found[&base]).unwrap().params().clone();
        let table = PivotTable::for_dimension(
            &base_params,
            Dimension::OperatingSystem,
            &tables,
            |idx| found.get(&idx).copied(),
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.len() <= tables.cardinality(Dimension::OperatingSystem));
        assert_eq!(table.key().0, "*_0_0_1_0_0_1_2");
        assert_eq!(
            table.label(&arena, table.cronies()[1]).as_deref(),
            Some("Windows10_native")
        );
    }

    #[test]
    fn test_dimension_table_requires_indices() {
        let params = ParameterSet::from_run("x", RunConfig::default());
        let result = PivotTable::for_dimension(
            &params,
            Dimension::Jobs,
            &DimensionTables::default(),
            |_| None,
        );
        assert!(matches!(result, Err(PmError::MalformedKey { .. })));
    }

    #[test]
    fn test_labels() {
        let tables = DimensionTables::default();
        let params = ParameterSet::from_indices(
            ParamIndices::new([1, 2, 3, 4, 1, 1, 2, 0]),
            &tables,
            RunConfig::default(),
        )
        .unwrap();
        assert_eq!(dimension_label(&params, Dimension::Memory), "2048 memory");
        assert_eq!(dimension_label(&params, Dimension::Mapsize), "8192 map");
        assert_eq!(dimension_label(&params, Dimension::Delay), "1000 clk");
        assert_eq!(dimension_label(&params, Dimension::Ratio), "Read-only");
        assert_eq!(dimension_label(&params, Dimension::SwapDevice), "RAMDISK");
        assert_eq!(dimension_label(&params, Dimension::Nice), "19");
    }

    #[test]
    fn test_delete_selected() {
        let mut arena = SiblingArena::new();
        let id = insert(&mut arena, ParamIndices::new(BASE), 2);
        let mut table = PivotTable::for_trials(arena.get(id).unwrap());
        let first = TrialRef::raw(id, 1);

        table.toggle_pair(&arena, first);
        assert_eq!(table.selection_count(), 2);
        table.set_selected(TrialRef::raw(id, 2), Access::Read, true);

        let outcome = table.delete_selected(&mut arena);
        assert_eq!(outcome.deleted_series, 3);
        assert_eq!(outcome.dead, vec![first]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.selection_count(), 0);
        assert_eq!(arena.get(id).unwrap().trials().len(), 1);

        // The remaining trial keeps its write series.
        let (_, rest) = arena.resolve(TrialRef::raw(id, 2)).unwrap();
        assert!(rest.has_series(Access::Write));
        assert!(!rest.has_series(Access::Read));

        table.select_all(&arena);
        assert_eq!(table.selection_count(), 3);
    }
}
