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

//! Session caches.
//!
//! [`AggregateCache`] maps a series key pair to its sibling group and
//! [`PivotCache`] holds built pivot tables. Entries are only added after a
//! successful build and only removed explicitly, one entry at a time.

use pmgraph_core::{PivotKey, PivotTable, SiblingId};
use std::collections::{HashMap, HashSet};

/// `(key1, key2)` pair addressing one series.
pub type SeriesKeys = (String, String);

/// Sibling groups built so far, by series keys.
#[derive(Debug, Default)]
pub struct AggregateCache {
    groups: HashMap<SeriesKeys, SiblingId>,
    invalid: HashSet<SeriesKeys>,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key1: &str, key2: &str) -> Option<SiblingId> {
        self.groups
            .get(&(key1.to_string(), key2.to_string()))
            .copied()
    }

    pub fn insert(&mut self, key1: &str, key2: &str, id: SiblingId) {
        let keys = (key1.to_string(), key2.to_string());
        self.invalid.remove(&keys);
        self.groups.insert(keys, id);
    }

    /// Remember a series that exists but cannot be averaged.
    pub fn mark_invalid(&mut self, key1: &str, key2: &str) {
        self.invalid.insert((key1.to_string(), key2.to_string()));
    }

    pub fn is_invalid(&self, key1: &str, key2: &str) -> bool {
        self.invalid
            .contains(&(key1.to_string(), key2.to_string()))
    }

    /// Keys of every series known to be unusable, sorted.
    pub fn invalid_keys(&self) -> Vec<&SeriesKeys> {
        let mut keys: Vec<&SeriesKeys> = self.invalid.iter().collect();
        keys.sort();
        keys
    }

    pub fn remove(&mut self, key1: &str, key2: &str) -> Option<SiblingId> {
        self.groups.remove(&(key1.to_string(), key2.to_string()))
    }

    /// Drop the entry pointing at `id`, returning its keys.
    pub fn remove_group(&mut self, id: SiblingId) -> Option<SeriesKeys> {
        let keys = self
            .groups
            .iter()
            .find(|(_, group)| **group == id)
            .map(|(keys, _)| keys.clone())?;
        self.groups.remove(&keys);
        Some(keys)
    }

    /// Drop every entry of documents with this `key1`.
    pub fn remove_document(&mut self, key1: &str) -> Vec<SiblingId> {
        let mut removed = Vec::new();
        self.groups.retain(|(k1, _), id| {
            if k1 == key1 {
                removed.push(*id);
                false
            } else {
                true
            }
        });
        self.invalid.retain(|(k1, _)| k1 != key1);
        removed
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Built pivot tables by key.
#[derive(Debug, Default)]
pub struct PivotCache {
    tables: HashMap<PivotKey, PivotTable>,
}

impl PivotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PivotKey) -> Option<&PivotTable> {
        self.tables.get(key)
    }

    pub fn get_mut(&mut self, key: &PivotKey) -> Option<&mut PivotTable> {
        self.tables.get_mut(key)
    }

    pub fn contains(&self, key: &PivotKey) -> bool {
        self.tables.contains_key(key)
    }

    /// Store a table under its own key, replacing any previous one.
    pub fn insert(&mut self, table: PivotTable) -> PivotKey {
        let key = table.key().clone();
        self.tables.insert(key.clone(), table);
        key
    }

    pub fn remove(&mut self, key: &PivotKey) -> Option<PivotTable> {
        self.tables.remove(key)
    }

    /// Drop every table except `keep` that lists a crony of `group`.
    pub fn evict_group(&mut self, group: SiblingId, keep: Option<&PivotKey>) -> Vec<PivotKey> {
        let evicted: Vec<PivotKey> = self
            .tables
            .iter()
            .filter(|(key, table)| Some(*key) != keep && table.contains_group(group))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &evicted {
            self.tables.remove(key);
        }
        evicted
    }

    /// Keys of the cached tables, sorted.
    pub fn keys(&self) -> Vec<&PivotKey> {
        let mut keys: Vec<&PivotKey> = self.tables.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
