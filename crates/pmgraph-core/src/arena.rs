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

//! Owning storage for sibling groups.
//!
//! Trials refer back to their group through a [`SiblingId`] instead of a
//! pointer, and pivot tables hold [`TrialRef`]s. Removing a group turns
//! every handle into it into a dangling one that resolves to `None`.

use crate::params::ParameterSet;
use crate::sibling::{SiblingGroup, TrialSlot};
use crate::trial::TrialRecord;
use std::fmt;

/// Handle of a group inside a [`SiblingArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiblingId(pub u32);

impl fmt::Display for SiblingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-owning reference to one trial record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrialRef {
    pub group: SiblingId,
    pub slot: TrialSlot,
}

impl TrialRef {
    pub fn average(group: SiblingId) -> Self {
        Self {
            group,
            slot: TrialSlot::Average,
        }
    }

    pub fn raw(group: SiblingId, index: usize) -> Self {
        Self {
            group,
            slot: TrialSlot::Raw(index),
        }
    }
}

/// Slot storage of sibling groups; ids are never reused.
#[derive(Debug, Default)]
pub struct SiblingArena {
    groups: Vec<Option<SiblingGroup>>,
}

impl SiblingArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted group will receive.
    pub fn next_id(&self) -> SiblingId {
        SiblingId(self.groups.len() as u32)
    }

    /// Store a group built with [`next_id`](Self::next_id).
    pub fn insert(&mut self, group: SiblingGroup) -> SiblingId {
        let id = self.next_id();
        debug_assert_eq!(group.id(), id);
        self.groups.push(Some(group));
        id
    }

    pub fn get(&self, id: SiblingId) -> Option<&SiblingGroup> {
        self.groups.get(id.0 as usize).and_then(|g| g.as_ref())
    }

    pub fn get_mut(&mut self, id: SiblingId) -> Option<&mut SiblingGroup> {
        self.groups.get_mut(id.0 as usize).and_then(|g| g.as_mut())
    }

    pub fn remove(&mut self, id: SiblingId) -> Option<SiblingGroup> {
        self.groups.get_mut(id.0 as usize).and_then(|g| g.take())
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.groups.iter().filter(|g| g.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiblingGroup> {
        self.groups.iter().flatten()
    }

    /// Record and parameters behind a reference.
    pub fn resolve(&self, r: TrialRef) -> Option<(&ParameterSet, &TrialRecord)> {
        let group = self.get(r.group)?;
        let trial = group.trial(r.slot)?;
        Some((group.params(), trial))
    }

    pub fn resolve_mut(&mut self, r: TrialRef) -> Option<&mut TrialRecord> {
        self.get_mut(r.group)?.trial_mut(r.slot)
    }
}
