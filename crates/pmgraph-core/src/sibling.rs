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

//! Sibling groups: all trials of one parameter set and their average.

use crate::arena::SiblingId;
use crate::average::average_trials;
use crate::error::{PmError, Result};
use crate::params::ParameterSet;
use crate::report::TrialData;
use crate::stats::GroupStats;
use crate::trial::TrialRecord;
use std::sync::Arc;

/// Which trial of a group a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialSlot {
    /// Raw trial by its 1-based number.
    Raw(usize),
    Average,
}

/// All trials of one parameter set.
///
/// The average is computed once, when the group is built. A group whose
/// trials cannot be averaged is never constructed.
#[derive(Debug, Clone)]
pub struct SiblingGroup {
    id: SiblingId,
    params: ParameterSet,
    trials: Vec<TrialRecord>,
    average: TrialRecord,
    trials_per_series: usize,
    stats: GroupStats,
}

impl SiblingGroup {
    /// Build a group from its raw trials, in document order.
    pub fn build(id: SiblingId, params: ParameterSet, trials: Vec<TrialData>) -> Result<Self> {
        if trials.is_empty() {
            return Err(PmError::malformed(params.readable(), "series has no trials"));
        }
        let shared: Vec<Arc<TrialData>> = trials.into_iter().map(Arc::new).collect();
        let n = shared.len();

        let average_data = if n == 1 {
            // A lone trial is its own average unless it lacks an expected histogram.
            average_trials(&[shared[0].as_ref()], &params)?;
            Arc::clone(&shared[0])
        } else {
            let refs: Vec<&TrialData> = shared.iter().map(|t| t.as_ref()).collect();
            Arc::new(average_trials(&refs, &params)?)
        };

        let stats = GroupStats::compute(&average_data);
        let records = shared
            .into_iter()
            .enumerate()
            .map(|(i, data)| TrialRecord::new(id, i + 1, data))
            .collect();

        Ok(Self {
            id,
            average: TrialRecord::new(id, n + 1, average_data),
            params,
            trials: records,
            trials_per_series: n,
            stats,
        })
    }

    pub fn id(&self) -> SiblingId {
        self.id
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Raw trials still alive, in trial order.
    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn average(&self) -> &TrialRecord {
        &self.average
    }

    /// Number of trials the average was computed from.
    pub fn trials_per_series(&self) -> usize {
        self.trials_per_series
    }

    pub fn stats(&self) -> &GroupStats {
        &self.stats
    }

    /// Record behind a slot.
    pub fn trial(&self, slot: TrialSlot) -> Option<&TrialRecord> {
        match slot {
            TrialSlot::Average => Some(&self.average),
            TrialSlot::Raw(index) => self.trials.iter().find(|t| t.index() == index),
        }
    }

    pub fn trial_mut(&mut self, slot: TrialSlot) -> Option<&mut TrialRecord> {
        match slot {
            TrialSlot::Average => Some(&mut self.average),
            TrialSlot::Raw(index) => self.trials.iter_mut().find(|t| t.index() == index),
        }
    }

    /// Slots of the raw trials followed by the average.
    pub fn slots(&self) -> Vec<TrialSlot> {
        self.trials
            .iter()
            .map(|t| TrialSlot::Raw(t.index()))
            .chain(std::iter::once(TrialSlot::Average))
            .collect()
    }

    /// Drop raw trials whose series were all deleted; returns how many were dropped.
    pub fn remove_dead_trials(&mut self) -> usize {
        let before = self.trials.len();
        self.trials.retain(|t| !t.is_dead());
        before - self.trials.len()
    }

    /// True once the average's series were all deleted.
    pub fn is_average_dead(&self) -> bool {
        self.average.is_dead()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RunConfig;
    use crate::report::{Access, Histogram, ThreadResult};

    fn params() -> ParameterSet {
        let mut p = ParameterSet::from_run("Fedora23_native", RunConfig::default());
        p.ratio_percent = 0;
        p
    }

    fn trial(latency: f64) -> TrialData {
        TrialData {
            threads: vec![ThreadResult {
                thread_num: 1,
                latency_us: latency,
                ..ThreadResult::default()
            }],
            write: Some(Histogram::new(Access::Write)),
            ..TrialData::default()
        }
    }

    #[test]
    fn test_single_trial_shares_data() {
        let group = SiblingGroup::build(SiblingId(3), params(), vec![trial(2.0)]).unwrap();
        assert_eq!(group.trials_per_series(), 1);
        assert_eq!(group.average().index(), 2);
        assert!(Arc::ptr_eq(
            group.average().shared_data(),
            group.trials()[0].shared_data()
        ));
    }

    #[test]
    fn test_average_and_slots() {
        let group =
            SiblingGroup::build(SiblingId(0), params(), vec![trial(1.0), trial(2.0), trial(6.0)])
                .unwrap();
        assert_eq!(group.average().data().threads[0].latency_us, 3.0);
        assert_eq!(group.average().index(), 4);
        assert_eq!(
            group.slots(),
            vec![
                TrialSlot::Raw(1),
                TrialSlot::Raw(2),
                TrialSlot::Raw(3),
                TrialSlot::Average
            ]
        );
        assert_eq!(group.trial(TrialSlot::Raw(2)).unwrap().data().threads[0].latency_us, 2.0);
        assert!(group.trial(TrialSlot::Raw(9)).is_none());
    }

    #[test]
    fn test_failed_average_builds_nothing() {
        let mut bad = trial(1.0);
        bad.write = None;
        assert!(SiblingGroup::build(SiblingId(0), params(), vec![trial(1.0), bad]).is_err());
        assert!(SiblingGroup::build(SiblingId(0), params(), vec![]).is_err());
    }

    #[test]
    fn test_remove_dead_trials() {
        let mut group =
            SiblingGroup::build(SiblingId(0), params(), vec![trial(1.0), trial(2.0)]).unwrap();
        let t = group.trial_mut(TrialSlot::Raw(1)).unwrap();
        assert!(t.flag_for_deletion(Access::Write));
        t.apply_deletions();
        assert_eq!(group.remove_dead_trials(), 1);
        assert_eq!(group.trials().len(), 1);
        assert_eq!(group.trials()[0].index(), 2);
        assert!(!group.is_average_dead());
    }
}
