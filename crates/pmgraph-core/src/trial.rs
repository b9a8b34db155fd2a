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

//! Trial records: one measured or synthesized run inside a sibling group.

use crate::arena::SiblingId;
use crate::report::{Access, TrialData};
use std::sync::Arc;

/// Lifecycle of one access-type series of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesState {
    /// The trial never had this series.
    Absent,
    Live,
    /// Selected for deletion, not yet applied.
    Marked,
    Deleted,
}

/// One trial of a series, or the series' synthesized average.
#[derive(Debug, Clone)]
pub struct TrialRecord {
    group: SiblingId,
    index: usize,
    data: Arc<TrialData>,
    custom_name: Option<String>,
    read: SeriesState,
    write: SeriesState,
    /// Selected as input of a manual average.
    pub flagged_for_average: bool,
}

impl TrialRecord {
    /// Create a record; series states follow the histograms present in `data`.
    pub fn new(group: SiblingId, index: usize, data: Arc<TrialData>) -> Self {
        let state = |present: bool| {
            if present {
                SeriesState::Live
            } else {
                SeriesState::Absent
            }
        };
        Self {
            group,
            index,
            read: state(data.read.is_some()),
            write: state(data.write.is_some()),
            data,
            custom_name: None,
            flagged_for_average: false,
        }
    }

    /// Owning group.
    pub fn group(&self) -> SiblingId {
        self.group
    }

    /// 1-based trial number; the average carries `trials_per_series + 1`.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data(&self) -> &TrialData {
        &self.data
    }

    /// Shared handle to the measured data.
    pub fn shared_data(&self) -> &Arc<TrialData> {
        &self.data
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref()
    }

    pub fn set_custom_name(&mut self, name: impl Into<String>) {
        self.custom_name = Some(name.into());
    }

    /// Samples over all threads.
    pub fn total_samples(&self) -> f64 {
        self.data.total_samples()
    }

    fn state_mut(&mut self, access: Access) -> &mut SeriesState {
        match access {
            Access::Read => &mut self.read,
            Access::Write => &mut self.write,
        }
    }

    pub fn series_state(&self, access: Access) -> SeriesState {
        match access {
            Access::Read => self.read,
            Access::Write => self.write,
        }
    }

    /// Whether the series of this access type is still displayable.
    pub fn has_series(&self, access: Access) -> bool {
        matches!(
            self.series_state(access),
            SeriesState::Live | SeriesState::Marked
        )
    }

    /// Mark one series for deletion; false when there is no live series to mark.
    pub fn flag_for_deletion(&mut self, access: Access) -> bool {
        let state = self.state_mut(access);
        if *state == SeriesState::Live {
            *state = SeriesState::Marked;
            true
        } else {
            false
        }
    }

    /// Withdraw a pending deletion.
    pub fn unflag(&mut self, access: Access) {
        let state = self.state_mut(access);
        if *state == SeriesState::Marked {
            *state = SeriesState::Live;
        }
    }

    pub fn has_pending_deletions(&self) -> bool {
        self.read == SeriesState::Marked || self.write == SeriesState::Marked
    }

    /// Turn marked series into deleted ones and return how many were deleted.
    pub fn apply_deletions(&mut self) -> usize {
        let mut deleted = 0;
        for access in Access::BOTH {
            let state = self.state_mut(access);
            if *state == SeriesState::Marked {
                *state = SeriesState::Deleted;
                deleted += 1;
            }
        }
        deleted
    }

    /// A trial dies once none of its series remains.
    pub fn is_dead(&self) -> bool {
        !self.has_series(Access::Read) && !self.has_series(Access::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Histogram;

    fn record(read: bool, write: bool) -> TrialRecord {
        let data = TrialData {
            read: read.then(|| Histogram::new(Access::Read)),
            write: write.then(|| Histogram::new(Access::Write)),
            ..TrialData::default()
        };
        TrialRecord::new(SiblingId(0), 1, Arc::new(data))
    }

    #[test]
    fn test_deletion_lifecycle() {
        let mut r = record(true, true);
        assert!(r.flag_for_deletion(Access::Read));
        assert!(!r.flag_for_deletion(Access::Read));
        assert!(r.has_pending_deletions());
        assert_eq!(r.apply_deletions(), 1);
        assert!(!r.is_dead());
        assert!(r.flag_for_deletion(Access::Write));
        r.unflag(Access::Write);
        assert_eq!(r.apply_deletions(), 0);
        assert!(r.flag_for_deletion(Access::Write));
        assert_eq!(r.apply_deletions(), 1);
        assert!(r.is_dead());
    }

    #[test]
    fn test_absent_series_cannot_be_flagged() {
        let mut r = record(false, true);
        assert_eq!(r.series_state(Access::Read), SeriesState::Absent);
        assert!(!r.flag_for_deletion(Access::Read));
        assert!(r.flag_for_deletion(Access::Write));
        r.apply_deletions();
        assert!(r.is_dead());
    }
}
