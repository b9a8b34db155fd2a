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

//! Manually imported reports and user-made averages.
//!
//! Standalone pmbench reports become one-trial groups listed in the manual
//! pivot table under unique names. Any subset of them can be flagged and
//! averaged into a new group, which joins the same table.

use crate::error::{Error, Result};
use crate::session::Session;
use pmgraph_core::{PivotKey, PivotTable, SiblingGroup, TrialData, TrialRef};
use pmgraph_xml::{parse_single_report, write_report};
use std::collections::HashSet;
use tracing::{info, warn};

/// Naming state of the manual table.
#[derive(Debug, Default)]
pub struct ManualBench {
    names: HashSet<String>,
    averages: usize,
}

impl ManualBench {
    /// `wanted` if unused, otherwise the first free `wanted0`, `wanted1`, ...
    fn claim(&mut self, wanted: &str) -> String {
        let mut name = wanted.to_string();
        let mut n = 0;
        while self.names.contains(&name) {
            name = format!("{}{}", wanted, n);
            n += 1;
        }
        self.names.insert(name.clone());
        name
    }
}

/// Result of importing several reports.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Imported trials, in input order.
    pub imported: Vec<TrialRef>,
    /// Reports that could not be imported.
    pub failed: Vec<(String, Error)>,
}

impl Session {
    /// Key of the manual table, creating the table on first use.
    pub fn manual_pivot(&mut self) -> PivotKey {
        let key = PivotKey::manual();
        if !self.pivots.contains(&key) {
            self.pivots.insert(PivotTable::manual(Vec::new()));
        }
        key
    }

    /// Import one standalone report into the manual table.
    pub fn import_report(&mut self, name: &str, text: &str) -> Result<TrialRef> {
        let report = parse_single_report(name, text)?;
        if report.failures > 0 {
            warn!(name, failures = report.failures, "unreadable numeric fields read as zero");
        }
        let id = self.arena.next_id();
        let group = SiblingGroup::build(id, report.params(), vec![report.trial])?;
        let id = self.arena.insert(group);

        let crony = TrialRef::raw(id, 1);
        let unique = self.manual.claim(name);
        if let Some(record) = self.arena.resolve_mut(crony) {
            record.set_custom_name(unique.as_str());
        }
        let key = self.manual_pivot();
        if let Some(table) = self.pivots.get_mut(&key) {
            table.push(crony);
        }
        info!(name = %unique, group = %id, "imported report");
        Ok(crony)
    }

    /// Import `(name, text)` pairs; failures are collected, not fatal.
    pub fn import_reports<I>(&mut self, reports: I) -> ImportOutcome
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut outcome = ImportOutcome::default();
        for (name, text) in reports {
            match self.import_report(&name, &text) {
                Ok(crony) => outcome.imported.push(crony),
                Err(e) => {
                    warn!(name = %name, error = %e, "report not imported");
                    outcome.failed.push((name, e));
                }
            }
        }
        outcome
    }

    pub fn flag_for_average(&mut self, crony: TrialRef, flagged: bool) -> Result<()> {
        let record = self
            .arena
            .resolve_mut(crony)
            .ok_or(Error::UnknownTrial(crony))?;
        record.flagged_for_average = flagged;
        Ok(())
    }

    /// Average the flagged trials of the manual table into a new group.
    ///
    /// The average is named `name`, or `Average<n>` by default, and is
    /// appended to the manual table. Flags are cleared on success.
    pub fn average_selected(&mut self, name: Option<&str>) -> Result<TrialRef> {
        let key = self.manual_pivot();
        let flagged: Vec<TrialRef> = self
            .pivots
            .get(&key)
            .map(|table| {
                table
                    .cronies()
                    .iter()
                    .copied()
                    .filter(|&c| {
                        self.arena
                            .resolve(c)
                            .map_or(false, |(_, r)| r.flagged_for_average)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let Some((params, _)) = flagged.first().and_then(|&c| self.arena.resolve(c)) else {
            return Err(Error::NothingFlagged);
        };
        let params = params.clone();
        let trials: Vec<TrialData> = flagged
            .iter()
            .filter_map(|&c| self.arena.resolve(c))
            .map(|(_, record)| record.data().clone())
            .collect();

        let id = self.arena.next_id();
        let group = SiblingGroup::build(id, params, trials)?;
        let id = self.arena.insert(group);

        self.manual.averages += 1;
        let wanted = match name {
            Some(name) => name.to_string(),
            None => format!("Average{}", self.manual.averages),
        };
        let unique = self.manual.claim(&wanted);
        let crony = TrialRef::average(id);
        if let Some(record) = self.arena.resolve_mut(crony) {
            record.set_custom_name(unique.as_str());
        }
        for &c in &flagged {
            if let Some(record) = self.arena.resolve_mut(c) {
                record.flagged_for_average = false;
            }
        }
        if let Some(table) = self.pivots.get_mut(&key) {
            table.push(crony);
        }
        info!(name = %unique, trials = flagged.len(), "averaged manual trials");
        Ok(crony)
    }

    /// Any trial written back as a standalone report.
    pub fn report_xml(&self, crony: TrialRef) -> Result<String> {
        let (params, record) = self
            .arena
            .resolve(crony)
            .ok_or(Error::UnknownTrial(crony))?;
        Ok(write_report(params, record.data())?)
    }
}
