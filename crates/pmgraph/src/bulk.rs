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

//! Operations over the whole parameter space.
//!
//! Both walk every index tuple of the dimension tables as one flat
//! sequence and check the cancellation token once per tuple. Tuples whose
//! memory exceeds the map size, or whose document is not loaded, are
//! skipped without a lookup.

use crate::error::Result;
use crate::session::{Lookup, Session};
use pmgraph_core::{CancellationToken, IndexProduct, ParamIndices, PivotKey, PivotMode};
use pmgraph_csv::ExportConfig;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Result of [`mass_export`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub files_written: usize,
    /// Tables left out because they compare fewer than two trials.
    pub tables_skipped: usize,
    pub cancelled: bool,
}

/// Result of [`verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Series that were averaged successfully.
    pub validated: usize,
    /// `(key1, key2)` of series without a valid average.
    pub invalid: Vec<(String, String)>,
    pub cancelled: bool,
}

/// Tuples worth a lookup, in index order.
fn plan(session: &Session) -> Vec<ParamIndices> {
    IndexProduct::new(session.tables())
        .filter(|indices| indices.is_plausible() && session.store().contains(&indices.key1()))
        .collect()
}

/// Export every pivot table of every series into `dir`.
///
/// Each distinct table is exported once, when it compares at least two
/// trials, and released right after. Cancellation stops before the next
/// tuple and reports what was written so far.
pub fn mass_export(
    session: &mut Session,
    dir: &Path,
    config: &ExportConfig,
    token: &CancellationToken,
) -> Result<BulkOutcome> {
    let mut outcome = BulkOutcome::default();
    let mut seen: HashSet<PivotKey> = HashSet::new();
    for indices in plan(session) {
        if token.is_cancelled() {
            outcome.cancelled = true;
            break;
        }
        let Lookup::Found(base) = session.get_or_build(&indices.key1(), &indices.key2())? else {
            continue;
        };
        for mode in PivotMode::derived() {
            if !seen.insert(PivotKey::new(&indices, mode)) {
                continue;
            }
            let key = session.build_pivot(base, mode)?;
            let cronies = session.pivot(&key).map_or(0, |t| t.len());
            if cronies > 1 {
                let path = session.export_pivot(&key, dir, config)?;
                debug!(path = %path.display(), cronies, "exported");
                outcome.files_written += 1;
            } else {
                outcome.tables_skipped += 1;
            }
            session.release_pivot(&key);
        }
    }

    info!(
        files = outcome.files_written,
        skipped = outcome.tables_skipped,
        cancelled = outcome.cancelled,
        "mass export finished"
    );
    Ok(outcome)
}

/// Build every series of the loaded documents and report the invalid ones.
pub fn verify(session: &mut Session, token: &CancellationToken) -> Result<VerifyOutcome> {
    let mut outcome = VerifyOutcome::default();
    for indices in plan(session) {
        if token.is_cancelled() {
            outcome.cancelled = true;
            break;
        }
        let (key1, key2) = (indices.key1(), indices.key2());
        match session.get_or_build(&key1, &key2)? {
            Lookup::Found(_) => outcome.validated += 1,
            Lookup::Invalid => outcome.invalid.push((key1, key2)),
            Lookup::Missing => {}
        }
    }

    info!(
        validated = outcome.validated,
        invalid = outcome.invalid.len(),
        "verification finished"
    );
    Ok(outcome)
}
