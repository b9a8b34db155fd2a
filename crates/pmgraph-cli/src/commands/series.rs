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

//! Series command - chart series of a pivot table as JSON

use super::{base_series, open_session, series_keys, write_output};
use crate::error::CliError;
use pmgraph::{Access, CancellationToken, ChartArea, PivotMode};
use std::path::Path;

/// Print the chart series of the `mode` table around one series.
///
/// Only series of `access` are printed when it is given.
pub fn series(
    data: &Path,
    at: &[String],
    mode: PivotMode,
    access: Option<Access>,
    area: ChartArea,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let (key1, key2) = series_keys(at)?;
    let mut session = open_session(data, &CancellationToken::new())?;
    let base = base_series(&mut session, key1, key2)?;
    let key = session.build_pivot(base, mode)?;

    let mut series = session.chart_series(&key, area)?;
    if let Some(access) = access {
        series.retain(|s| s.access == access);
    }
    let mut json = serde_json::to_string_pretty(&series)?;
    json.push('\n');
    write_output(&json, output)
}
