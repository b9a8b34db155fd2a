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

//! Verify command - average every series and report the invalid ones

use super::open_session;
use crate::error::CliError;
use colored::Colorize;
use pmgraph::CancellationToken;
use std::path::Path;

/// Build every series of `data` and list the ones without a valid average.
///
/// Fails when any series is invalid.
pub fn verify(data: &Path) -> Result<(), CliError> {
    let token = CancellationToken::new();
    let mut session = open_session(data, &token)?;
    let outcome = pmgraph::verify(&mut session, &token)?;

    println!("{} {} series", "Validated:".green().bold(), outcome.validated);
    if outcome.invalid.is_empty() {
        return Ok(());
    }
    println!("{}", "Invalid series:".red().bold());
    for (key1, key2) in &outcome.invalid {
        println!("  {} {} {}", "✗".red(), key1, key2);
    }
    Err(CliError::VerificationFailed(outcome.invalid.len()))
}
