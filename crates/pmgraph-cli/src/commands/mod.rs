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

//! CLI command implementations

mod completion;
mod export;
mod import;
mod series;
mod stats;
mod verify;

pub use completion::completion;
pub use export::{export, export_all};
pub use import::import;
pub use series::series;
pub use stats::stats;
pub use verify::verify;

use crate::error::CliError;
use pmgraph::{CancellationToken, Lookup, Session, SessionConfig, SiblingId};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

/// Read a file from disk, rejecting files above `max_file_size` bytes.
///
/// The limit defaults to 1 GiB and can be overridden through the
/// `PMGRAPH_MAX_FILE_SIZE` environment variable.
pub fn read_file(path: &Path, max_file_size: u64) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }
    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Write content to a file or stdout.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| CliError::io_error(p, e)),
        None => io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| CliError::io_error("<stdout>", e)),
    }
}

/// Load every result document of `data` into a fresh session.
pub fn open_session(data: &Path, token: &CancellationToken) -> Result<Session, CliError> {
    let mut session = Session::new(SessionConfig::from_env());
    let summary = session.load_folder(data, token)?;
    for (path, error) in &summary.failed {
        warn!(path = %path.display(), %error, "document skipped");
    }
    if summary.cancelled {
        return Err(CliError::Cancelled);
    }
    if summary.loaded.is_empty() {
        return Err(CliError::NoDocuments(data.to_path_buf()));
    }
    Ok(session)
}

/// Split the two values of `--at`.
pub fn series_keys(at: &[String]) -> Result<(&str, &str), CliError> {
    match at {
        [key1, key2] => Ok((key1, key2)),
        _ => Err(CliError::invalid_input(format!(
            "--at takes exactly two keys, got {}",
            at.len()
        ))),
    }
}

/// Look up a series, turning missing and invalid series into errors.
pub fn base_series(session: &mut Session, key1: &str, key2: &str) -> Result<SiblingId, CliError> {
    match session.get_or_build(key1, key2)? {
        Lookup::Found(id) => Ok(id),
        Lookup::Missing => Err(CliError::MissingSeries {
            key1: key1.to_string(),
            key2: key2.to_string(),
        }),
        Lookup::Invalid => Err(CliError::InvalidSeries {
            key1: key1.to_string(),
            key2: key2.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_rejects_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xml");
        fs::write(&path, "<pmbenchmark/>").unwrap();

        assert_eq!(read_file(&path, 1024).unwrap(), "<pmbenchmark/>");
        assert!(matches!(
            read_file(&path, 4).unwrap_err(),
            CliError::FileTooLarge { actual: 14, .. }
        ));
    }

    #[test]
    fn test_series_keys() {
        let at = vec!["0_0_0".to_string(), "0_0_0_1_0".to_string()];
        assert_eq!(series_keys(&at).unwrap(), ("0_0_0", "0_0_0_1_0"));
        assert!(series_keys(&at[..1]).is_err());
    }

    #[test]
    fn test_empty_folder_has_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_session(dir.path(), &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, CliError::NoDocuments(_)));
    }
}
