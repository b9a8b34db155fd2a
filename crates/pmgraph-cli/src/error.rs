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

//! Structured error types for the pmgraph CLI.
//!
//! Every command returns `Result<T, CliError>`; `main` prints the message and
//! exits with a failure status.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pmgraph CLI operations.
///
/// # Examples
///
/// ```rust,no_run
/// use pmgraph_cli::error::CliError;
///
/// fn read(path: &str) -> Result<String, CliError> {
///     std::fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
/// }
/// ```
#[derive(Error, Debug)]
pub enum CliError {
    /// I/O operation failed (file read, write, or metadata access).
    #[error("I/O error for '{path}': {message}")]
    Io {
        path: PathBuf,
        message: String,
    },

    /// File exceeds the configured size limit.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        path: PathBuf,
        actual: u64,
        max: u64,
        max_mb: u64,
    },

    /// The data folder holds no loadable result document.
    #[error("no result documents found in '{0}'")]
    NoDocuments(PathBuf),

    /// No document holds the requested series.
    #[error("series {key1} {key2} not found")]
    MissingSeries { key1: String, key2: String },

    /// The requested series exists but could not be averaged.
    #[error("series {key1} {key2} has no valid average")]
    InvalidSeries { key1: String, key2: String },

    /// `verify` found series without a valid average.
    #[error("{0} series failed verification")]
    VerificationFailed(usize),

    /// None of the given reports could be imported.
    #[error("no report could be imported")]
    NothingImported,

    /// The operation was interrupted before it finished.
    #[error("cancelled")]
    Cancelled,

    /// Error from the aggregation engine.
    #[error(transparent)]
    Session(#[from] pmgraph::Error),

    #[error("JSON format error: {message}")]
    JsonFormat { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonFormat {
            message: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "0_0_0.xml",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("0_0_0.xml"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = CliError::file_too_large("big.xml", 200_000_000, 100 * 1024 * 1024);
        let msg = err.to_string();
        assert!(msg.contains("big.xml"));
        assert!(msg.contains("200000000 bytes"));
        assert!(msg.contains("100 MB"));
    }

    #[test]
    fn test_series_errors_name_both_keys() {
        let err = CliError::InvalidSeries {
            key1: "0_0_0".into(),
            key2: "0_0_0_1_1".into(),
        };
        assert_eq!(err.to_string(), "series 0_0_0 0_0_0_1_1 has no valid average");
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err = CliError::from(pmgraph::Error::NothingFlagged);
        assert_eq!(err.to_string(), pmgraph::Error::NothingFlagged.to_string());
    }

    #[test]
    fn test_json_format_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CliError = json_err.into();
        assert!(err.to_string().starts_with("JSON format error"));
    }
}
