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

//! Error types for CSV export and signature parsing.

use thiserror::Error;

/// CSV export error types.
///
/// # Examples
///
/// ```
/// use pmgraph_csv::CsvError;
///
/// let err = CsvError::WidthMismatch {
///     expected: 8,
///     actual: 7,
///     row: 2,
/// };
/// assert_eq!(err.to_string(), "row 2 has 7 columns, expected 8");
/// ```
#[derive(Debug, Error)]
pub enum CsvError {
    /// The first row is not the dimension header row.
    #[error("invalid header at position {position}: {reason}")]
    InvalidHeader {
        /// Position of the offending column (0-based).
        position: usize,
        reason: String,
    },

    /// A row has the wrong number of columns.
    #[error("row {row} has {actual} columns, expected {expected}")]
    WidthMismatch {
        expected: usize,
        actual: usize,
        /// Row number (1-based).
        row: usize,
    },

    /// The text ends before a required row.
    #[error("missing {0} row")]
    MissingRow(&'static str),

    /// The table has no crony that can still be resolved.
    #[error("pivot table '{0}' has nothing to export")]
    EmptyTable(String),

    /// I/O error while writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the underlying CSV library.
    #[error("CSV library error: {0}")]
    CsvLib(#[from] csv::Error),
}

/// Result type for CSV operations.
pub type Result<T> = std::result::Result<T, CsvError>;
