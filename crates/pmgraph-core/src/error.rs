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

//! Error types shared by the pmgraph crates.
//!
//! Only two situations are errors here: a key that cannot address the
//! parameter space, and report data whose structure prevents averaging.
//! A series that simply does not exist is represented with `Option`, and
//! a numeric field that fails to parse is replaced with zero by the XML
//! accessor.

use crate::dimension::Dimension;
use crate::report::Access;
use thiserror::Error;

/// Errors raised while addressing or aggregating benchmark data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PmError {
    /// A series or document key could not be decoded.
    #[error("malformed key '{key}': {reason}")]
    MalformedKey {
        /// The offending key text.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A dimension index is outside its value table.
    #[error("index {index} out of range for {dimension} (cardinality {len})")]
    IndexOutOfRange {
        /// Dimension the index was used for.
        dimension: Dimension,
        /// The rejected index.
        index: usize,
        /// Number of values in the dimension's table.
        len: usize,
    },

    /// Trials of one series disagree in structure or carry non-finite values.
    #[error("malformed data in {context}: {message}")]
    MalformedData {
        /// Where the mismatch was found (series, thread, bucket...).
        context: String,
        /// Description of the mismatch.
        message: String,
    },

    /// The read/write ratio requires a histogram the report does not contain.
    #[error("missing {access} histogram for read/write ratio {ratio}")]
    MissingHistogram {
        /// Access type of the absent histogram.
        access: Access,
        /// Ratio of the series being averaged.
        ratio: i32,
    },
}

impl PmError {
    /// Create a malformed key error.
    pub fn malformed_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        PmError::MalformedKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed data error.
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        PmError::MalformedData {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Returns true when the error describes unusable report data rather than a bad key.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            PmError::MalformedData { .. } | PmError::MissingHistogram { .. }
        )
    }
}

/// Result type for pmgraph-core operations.
pub type Result<T> = std::result::Result<T, PmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PmError::malformed_key("0_1", "expected 3 components");
        assert_eq!(
            err.to_string(),
            "malformed key '0_1': expected 3 components"
        );

        let err = PmError::IndexOutOfRange {
            dimension: Dimension::Jobs,
            index: 4,
            len: 2,
        };
        assert_eq!(err.to_string(), "index 4 out of range for jobs (cardinality 2)");

        let err = PmError::MissingHistogram {
            access: Access::Write,
            ratio: 50,
        };
        assert_eq!(
            err.to_string(),
            "missing write histogram for read/write ratio 50"
        );
    }

    #[test]
    fn test_is_data_error() {
        assert!(PmError::malformed("thread 1", "missing").is_data_error());
        assert!(!PmError::malformed_key("x", "y").is_data_error());
    }
}
