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

//! Error type of the session facade.

use pmgraph_core::{PivotKey, PmError, SiblingId, TrialRef};
use pmgraph_csv::CsvError;
use pmgraph_xml::XmlError;
use thiserror::Error;

/// Errors raised by [`Session`](crate::Session) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad key or unusable aggregate.
    #[error(transparent)]
    Core(#[from] PmError),

    /// Document loading or XML parsing failed.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// CSV export failed.
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// The group was evicted or never existed.
    #[error("no sibling group {0}")]
    UnknownGroup(SiblingId),

    /// No pivot table is cached under this key.
    #[error("no pivot table '{0}'")]
    UnknownPivot(PivotKey),

    /// The trial reference no longer resolves.
    #[error("trial {0:?} no longer exists")]
    UnknownTrial(TrialRef),

    /// Averaging was requested without any flagged trial.
    #[error("no trials are flagged for averaging")]
    NothingFlagged,
}

impl Error {
    /// True when the error describes unusable report data rather than a caller mistake.
    pub fn is_data_error(&self) -> bool {
        match self {
            Error::Core(e) => e.is_data_error(),
            Error::Xml(XmlError::Data(e)) => e.is_data_error(),
            Error::Xml(XmlError::Parse { .. } | XmlError::Structure { .. }) => true,
            _ => false,
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
