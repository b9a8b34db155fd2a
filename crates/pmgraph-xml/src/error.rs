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

//! Error types for XML document handling.

use pmgraph_core::PmError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, parsing or writing pmbench XML.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XmlError {
    /// The text is not well-formed XML.
    ///
    /// # Example
    ///
    /// ```text
    /// XML parse error in results_Fedora23_native_chatham_256_final.xml: unexpected end of stream
    /// ```
    #[error("XML parse error in {source_name}: {message}")]
    Parse {
        /// File or document name.
        source_name: String,
        message: String,
    },

    /// The document parsed but is not a pmbench document.
    #[error("unexpected document structure in {source_name}: {message}")]
    Structure { source_name: String, message: String },

    /// Reading a file failed.
    #[error("I/O error reading '{}': {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// A file exceeds the configured size limit.
    #[error("file '{}' is too large ({size} bytes, limit {max} bytes)", path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// Writing XML output failed.
    #[error("failed to write {context}: {message}")]
    Write { context: String, message: String },

    /// Report contents cannot be used.
    #[error(transparent)]
    Data(#[from] PmError),
}

impl XmlError {
    pub fn parse(source_name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        XmlError::Parse {
            source_name: source_name.into(),
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        XmlError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn write(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        XmlError::Write {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for XML operations.
pub type Result<T> = std::result::Result<T, XmlError>;
