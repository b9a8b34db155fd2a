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

//! Session configuration.

use pmgraph_core::DimensionTables;
use pmgraph_xml::DEFAULT_MAX_FILE_SIZE;

/// Environment variable overriding [`SessionConfig::max_file_size`], in bytes.
pub const MAX_FILE_SIZE_ENV: &str = "PMGRAPH_MAX_FILE_SIZE";

/// Configuration of a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Ordered dimension value tables.
    pub tables: DimensionTables,
    /// Largest result document that will be read (default 1 GiB).
    pub max_file_size: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tables: DimensionTables::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl SessionConfig {
    /// Default configuration with the environment override applied.
    ///
    /// An unparsable `PMGRAPH_MAX_FILE_SIZE` is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use pmgraph::SessionConfig;
    ///
    /// let config = SessionConfig::from_env();
    /// assert!(config.max_file_size > 0);
    /// ```
    pub fn from_env() -> Self {
        Self::default().with_max_file_size(max_file_size_from(
            std::env::var(MAX_FILE_SIZE_ENV).ok().as_deref(),
        ))
    }

    pub fn with_tables(mut self, tables: DimensionTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

fn max_file_size_from(value: Option<&str>) -> u64 {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}
