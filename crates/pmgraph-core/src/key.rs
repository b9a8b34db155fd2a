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

//! Series and pivot keys.
//!
//! A series is addressed by eight dimension indices. The first three
//! select the result document (`key1`), the remaining five select the
//! series node inside it (`key2`).

use crate::dimension::{Dimension, DimensionTables, PivotMode};
use crate::error::{PmError, Result};
use std::fmt;

/// Indices of one point in the parameter space, in [`Dimension`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamIndices(pub [usize; 8]);

impl ParamIndices {
    /// Build from explicit indices.
    pub fn new(indices: [usize; 8]) -> Self {
        Self(indices)
    }

    /// Index along one dimension.
    pub fn get(&self, dim: Dimension) -> usize {
        self.0[dim.position()]
    }

    /// Copy with one dimension replaced.
    pub fn with(mut self, dim: Dimension, index: usize) -> Self {
        self.0[dim.position()] = index;
        self
    }

    /// Document key: `os_device_memory`.
    pub fn key1(&self) -> String {
        join(&self.0[..3])
    }

    /// Series key within a document: `mapsize_jobs_delay_ratio_nice`.
    pub fn key2(&self) -> String {
        join(&self.0[3..])
    }

    /// Cache key for the aggregate of this series.
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey(format!("{}_{}", self.key1(), self.key2()))
    }

    /// Decode a `(key1, key2)` pair.
    pub fn from_keys(key1: &str, key2: &str) -> Result<Self> {
        let head = parse_part(key1, 3)?;
        let tail = parse_part(key2, 5)?;
        let mut indices = [0usize; 8];
        indices[..3].copy_from_slice(&head);
        indices[3..].copy_from_slice(&tail);
        Ok(Self(indices))
    }

    /// Fail if any index exceeds its dimension's table.
    pub fn validate(&self, tables: &DimensionTables) -> Result<()> {
        for dim in Dimension::ALL {
            let len = tables.cardinality(dim);
            let index = self.get(dim);
            if index >= len {
                return Err(PmError::IndexOutOfRange {
                    dimension: dim,
                    index,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Physical memory never exceeds the map size in the published grids.
    pub fn is_plausible(&self) -> bool {
        self.get(Dimension::Memory) <= self.get(Dimension::Mapsize)
    }
}

fn join(parts: &[usize]) -> String {
    parts
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("_")
}

fn parse_part(key: &str, expected: usize) -> Result<Vec<usize>> {
    let parts: Vec<&str> = key.split('_').collect();
    if parts.len() != expected {
        return Err(PmError::malformed_key(
            key,
            format!("expected {} components, found {}", expected, parts.len()),
        ));
    }
    parts
        .iter()
        .map(|p| {
            p.parse::<usize>()
                .map_err(|_| PmError::malformed_key(key, format!("'{}' is not an index", p)))
        })
        .collect()
}

impl fmt::Display for ParamIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.key1(), self.key2())
    }
}

/// Key of one aggregated series, `key1_key2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey(pub String);

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of one pivot table: the mode plus the fixed indices, with `*` at the varying position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PivotKey(pub String);

impl PivotKey {
    /// Encode a base point and a pivot mode.
    pub fn new(base: &ParamIndices, mode: PivotMode) -> Self {
        let terms: Vec<String> = Dimension::ALL
            .iter()
            .map(|&d| {
                if mode.dimension() == Some(d) {
                    "*".to_string()
                } else {
                    base.get(d).to_string()
                }
            })
            .collect();
        let body = terms.join("_");
        match mode {
            PivotMode::Dimension(_) => PivotKey(body),
            PivotMode::Trials => PivotKey(format!("trials:{}", body)),
            PivotMode::Manual => PivotKey("manual".to_string()),
        }
    }

    /// Key of the single manual pivot table.
    pub fn manual() -> Self {
        PivotKey("manual".to_string())
    }
}

impl fmt::Display for PivotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Iterator over every index tuple of the parameter space, last dimension fastest.
#[derive(Debug, Clone)]
pub struct IndexProduct {
    limits: [usize; 8],
    next: Option<[usize; 8]>,
}

impl IndexProduct {
    /// Iterate the full space described by `tables`.
    pub fn new(tables: &DimensionTables) -> Self {
        Self::with_limits(tables.cardinalities())
    }

    /// Iterate an explicit grid; any zero limit yields an empty iterator.
    pub fn with_limits(limits: [usize; 8]) -> Self {
        let next = if limits.iter().all(|&l| l > 0) {
            Some([0; 8])
        } else {
            None
        };
        Self { limits, next }
    }

    /// Total number of tuples.
    pub fn total(&self) -> usize {
        self.limits.iter().product()
    }
}

impl Iterator for IndexProduct {
    type Item = ParamIndices;

    fn next(&mut self) -> Option<ParamIndices> {
        let current = self.next?;
        let mut following = current;
        let mut carry = true;
        for pos in (0..8).rev() {
            following[pos] += 1;
            if following[pos] < self.limits[pos] {
                carry = false;
                break;
            }
            following[pos] = 0;
        }
        self.next = if carry { None } else { Some(following) };
        Some(ParamIndices(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let idx = ParamIndices::new([0, 1, 2, 3, 0, 1, 2, 0]);
        assert_eq!(idx.key1(), "0_1_2");
        assert_eq!(idx.key2(), "3_0_1_2_0");
        assert_eq!(idx.series_key().0, "0_1_2_3_0_1_2_0");
        assert_eq!(ParamIndices::from_keys("0_1_2", "3_0_1_2_0").unwrap(), idx);
    }

    #[test]
    fn test_malformed_keys() {
        assert!(matches!(
            ParamIndices::from_keys("0_1", "3_0_1_2_0"),
            Err(PmError::MalformedKey { .. })
        ));
        assert!(matches!(
            ParamIndices::from_keys("0_1_x", "3_0_1_2_0"),
            Err(PmError::MalformedKey { .. })
        ));
        let idx = ParamIndices::from_keys("9_0_0", "0_0_0_0_0").unwrap();
        assert!(idx.validate(&DimensionTables::default()).is_err());
    }

    #[test]
    fn test_pivot_key() {
        let idx = ParamIndices::new([0, 1, 2, 3, 0, 1, 2, 0]);
        assert_eq!(
            PivotKey::new(&idx, PivotMode::Dimension(Dimension::OperatingSystem)).0,
            "*_1_2_3_0_1_2_0"
        );
        assert_eq!(
            PivotKey::new(&idx, PivotMode::Trials).0,
            "trials:0_1_2_3_0_1_2_0"
        );
        // Keys that differ only in the varying index collide.
        let other = idx.with(Dimension::Ratio, 0);
        let mode = PivotMode::Dimension(Dimension::Ratio);
        assert_eq!(PivotKey::new(&idx, mode), PivotKey::new(&other, mode));
    }

    #[test]
    fn test_index_product() {
        let product = IndexProduct::with_limits([2, 1, 1, 1, 1, 1, 1, 3]);
        assert_eq!(product.total(), 6);
        let all: Vec<_> = product.collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].0, [0; 8]);
        assert_eq!(all[1].0, [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(all[5].0, [1, 0, 0, 0, 0, 0, 0, 2]);

        assert_eq!(IndexProduct::with_limits([0, 1, 1, 1, 1, 1, 1, 1]).count(), 0);
        assert_eq!(
            IndexProduct::new(&DimensionTables::default()).count(),
            4 * 3 * 7 * 7 * 2 * 2 * 3 * 3
        );
    }
}
