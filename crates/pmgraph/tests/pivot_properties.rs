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

//! Shape of dimension pivots over arbitrary base points.

use pmgraph::{Dimension, DimensionTables, ParamIndices, PivotMode, Session};
use pmgraph_test::fixtures;
use proptest::prelude::*;

fn session() -> Session {
    let mut session = Session::default();
    for (key1, (name, xml)) in ["0_0_0", "2_0_0"].iter().zip(fixtures::sample_result_set()) {
        session.insert_document(key1, &name, xml).unwrap();
    }
    session
}

/// Key2 positions of the series in the sample result set.
const SAMPLE_POINTS: [[usize; 5]; 5] = [
    [0, 0, 0, 0, 0],
    [0, 0, 0, 1, 0],
    [0, 0, 0, 2, 0],
    [0, 1, 0, 1, 0],
    [0, 0, 0, 1, 1],
];

/// A point inside the default tables, on one of the two loaded documents.
fn base_point(windows: bool, key2: [usize; 5]) -> ParamIndices {
    let limits = DimensionTables::default().cardinalities();
    let mut indices = [0; 8];
    indices[0] = if windows { 2 } else { 0 };
    for (pos, &value) in key2.iter().enumerate() {
        indices[pos + 3] = value % limits[pos + 3];
    }
    ParamIndices::new(indices)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_dimension_pivot_is_ordered_and_bounded(
        windows in any::<bool>(),
        key2 in prop_oneof![
            proptest::sample::select(SAMPLE_POINTS.to_vec()),
            proptest::array::uniform5(0usize..64),
        ],
        dim in 0usize..8,
    ) {
        let mut session = session();
        let base = base_point(windows, key2);
        let dim = Dimension::ALL[dim];
        let Some(key) = session
            .pivot_at(&base.key1(), &base.key2(), PivotMode::Dimension(dim))
            .unwrap()
        else {
            return Ok(());
        };
        let table = session.pivot(&key).unwrap();
        prop_assert!(table.len() <= session.tables().cardinality(dim));
        prop_assert!(!table.is_empty());

        let mut positions = Vec::new();
        for crony in table.cronies() {
            let indices = session
                .group(crony.group)
                .and_then(|g| g.params().indices)
                .unwrap();
            for other in Dimension::ALL.into_iter().filter(|&d| d != dim) {
                prop_assert_eq!(indices.get(other), base.get(other));
            }
            positions.push(indices.get(dim));
        }
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(positions.contains(&base.get(dim)));
    }
}
