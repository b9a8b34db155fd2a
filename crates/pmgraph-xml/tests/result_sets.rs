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

//! Loading result sets from disk and averaging their series.

use pmgraph_core::{
    average_trials, series_points, Access, CancellationToken, DimensionTables, ParamIndices,
    ParameterSet, PmError, Resolution, TrialData, FINE_POINTS,
};
use pmgraph_test::fixtures::builders::{BenchmarkSetBuilder, ReportBuilder, SeriesBuilder};
use pmgraph_test::{approx_eq, fixtures};
use pmgraph_xml::{DocumentStore, SeriesExtract};

fn loaded_store() -> DocumentStore {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_sample_result_set(dir.path()).unwrap();
    let mut store = DocumentStore::default();
    let summary = store
        .load_folder(dir.path(), &DimensionTables::default(), &CancellationToken::new())
        .unwrap();
    assert_eq!(summary.loaded.len(), 2);
    store
}

fn series(store: &DocumentStore, key1: &str, key2: &str) -> (ParameterSet, SeriesExtract) {
    let indices = ParamIndices::from_keys(key1, key2).unwrap();
    let extract_params =
        ParameterSet::from_indices(indices, &DimensionTables::default(), Default::default())
            .unwrap();
    let extract = store.extract(key1, &extract_params).unwrap().unwrap();
    let params = ParameterSet::from_indices(
        indices,
        &DimensionTables::default(),
        extract.run.clone(),
    )
    .unwrap();
    (params, extract)
}

#[test]
fn average_of_loaded_series_is_the_mean() {
    let store = loaded_store();
    let (params, extract) = series(&store, "0_0_0", "0_0_0_1_0");
    assert_eq!(extract.failures, 0);
    let refs: Vec<&TrialData> = extract.trials.iter().collect();
    let average = average_trials(&refs, &params).unwrap();

    // scales 1, 2 and 6 average to 3
    let thread = average.thread(1).unwrap();
    assert!(approx_eq(thread.netavg_us, 3.0));
    assert!(approx_eq(thread.samples, 3000.0));
    let read = average.histogram(Access::Read).unwrap();
    assert!(approx_eq(read.bucket(5).unwrap().hexes.unwrap()[0], 15.0));
    assert!(approx_eq(read.first_low().unwrap().sum_count, 30.0));
    assert!(approx_eq(average.memory[1].info.values()[0], 300.0));
    assert!(average.memory.last().unwrap().delta.is_none());
}

#[test]
fn windows_series_average() {
    let store = loaded_store();
    let (params, extract) = series(&store, "2_0_0", "0_0_0_2_0");
    let refs: Vec<&TrialData> = extract.trials.iter().collect();
    let average = average_trials(&refs, &params).unwrap();
    assert!(average.write.is_none());
    assert_eq!(average.memory[0].info.values().len(), 5);
}

#[test]
fn inconsistent_series_fails_to_average() {
    let store = loaded_store();
    // nice -20: the second trial has no write histogram
    let (params, extract) = series(&store, "0_0_0", "0_0_0_1_1");
    let refs: Vec<&TrialData> = extract.trials.iter().collect();
    let err = average_trials(&refs, &params).unwrap_err();
    assert!(matches!(
        err,
        PmError::MissingHistogram {
            access: Access::Write,
            ..
        }
    ));
}

#[test]
fn missing_hex_reads_as_zero_and_still_averages() {
    let template = ReportBuilder::new();
    let xml = BenchmarkSetBuilder::new()
        .series(
            SeriesBuilder::new(512, 1, 0, 50, 19)
                .trial(template.clone().missing_hex(4, 2))
                .trial(template.scale(2.0)),
        )
        .build();
    let mut store = DocumentStore::default();
    store.insert("0_0_0", "partial.xml", xml).unwrap();

    let (params, extract) = series(&store, "0_0_0", "0_0_0_1_0");
    // one hex per histogram
    assert_eq!(extract.failures, 2);
    let first = extract.trials[0].histogram(Access::Read).unwrap();
    assert_eq!(first.bucket(4).unwrap().hexes.unwrap()[2], 0.0);
    assert_eq!(series_points(first, Resolution::Fine).len(), FINE_POINTS);

    let refs: Vec<&TrialData> = extract.trials.iter().collect();
    let average = average_trials(&refs, &params).unwrap();
    let read = average.histogram(Access::Read).unwrap();
    let hexes = read.bucket(4).unwrap().hexes.unwrap();
    assert!(approx_eq(hexes[2], 4.0));
    assert!(approx_eq(hexes[3], 6.0));
    assert_eq!(series_points(read, Resolution::Fine).len(), FINE_POINTS);
}
