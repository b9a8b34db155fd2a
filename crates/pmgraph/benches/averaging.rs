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

//! Averaging benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pmgraph::xml::parse_single_report;
use pmgraph::{average_trials, TrialData};
use pmgraph_test::ReportBuilder;

fn trials(count: usize, jobs: u32) -> (pmgraph::ParameterSet, Vec<TrialData>) {
    let reports: Vec<_> = (0..count)
        .map(|i| {
            let text = ReportBuilder::new()
                .jobs(jobs)
                .scale(1.0 + i as f64)
                .document();
            parse_single_report("bench", &text).expect("fixture parses")
        })
        .collect();
    let params = reports[0].params();
    (params, reports.into_iter().map(|r| r.trial).collect())
}

fn bench_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_trials");
    for &(count, jobs) in &[(3, 1), (10, 1), (10, 8)] {
        let (params, data) = trials(count, jobs);
        let refs: Vec<&TrialData> = data.iter().collect();
        group.bench_with_input(
            BenchmarkId::new(format!("{}_threads", jobs), count),
            &refs,
            |b, refs| b.iter(|| average_trials(black_box(refs), &params)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_average);
criterion_main!(benches);
