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

//! Leaf-wise arithmetic mean of structurally identical trials.
//!
//! The first trial seeds the accumulator; every following trial is added
//! leaf by leaf, and the accumulated values are divided by the trial count
//! at the end. Threads are matched by thread number, hex-resolved buckets
//! by their declared index and index-0 buckets by position. Any structural
//! disagreement abandons the whole average.

use crate::error::{PmError, Result};
use crate::params::ParameterSet;
use crate::report::{Access, Histogram, MemoryFields, TrialData};

/// Average the trials of one series.
///
/// A single trial is returned unchanged. Histograms are only averaged for
/// the access types the series' read/write ratio produces; the others are
/// dropped from the result.
pub fn average_trials(trials: &[&TrialData], params: &ParameterSet) -> Result<TrialData> {
    let (first, rest) = trials
        .split_first()
        .ok_or_else(|| PmError::malformed("average", "no trials to average"))?;

    let mut acc = (*first).clone();
    if !params.has_read() {
        acc.read = None;
    }
    if !params.has_write() {
        acc.write = None;
    }
    for access in expected_accesses(params) {
        if acc.histogram(access).is_none() {
            return Err(PmError::MissingHistogram {
                access,
                ratio: params.ratio_percent,
            });
        }
    }

    if rest.is_empty() {
        return Ok(acc);
    }

    for (offset, other) in rest.iter().enumerate() {
        let trial = offset + 2;
        accumulate(&mut acc, other, params)
            .map_err(|e| with_trial(e, trial))?;
    }

    divide(&mut acc, trials.len() as f64);
    acc.check_finite()?;
    Ok(acc)
}

fn expected_accesses(params: &ParameterSet) -> impl Iterator<Item = Access> + '_ {
    Access::BOTH.into_iter().filter(move |a| match a {
        Access::Read => params.has_read(),
        Access::Write => params.has_write(),
    })
}

fn with_trial(err: PmError, trial: usize) -> PmError {
    match err {
        PmError::MalformedData { context, message } => PmError::MalformedData {
            context: format!("trial {}: {}", trial, context),
            message,
        },
        other => other,
    }
}

fn accumulate(acc: &mut TrialData, other: &TrialData, params: &ParameterSet) -> Result<()> {
    for thread in &mut acc.threads {
        let source = other.thread(thread.thread_num).ok_or_else(|| {
            PmError::malformed(format!("thread {}", thread.thread_num), "missing in trial")
        })?;
        for (slot, value) in thread.leaves_mut().into_iter().zip(source.leaves()) {
            *slot += value;
        }
    }

    for access in expected_accesses(params) {
        let source = other.histogram(access).ok_or(PmError::MissingHistogram {
            access,
            ratio: params.ratio_percent,
        })?;
        if let Some(target) = acc.histogram_mut(access) {
            add_histogram(target, source)?;
        }
    }

    if acc.memory.len() != other.memory.len() {
        return Err(PmError::malformed(
            "sys_mem_info",
            format!(
                "expected {} snapshots, found {}",
                acc.memory.len(),
                other.memory.len()
            ),
        ));
    }
    let last = acc.memory.len().saturating_sub(1);
    for (position, (snap, source)) in acc.memory.iter_mut().zip(&other.memory).enumerate() {
        let context = format!("memory snapshot {}", snap.phase);
        add_fields(&mut snap.info, &source.info, &context)?;
        if position == last {
            snap.delta = None;
            continue;
        }
        match (snap.delta.as_mut(), source.delta.as_ref()) {
            (Some(delta), Some(src)) => add_fields(delta, src, &context)?,
            _ => return Err(PmError::malformed(context, "missing delta")),
        }
    }
    Ok(())
}

fn add_histogram(target: &mut Histogram, source: &Histogram) -> Result<()> {
    let access = target.access;
    for bucket in &mut target.buckets {
        let context = format!("{} histogram bucket {}", access, bucket.index);
        let src = source
            .bucket(bucket.index)
            .ok_or_else(|| PmError::malformed(context.clone(), "bucket missing"))?;
        bucket.sum_count += src.sum_count;
        match (bucket.hexes.as_mut(), src.hexes.as_ref()) {
            (Some(hexes), Some(src_hexes)) => {
                for (h, s) in hexes.iter_mut().zip(src_hexes) {
                    *h += s;
                }
            }
            (None, None) => {}
            _ => return Err(PmError::malformed(context, "hex sub-buckets missing")),
        }
    }
    if target.bucket0.len() != source.bucket0.len() {
        return Err(PmError::malformed(
            format!("{} histogram bucket 0", access),
            format!(
                "expected {} entries, found {}",
                target.bucket0.len(),
                source.bucket0.len()
            ),
        ));
    }
    for (low, src) in target.bucket0.iter_mut().zip(&source.bucket0) {
        low.sum_count += src.sum_count;
    }
    Ok(())
}

fn add_fields(target: &mut MemoryFields, source: &MemoryFields, context: &str) -> Result<()> {
    if target.platform() != source.platform() {
        return Err(PmError::malformed(context, "memory counters of different platforms"));
    }
    for (t, s) in target.values_mut().iter_mut().zip(source.values()) {
        *t += s;
    }
    Ok(())
}

fn divide(acc: &mut TrialData, n: f64) {
    for thread in &mut acc.threads {
        for leaf in thread.leaves_mut() {
            *leaf /= n;
        }
    }
    for histogram in acc.read.iter_mut().chain(acc.write.iter_mut()) {
        for bucket in &mut histogram.buckets {
            bucket.sum_count /= n;
            if let Some(hexes) = bucket.hexes.as_mut() {
                hexes.iter_mut().for_each(|h| *h /= n);
            }
        }
        for low in &mut histogram.bucket0 {
            low.sum_count /= n;
        }
    }
    for snap in &mut acc.memory {
        snap.info.values_mut().iter_mut().for_each(|v| *v /= n);
        if let Some(delta) = snap.delta.as_mut() {
            delta.values_mut().iter_mut().for_each(|v| *v /= n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RunConfig;
    use crate::report::{Bucket, LowBucket, MemorySnapshot, ThreadResult};
    use proptest::prelude::*;

    fn params(ratio: i32) -> ParameterSet {
        let mut p = ParameterSet::from_run("Fedora23_native", RunConfig::default());
        p.ratio_percent = ratio;
        p
    }

    fn histogram(access: Access, scale: f64) -> Histogram {
        let mut h = Histogram::new(access);
        h.bucket0.push(LowBucket {
            interval_lo: 0,
            interval_hi: 8,
            sum_count: scale,
        });
        for i in 1..=15u8 {
            let mut hexes = [0.0; 16];
            hexes[usize::from(i) % 16] = scale * f64::from(i);
            h.buckets.push(Bucket {
                index: i,
                interval_lo: i32::from(i) + 7,
                interval_hi: i32::from(i) + 8,
                sum_count: scale * f64::from(i),
                hexes: Some(hexes),
            });
        }
        for lo in 23..30 {
            h.bucket0.push(LowBucket {
                interval_lo: lo,
                interval_hi: lo + 1,
                sum_count: 0.0,
            });
        }
        h.bucket0.push(LowBucket {
            interval_lo: 30,
            interval_hi: 32,
            sum_count: scale,
        });
        h
    }

    fn trial(scale: f64) -> TrialData {
        TrialData {
            threads: (1..=2)
                .map(|n| ThreadResult {
                    thread_num: n,
                    netavg_us: scale,
                    latency_us: scale * 2.0,
                    samples: scale * 100.0,
                    ..ThreadResult::default()
                })
                .collect(),
            read: Some(histogram(Access::Read, scale)),
            write: Some(histogram(Access::Write, scale)),
            memory: vec![
                MemorySnapshot {
                    phase: "pre-run".into(),
                    info: MemoryFields::Linux([scale; 10]),
                    delta: Some(MemoryFields::Linux([-scale; 10])),
                },
                MemorySnapshot {
                    phase: "post-run".into(),
                    info: MemoryFields::Linux([scale * 3.0; 10]),
                    delta: None,
                },
            ],
        }
    }

    #[test]
    fn test_single_trial_is_unchanged() {
        let t = trial(4.0);
        let avg = average_trials(&[&t], &params(50)).unwrap();
        assert_eq!(avg, t);
    }

    #[test]
    fn test_mean_of_three() {
        let (a, b, c) = (trial(1.0), trial(2.0), trial(6.0));
        let avg = average_trials(&[&a, &b, &c], &params(50)).unwrap();
        assert_eq!(avg.threads[1].netavg_us, 3.0);
        assert_eq!(avg.threads[0].samples, 300.0);
        let read = avg.read.as_ref().unwrap();
        assert_eq!(read.bucket(4).unwrap().sum_count, 12.0);
        assert_eq!(read.bucket(4).unwrap().hexes.unwrap()[4], 12.0);
        assert_eq!(read.bucket0[0].sum_count, 3.0);
        assert_eq!(read.bucket0[8].sum_count, 3.0);
        assert_eq!(avg.memory[0].info.values()[0], 3.0);
        assert_eq!(avg.memory[0].delta.as_ref().unwrap().values()[9], -3.0);
        assert!(avg.memory[1].delta.is_none());
    }

    #[test]
    fn test_unexpected_histogram_dropped() {
        let (a, b) = (trial(1.0), trial(3.0));
        let avg = average_trials(&[&a, &b], &params(100)).unwrap();
        assert!(avg.write.is_none());
        assert_eq!(avg.read.unwrap().bucket0[0].sum_count, 2.0);
    }

    #[test]
    fn test_missing_histogram_reported() {
        let a = trial(1.0);
        let mut b = trial(1.0);
        b.write = None;
        let err = average_trials(&[&a, &b], &params(50)).unwrap_err();
        assert_eq!(
            err,
            PmError::MissingHistogram {
                access: Access::Write,
                ratio: 50
            }
        );

        let mut only = trial(1.0);
        only.read = None;
        assert!(matches!(
            average_trials(&[&only], &params(50)),
            Err(PmError::MissingHistogram { access: Access::Read, .. })
        ));
    }

    #[test]
    fn test_thread_mismatch() {
        let a = trial(1.0);
        let mut b = trial(1.0);
        b.threads.pop();
        let err = average_trials(&[&a, &b], &params(0)).unwrap_err();
        assert!(matches!(err, PmError::MalformedData { ref context, .. } if context == "trial 2: thread 2"));
    }

    #[test]
    fn test_bucket0_length_mismatch() {
        let a = trial(1.0);
        let mut b = trial(1.0);
        b.read.as_mut().unwrap().bucket0.pop();
        assert!(average_trials(&[&a, &b], &params(50)).is_err());
        // The write-only series never looks at the read histogram.
        assert!(average_trials(&[&a, &b], &params(0)).is_ok());
    }

    #[test]
    fn test_memory_platform_mismatch() {
        let a = trial(1.0);
        let mut b = trial(1.0);
        b.memory[1].info = MemoryFields::Windows([0.0; 5]);
        assert!(average_trials(&[&a, &b], &params(50)).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let a = trial(1.0);
        let mut b = trial(1.0);
        b.threads[0].overhead_us = f64::INFINITY;
        assert!(average_trials(&[&a, &b], &params(50)).is_err());
    }

    proptest! {
        #[test]
        fn prop_order_invariant(scales in proptest::collection::vec(0.0f64..1000.0, 2..6)) {
            let trials: Vec<TrialData> = scales.iter().map(|&s| trial(s)).collect();
            let forward: Vec<&TrialData> = trials.iter().collect();
            let backward: Vec<&TrialData> = trials.iter().rev().collect();
            let a = average_trials(&forward, &params(50)).unwrap();
            let b = average_trials(&backward, &params(50)).unwrap();
            let expected = scales.iter().sum::<f64>() / scales.len() as f64;
            prop_assert!((a.threads[0].netavg_us - expected).abs() < 1e-9);
            prop_assert!((a.threads[0].netavg_us - b.threads[0].netavg_us).abs() < 1e-9);
            let ha = a.write.as_ref().unwrap().bucket(7).unwrap().sum_count;
            let hb = b.write.as_ref().unwrap().bucket(7).unwrap().sum_count;
            prop_assert!((ha - hb).abs() < 1e-6);
        }
    }
}
