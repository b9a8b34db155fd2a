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

//! Conversion of latency histograms into chart point sequences.
//!
//! Points are emitted for every bucket, including empty ones, so that a
//! series' length alone tells its resolution: a coarse series has
//! [`COARSE_POINTS`] points and a fine one [`FINE_POINTS`] for a histogram
//! with the standard nine index-0 buckets.
//!
//! The x coordinate is the latency `2^e` for an exponent `e` taken from the
//! bucket interval, so bucket `i` spans `[2^(i+7), 2^(i+8))`.

use crate::report::{Access, Histogram, HEXES_PER_BUCKET};
use std::fmt;

/// Points in a coarse series of a standard histogram.
pub const COARSE_POINTS: usize = 25;
/// Points in a fine series of a standard histogram.
pub const FINE_POINTS: usize = 250;

/// Exponent at which the sub-`2^8` bucket is drawn.
const FIRST_BUCKET_EXPONENT: f64 = 8.0;
/// Exponent that maps one latency unit to one second.
const SECONDS_EXPONENT: f64 = 30.0;

/// Level of detail of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resolution {
    /// One point per bucket.
    Coarse,
    /// One point per hex sub-bucket.
    #[default]
    Fine,
}

impl Resolution {
    /// Resolution of a series with `n` points, if it is one of the standard lengths.
    pub fn from_point_count(n: usize) -> Option<Resolution> {
        match n {
            COARSE_POINTS => Some(Resolution::Coarse),
            FINE_POINTS => Some(Resolution::Fine),
            _ => None,
        }
    }
}

/// Chart a series is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartArea {
    /// Small overview chart, coarse points.
    Mini,
    /// Main chart, fine points.
    #[default]
    Full,
    /// Logarithmic chart, fine points with zero counts lifted to one.
    Log,
}

impl ChartArea {
    pub fn resolution(self) -> Resolution {
        match self {
            ChartArea::Mini => Resolution::Coarse,
            ChartArea::Full | ChartArea::Log => Resolution::Fine,
        }
    }
}

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesPoint {
    /// Latency, `2^exponent`.
    pub x: f64,
    /// Sample count.
    pub y: f64,
}

impl SeriesPoint {
    fn at_exponent(exponent: f64, y: f64) -> Self {
        Self {
            x: exponent.exp2(),
            y,
        }
    }

    /// Exponent of the latency.
    pub fn exponent(&self) -> f64 {
        self.x.log2()
    }

    /// Latency in seconds.
    pub fn seconds(&self) -> f64 {
        exponent_to_seconds(self.exponent())
    }
}

/// Convert a latency exponent into seconds.
pub fn exponent_to_seconds(exponent: f64) -> f64 {
    (exponent - SECONDS_EXPONENT).exp2()
}

/// A named series ready to hand to a chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSeries {
    /// `"<trial name> (read)"` or `"<trial name> (write)"`.
    pub name: String,
    pub access: Access,
    pub area: ChartArea,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    /// Build the series of one histogram for a chart area.
    pub fn build(trial_name: &str, histogram: &Histogram, area: ChartArea) -> Self {
        let mut points = series_points(histogram, area.resolution());
        if area == ChartArea::Log {
            for p in &mut points {
                if p.y == 0.0 {
                    p.y = 1.0;
                }
            }
        }
        Self {
            name: series_name(trial_name, histogram.access),
            access: histogram.access,
            area,
            points,
        }
    }

    /// Name of the series with the same trial and the other access type.
    pub fn partner_name(&self) -> Option<String> {
        let base = self
            .name
            .strip_suffix(&format!(" ({})", self.access.as_str()))?;
        Some(series_name(base, self.access.partner()))
    }
}

impl fmt::Display for ChartSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} points]", self.name, self.points.len())
    }
}

/// Display name of a trial's series.
pub fn series_name(trial_name: &str, access: Access) -> String {
    format!("{} ({})", trial_name, access.as_str())
}

/// Chart points of a histogram at the requested resolution.
pub fn series_points(histogram: &Histogram, resolution: Resolution) -> Vec<SeriesPoint> {
    let capacity = match resolution {
        Resolution::Coarse => COARSE_POINTS,
        Resolution::Fine => FINE_POINTS,
    };
    let mut points = Vec::with_capacity(capacity);

    // The sub-2^8 bucket is drawn twice so the line starts flat.
    if let Some(first) = histogram.first_low() {
        points.push(SeriesPoint::at_exponent(FIRST_BUCKET_EXPONENT, first.sum_count));
        points.push(SeriesPoint::at_exponent(FIRST_BUCKET_EXPONENT, first.sum_count));
    }

    for bucket in &histogram.buckets {
        let lo = f64::from(bucket.interval_lo);
        let hi = f64::from(bucket.interval_hi);
        match (resolution, bucket.hexes) {
            (Resolution::Fine, Some(hexes)) => {
                let width = (hi - lo) / HEXES_PER_BUCKET as f64;
                for (j, count) in hexes.iter().enumerate() {
                    let exponent = lo + (j as f64 + 0.5) * width;
                    points.push(SeriesPoint::at_exponent(exponent, *count));
                }
            }
            _ => points.push(SeriesPoint::at_exponent((lo + hi) / 2.0, bucket.sum_count)),
        }
    }

    for low in histogram.tail_low() {
        let mid = f64::from(low.interval_lo + low.interval_hi) / 2.0;
        points.push(SeriesPoint::at_exponent(mid, low.sum_count));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Bucket, LowBucket};

    fn standard(access: Access) -> Histogram {
        let mut h = Histogram::new(access);
        h.bucket0.push(LowBucket {
            interval_lo: 0,
            interval_hi: 8,
            sum_count: 0.0,
        });
        for i in 1..=15u8 {
            let mut hexes = [0.0; 16];
            hexes[0] = f64::from(i);
            h.buckets.push(Bucket {
                index: i,
                interval_lo: i32::from(i) + 7,
                interval_hi: i32::from(i) + 8,
                sum_count: f64::from(i),
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
            sum_count: 2.0,
        });
        h
    }

    #[test]
    fn test_point_counts() {
        let h = standard(Access::Read);
        let coarse = series_points(&h, Resolution::Coarse);
        let fine = series_points(&h, Resolution::Fine);
        assert_eq!(coarse.len(), COARSE_POINTS);
        assert_eq!(fine.len(), FINE_POINTS);
        assert_eq!(Resolution::from_point_count(coarse.len()), Some(Resolution::Coarse));
        assert_eq!(Resolution::from_point_count(fine.len()), Some(Resolution::Fine));
        assert_eq!(Resolution::from_point_count(26), None);
    }

    #[test]
    fn test_coarse_coordinates() {
        let points = series_points(&standard(Access::Read), Resolution::Coarse);
        assert_eq!(points[0].x, 256.0);
        assert_eq!(points[1].x, 256.0);
        // Bucket 1 covers [2^8, 2^9).
        assert!((points[2].exponent() - 8.5).abs() < 1e-12);
        assert_eq!(points[2].y, 1.0);
        assert!((points[16].exponent() - 22.5).abs() < 1e-12);
        assert_eq!(points[24].x, 2f64.powi(31));
        assert_eq!(points[24].y, 2.0);
    }

    #[test]
    fn test_fine_coordinates_within_bucket() {
        let points = series_points(&standard(Access::Read), Resolution::Fine);
        for i in 1..=15usize {
            let lo = (i + 7) as f64;
            for j in 0..16 {
                let p = points[2 + (i - 1) * 16 + j];
                assert!(p.x >= lo.exp2() && p.x < (lo + 1.0).exp2());
            }
        }
        assert_eq!(points[2].y, 1.0);
        assert_eq!(points[3].y, 0.0);
    }

    #[test]
    fn test_log_area_lifts_zero() {
        let h = standard(Access::Write);
        let series = ChartSeries::build("Trial 1", &h, ChartArea::Log);
        assert_eq!(series.name, "Trial 1 (write)");
        assert!(series.points.iter().all(|p| p.y >= 1.0));
        assert_eq!(series.partner_name().as_deref(), Some("Trial 1 (read)"));

        let mini = ChartSeries::build("Trial 1", &h, ChartArea::Mini);
        assert_eq!(mini.points.len(), COARSE_POINTS);
        assert_eq!(mini.points[0].y, 0.0);
    }

    #[test]
    fn test_seconds() {
        assert_eq!(exponent_to_seconds(30.0), 1.0);
        let p = SeriesPoint::at_exponent(20.0, 0.0);
        assert!((p.seconds() - 2f64.powi(-10)).abs() < 1e-15);
    }
}
