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

//! Builders that emit pmbench XML.
//!
//! Every numeric value is derived from a per-report `scale`, so a test can
//! predict the average of several reports without parsing them:
//!
//! | leaf                         | value                      |
//! |------------------------------|----------------------------|
//! | thread `j` `netavg_us`       | `scale * j`                |
//! | thread `j` `latency_us`      | `2 * scale * j`            |
//! | thread `j` `details_samples` | `1000 * scale`             |
//! | first index-0 bucket         | `10 * scale`               |
//! | bucket `i`, every hex        | `scale * i`                |
//! | last index-0 bucket          | `scale`                    |
//! | memory field `k`, info       | `100 * scale * (k + 1)`    |
//! | memory field `k`, delta      | `scale`                    |

use pmgraph_core::report::{LINUX_MEMORY_FIELDS, WINDOWS_MEMORY_FIELDS};
use pmgraph_core::{Access, Platform};
use std::fmt::Write;

/// Builder for one `pmbenchmark` report.
///
/// # Examples
///
/// ```
/// use pmgraph_test::fixtures::builders::ReportBuilder;
///
/// let xml = ReportBuilder::new().jobs(2).ratio(50).scale(3.0).pmbenchmark();
/// assert!(xml.starts_with("<pmbenchmark>"));
/// assert!(xml.contains("<result_thread thread_num=\"2\">"));
/// ```
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    scale: f64,
    jobs: u32,
    ratio: i32,
    mapsize: i32,
    delay: i32,
    cold: bool,
    mid_run: bool,
    platform: Platform,
    version_options: String,
    omit: Vec<Access>,
    short_bucket0: bool,
    skip_thread: Option<u32>,
    garbage_field: Option<&'static str>,
    missing_hex: Option<(i32, usize)>,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// A Linux report with one thread, ratio 50 and scale 1.
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            jobs: 1,
            ratio: 50,
            mapsize: 512,
            delay: 0,
            cold: false,
            mid_run: false,
            platform: Platform::Linux,
            version_options: "linux x86_64 rdtsc".to_string(),
            omit: Vec::new(),
            short_bucket0: false,
            skip_thread: None,
            garbage_field: None,
            missing_hex: None,
        }
    }

    /// Multiplier for every generated value.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn ratio(mut self, ratio: i32) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn mapsize(mut self, mapsize: i32) -> Self {
        self.mapsize = mapsize;
        self
    }

    pub fn delay(mut self, delay: i32) -> Self {
        self.delay = delay;
        self
    }

    /// Skip the warmup snapshot.
    pub fn cold(mut self, cold: bool) -> Self {
        self.cold = cold;
        self
    }

    /// Record a `mid-run` memory snapshot.
    pub fn mid_run(mut self, mid_run: bool) -> Self {
        self.mid_run = mid_run;
        self
    }

    /// Memory counter layout; also changes `version_options`.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        if platform == Platform::Windows {
            self.version_options = "Windows x64 qpc".to_string();
        }
        self
    }

    pub fn version_options(mut self, options: impl Into<String>) -> Self {
        self.version_options = options.into();
        self
    }

    /// Leave out the histogram of one access type.
    pub fn without_histogram(mut self, access: Access) -> Self {
        self.omit.push(access);
        self
    }

    /// Emit one index-0 bucket fewer than usual.
    pub fn short_bucket0(mut self) -> Self {
        self.short_bucket0 = true;
        self
    }

    /// Leave out one thread's results.
    pub fn skip_thread(mut self, thread_num: u32) -> Self {
        self.skip_thread = Some(thread_num);
        self
    }

    /// Replace the text of one thread result element with garbage.
    pub fn garbage(mut self, element: &'static str) -> Self {
        self.garbage_field = Some(element);
        self
    }

    /// Leave out hex `index` of histogram bucket `bucket`.
    pub fn missing_hex(mut self, bucket: i32, index: usize) -> Self {
        self.missing_hex = Some((bucket, index));
        self
    }

    fn has(&self, access: Access) -> bool {
        let by_ratio = match access {
            Access::Read => self.ratio > 0,
            Access::Write => self.ratio < 100,
        };
        by_ratio && !self.omit.contains(&access)
    }

    fn num(&self, element: &str, value: f64) -> String {
        if self.garbage_field == Some(element) {
            format!("<{0}>n/a</{0}>", element)
        } else {
            format!("<{0}>{1}</{0}>", element, value)
        }
    }

    /// The `<report>` element.
    pub fn report(&self) -> String {
        let s = self.scale;
        let mut xml = String::from("<report><signature><pmbench_info>");
        let _ = write!(
            xml,
            "<version_number>0.8</version_number><version_options>{}</version_options>",
            self.version_options
        );
        xml.push_str("</pmbench_info><params>");
        let _ = write!(
            xml,
            "<duration>10</duration><mapsize>{}</mapsize><setsize>{}</setsize>\
             <initialize>0</initialize><shape>1.000000</shape><delay>{}</delay>\
             <quiet>1</quiet><cold>{}</cold><jobs>{}</jobs><offset>0</offset>\
             <ratio>{}</ratio><pattern>uniform</pattern><access>histogram</access>\
             <tsops>rdtsc</tsops><xalloc_mib>0</xalloc_mib><xalloc_path></xalloc_path>",
            self.mapsize,
            self.mapsize,
            self.delay,
            u8::from(self.cold),
            self.jobs,
            self.ratio
        );
        xml.push_str("</params></signature><result>");

        for j in 1..=self.jobs {
            if self.skip_thread == Some(j) {
                continue;
            }
            let base = s * f64::from(j);
            let _ = write!(xml, "<result_thread thread_num=\"{}\">", j);
            let _ = write!(
                xml,
                "<result_netavg>{}{}</result_netavg>",
                self.num("netavg_us", base),
                self.num("netavg_clk", base * 3.0)
            );
            let _ = write!(
                xml,
                "<result_details><details_latency>{}{}</details_latency>{}\
                 <details_overhead>{}{}</details_overhead>{}</result_details>",
                self.num("latency_us", base * 2.0),
                self.num("latency_clk", base * 6.0),
                self.num("details_samples", s * 1000.0),
                self.num("overhead_us", s * 0.5),
                self.num("overhead_clk", s * 1.5),
                self.num("details_total", s * 2000.0)
            );
            xml.push_str("</result_thread>");
        }
        xml.push_str("</result><statistics>");
        for access in Access::BOTH {
            if self.has(access) {
                xml.push_str(&self.histogram(access));
            }
        }
        xml.push_str("</statistics>");
        xml.push_str(&self.memory());
        xml.push_str("</report>");
        xml
    }

    fn histogram(&self, access: Access) -> String {
        let s = self.scale;
        let mut xml = format!("<histogram type=\"{}\">", access.as_str());
        xml.push_str(&bucket(0, 0, 8, 10.0 * s, None, None));
        for i in 1..=15 {
            let hex = s * f64::from(i);
            let skip = self.missing_hex.filter(|&(b, _)| b == i).map(|(_, j)| j);
            xml.push_str(&bucket(i, i + 7, i + 8, hex * 16.0, Some(hex), skip));
        }
        let tail = if self.short_bucket0 { 6 } else { 7 };
        for i in 0..tail {
            xml.push_str(&bucket(0, i + 23, i + 24, 0.0, None, None));
        }
        xml.push_str(&bucket(0, 30, 32, s, None, None));
        xml.push_str("</histogram>");
        xml
    }

    fn phases(&self) -> Vec<&'static str> {
        let mut phases = Vec::new();
        if !self.cold {
            phases.push("pre-warmup");
        }
        phases.push("pre-run");
        if self.mid_run {
            phases.push("mid-run");
        }
        phases.push("post-run");
        phases
    }

    fn memory(&self) -> String {
        let fields: &[&str] = match self.platform {
            Platform::Linux => &LINUX_MEMORY_FIELDS,
            Platform::Windows => &WINDOWS_MEMORY_FIELDS,
        };
        let phases = self.phases();
        let mut xml = String::from("<sys_mem_info>");
        for (n, phase) in phases.iter().enumerate() {
            let _ = write!(xml, "<sys_mem_item name=\"{}\"><mem_item_info>", phase);
            for (k, field) in fields.iter().enumerate() {
                let _ = write!(xml, "<{0}>{1}</{0}>", field, 100.0 * self.scale * (k as f64 + 1.0));
            }
            xml.push_str("</mem_item_info>");
            if n + 1 < phases.len() {
                xml.push_str("<mem_item_delta>");
                for field in fields {
                    let _ = write!(xml, "<{0}>{1}</{0}>", field, self.scale);
                }
                xml.push_str("</mem_item_delta>");
            }
            xml.push_str("</sys_mem_item>");
        }
        xml.push_str("</sys_mem_info>");
        xml
    }

    /// The `<pmbenchmark>` element wrapping the report.
    pub fn pmbenchmark(&self) -> String {
        format!("<pmbenchmark>{}</pmbenchmark>", self.report())
    }

    /// A standalone report document, as written by a single pmbench run.
    pub fn document(&self) -> String {
        format!("<?xml version=\"1.0\"?>\n{}", self.pmbenchmark())
    }
}

fn bucket(index: i32, lo: i32, hi: i32, sum: f64, hex: Option<f64>, skip: Option<usize>) -> String {
    let mut xml = format!(
        "<histo_bucket index=\"{}\"><bucket_interval><interval_lo>{}</interval_lo>\
         <interval_hi>{}</interval_hi></bucket_interval><sum_count>{}</sum_count>",
        index, lo, hi, sum
    );
    if let Some(hex) = hex {
        xml.push_str("<bucket_hexes>");
        for j in (0..16).filter(|&j| Some(j) != skip) {
            let _ = write!(xml, "<hex index=\"{}\">{}</hex>", j, hex);
        }
        xml.push_str("</bucket_hexes>");
    }
    xml.push_str("</histo_bucket>");
    xml
}

/// One series of a result set: its position and its trials.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    mapsize: i32,
    jobs: u32,
    delay: i32,
    ratio: i32,
    nice: i32,
    trials: Vec<ReportBuilder>,
}

impl SeriesBuilder {
    /// A series at the given `test_*` iteration values.
    pub fn new(mapsize: i32, jobs: u32, delay: i32, ratio: i32, nice: i32) -> Self {
        Self {
            mapsize,
            jobs,
            delay,
            ratio,
            nice,
            trials: Vec::new(),
        }
    }

    /// Add a trial; its run parameters are aligned with the series.
    pub fn trial(mut self, report: ReportBuilder) -> Self {
        let report = report
            .mapsize(self.mapsize)
            .jobs(self.jobs)
            .delay(self.delay)
            .ratio(self.ratio);
        self.trials.push(report);
        self
    }

    /// Add one trial per scale.
    pub fn trials(self, template: &ReportBuilder, scales: &[f64]) -> Self {
        scales
            .iter()
            .fold(self, |series, &s| series.trial(template.clone().scale(s)))
    }

    fn xml(&self) -> String {
        let mut xml = format!(
            "<test_mapsize iter=\"{}\"><test_jobs iter=\"{}\"><test_delay iter=\"{}\">\
             <test_ratio iter=\"{}\"><test_nice iter=\"{}\">",
            self.mapsize, self.jobs, self.delay, self.ratio, self.nice
        );
        for (n, trial) in self.trials.iter().enumerate() {
            let _ = write!(
                xml,
                "<test_round iter=\"{}\">{}</test_round>",
                n + 1,
                trial.pmbenchmark()
            );
        }
        xml.push_str("</test_nice></test_ratio></test_delay></test_jobs></test_mapsize>");
        xml
    }
}

/// Builder for a `benchmark_set` result document.
///
/// # Examples
///
/// ```
/// use pmgraph_test::fixtures::builders::{BenchmarkSetBuilder, ReportBuilder, SeriesBuilder};
///
/// let xml = BenchmarkSetBuilder::new()
///     .series(SeriesBuilder::new(512, 1, 0, 50, 0).trials(&ReportBuilder::new(), &[1.0, 2.0]))
///     .build();
/// assert!(xml.contains("<test_round iter=\"2\">"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BenchmarkSetBuilder {
    series: Vec<SeriesBuilder>,
}

impl BenchmarkSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(mut self, series: SeriesBuilder) -> Self {
        self.series.push(series);
        self
    }

    pub fn build(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<benchmark_set><test_content>");
        for series in &self.series {
            xml.push_str(&series.xml());
        }
        xml.push_str("</test_content></benchmark_set>");
        xml
    }
}
