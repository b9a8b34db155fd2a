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

//! Conversion of `<report>` elements into [`TrialData`].
//!
//! Parsing is lenient: unreadable numbers become zero through [`SafeXml`].
//! Only the shape of the tree (which elements exist) is taken literally;
//! whether that shape is consistent across trials is decided by averaging.

use crate::accessor::{select_node, select_nodes, SafeXml};
use pmgraph_core::report::HEXES_PER_BUCKET;
use pmgraph_core::{
    Access, Bucket, Histogram, LowBucket, MemoryFields, MemorySnapshot, Platform, RunConfig,
    ThreadResult, TrialData,
};
use roxmltree::Node;
use tracing::debug;

/// Parse the run options below a `signature/params` element.
pub fn parse_run_config(xml: &SafeXml, params: Node<'_, '_>) -> RunConfig {
    RunConfig {
        duration: xml.to_long(params, "duration"),
        mapsize: xml.to_long(params, "mapsize"),
        setsize: xml.to_long(params, "setsize"),
        initialize: xml.to_long(params, "initialize"),
        shape: xml.to_double(params, "shape"),
        delay: xml.to_long(params, "delay"),
        quiet: xml.to_long(params, "quiet"),
        cold: xml.to_long(params, "cold"),
        jobs: xml.to_long(params, "jobs"),
        offset: xml.to_long(params, "offset"),
        ratio: xml.to_long(params, "ratio"),
        pattern: xml.string(params, "pattern"),
        access: xml.string(params, "access"),
        tsops: xml.string(params, "tsops"),
        xalloc_mib: xml.to_long(params, "xalloc_mib"),
        xalloc_path: xml.string(params, "xalloc_path"),
    }
}

/// Run options of a `<report>`, or defaults when it has no signature.
pub fn report_run_config(xml: &SafeXml, report: Node<'_, '_>) -> RunConfig {
    match select_node(report, "signature/params") {
        Some(params) => parse_run_config(xml, params),
        None => {
            debug!("report without signature/params");
            RunConfig::default()
        }
    }
}

/// Parse everything measured in one `<report>`.
pub fn parse_trial(xml: &SafeXml, report: Node<'_, '_>, platform: Platform) -> TrialData {
    let threads = select_nodes(report, "result/result_thread")
        .into_iter()
        .map(|t| parse_thread(xml, t))
        .collect();

    let mut data = TrialData {
        threads,
        read: None,
        write: None,
        memory: parse_memory(xml, report, platform),
    };
    for access in Access::BOTH {
        let path = format!("statistics/histogram[@type='{}']", access.as_str());
        let histogram = select_node(report, &path).map(|h| parse_histogram(xml, h, access));
        match access {
            Access::Read => data.read = histogram,
            Access::Write => data.write = histogram,
        }
    }
    data
}

fn parse_thread(xml: &SafeXml, node: Node<'_, '_>) -> ThreadResult {
    ThreadResult {
        thread_num: u32::try_from(xml.attr_int(node, "thread_num")).unwrap_or(0),
        netavg_us: xml.to_double(node, "result_netavg/netavg_us"),
        netavg_clk: xml.to_double(node, "result_netavg/netavg_clk"),
        latency_us: xml.to_double(node, "result_details/details_latency/latency_us"),
        latency_clk: xml.to_double(node, "result_details/details_latency/latency_clk"),
        samples: xml.to_double(node, "result_details/details_samples"),
        overhead_us: xml.to_double(node, "result_details/details_overhead/overhead_us"),
        overhead_clk: xml.to_double(node, "result_details/details_overhead/overhead_clk"),
        total: xml.to_double(node, "result_details/details_total"),
    }
}

/// Parse a `<histogram>` element.
///
/// `histo_bucket` children with index 0 become [`LowBucket`]s in document
/// order; the others become [`Bucket`]s whose hexes are placed by their own
/// `index` attribute.
pub fn parse_histogram(xml: &SafeXml, node: Node<'_, '_>, access: Access) -> Histogram {
    let mut histogram = Histogram::new(access);
    for bucket in select_nodes(node, "histo_bucket") {
        let index = xml.attr_int(bucket, "index");
        let interval_lo = xml.to_int(bucket, "bucket_interval/interval_lo");
        let interval_hi = xml.to_int(bucket, "bucket_interval/interval_hi");
        let sum_count = xml.to_double(bucket, "sum_count");
        if index == 0 {
            histogram.bucket0.push(LowBucket {
                interval_lo,
                interval_hi,
                sum_count,
            });
            continue;
        }
        let Ok(index) = u8::try_from(index) else {
            debug!(index, "histogram bucket index out of range");
            continue;
        };
        histogram.buckets.push(Bucket {
            index,
            interval_lo,
            interval_hi,
            sum_count,
            hexes: parse_hexes(xml, bucket),
        });
    }
    histogram
}

/// Hex sub-bucket counts of a bucket, `None` when it carries no hexes at all.
///
/// Indices absent from a partial `bucket_hexes` read as zero and count as
/// failed reads.
fn parse_hexes(xml: &SafeXml, bucket: Node<'_, '_>) -> Option<[f64; HEXES_PER_BUCKET]> {
    let nodes = select_nodes(bucket, "bucket_hexes/hex");
    if nodes.is_empty() {
        return None;
    }
    let mut hexes = [0.0; HEXES_PER_BUCKET];
    let mut seen = [false; HEXES_PER_BUCKET];
    for hex in nodes {
        let Ok(j) = usize::try_from(xml.attr_int(hex, "index")) else {
            continue;
        };
        if j < HEXES_PER_BUCKET {
            hexes[j] = xml.to_double(hex, "");
            seen[j] = true;
        }
    }
    for (j, seen) in seen.into_iter().enumerate() {
        if !seen {
            xml.missing(bucket, &format!("bucket_hexes/hex[{j}]"));
        }
    }
    Some(hexes)
}

/// Parse the `sys_mem_info` snapshots of a report.
pub fn parse_memory(xml: &SafeXml, report: Node<'_, '_>, platform: Platform) -> Vec<MemorySnapshot> {
    select_nodes(report, "sys_mem_info/sys_mem_item")
        .into_iter()
        .map(|item| MemorySnapshot {
            phase: item.attribute("name").unwrap_or("").to_string(),
            info: parse_fields(xml, select_node(item, "mem_item_info"), item, platform),
            delta: select_node(item, "mem_item_delta")
                .map(|delta| parse_fields(xml, Some(delta), item, platform)),
        })
        .collect()
}

fn parse_fields(
    xml: &SafeXml,
    node: Option<Node<'_, '_>>,
    item: Node<'_, '_>,
    platform: Platform,
) -> MemoryFields {
    let mut fields = MemoryFields::zeroed(platform);
    let Some(node) = node else {
        debug!(phase = item.attribute("name"), "memory snapshot without info");
        return fields;
    };
    for (value, name) in fields
        .values_mut()
        .iter_mut()
        .zip(MemoryFields::names(platform))
    {
        *value = xml.to_double(node, name);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmgraph_test::ReportBuilder;
    use roxmltree::Document;

    fn parse(builder: &ReportBuilder, platform: Platform) -> (TrialData, usize) {
        let text = builder.document();
        let doc = Document::parse(&text).unwrap();
        let report = select_node(doc.root_element(), "report").unwrap();
        let xml = SafeXml::new();
        let data = parse_trial(&xml, report, platform);
        (data, xml.failures())
    }

    #[test]
    fn test_threads() {
        let (data, failures) = parse(&ReportBuilder::new().jobs(2).scale(2.0), Platform::Linux);
        assert_eq!(failures, 0);
        assert_eq!(data.threads.len(), 2);
        let t2 = data.thread(2).unwrap();
        assert_eq!(t2.netavg_us, 4.0);
        assert_eq!(t2.netavg_clk, 12.0);
        assert_eq!(t2.latency_us, 8.0);
        assert_eq!(t2.samples, 2000.0);
        assert_eq!(t2.overhead_clk, 3.0);
        assert_eq!(t2.total, 4000.0);
    }

    #[test]
    fn test_histograms() {
        let (data, _) = parse(&ReportBuilder::new().scale(3.0), Platform::Linux);
        let read = data.read.as_ref().unwrap();
        assert_eq!(read.access, Access::Read);
        assert_eq!(read.buckets.len(), 15);
        assert_eq!(read.bucket0.len(), 9);
        assert_eq!(read.first_low().unwrap().sum_count, 30.0);
        assert_eq!(read.tail_low().last().unwrap().interval_hi, 32);

        let b4 = read.bucket(4).unwrap();
        assert_eq!((b4.interval_lo, b4.interval_hi), (11, 12));
        assert_eq!(b4.sum_count, 192.0);
        assert_eq!(b4.hexes.unwrap(), [12.0; 16]);
        assert!(data.write.is_some());
    }

    #[test]
    fn test_histograms_follow_document() {
        let (data, _) = parse(&ReportBuilder::new().ratio(100), Platform::Linux);
        assert!(data.read.is_some());
        assert!(data.write.is_none());
    }

    #[test]
    fn test_incomplete_hexes() {
        let text = r#"<histogram type="read"><histo_bucket index="1">
            <bucket_interval><interval_lo>8</interval_lo><interval_hi>9</interval_hi></bucket_interval>
            <sum_count>2</sum_count>
            <bucket_hexes><hex index="0">1</hex><hex index="3">1</hex></bucket_hexes>
        </histo_bucket></histogram>"#;
        let doc = Document::parse(text).unwrap();
        let xml = SafeXml::new();
        let h = parse_histogram(&xml, doc.root_element(), Access::Read);
        assert_eq!(h.buckets.len(), 1);
        assert_eq!(h.buckets[0].sum_count, 2.0);

        let hexes = h.buckets[0].hexes.unwrap();
        assert_eq!(hexes[0], 1.0);
        assert_eq!(hexes[3], 1.0);
        assert_eq!(hexes.iter().sum::<f64>(), 2.0);
        assert_eq!(xml.failures(), 14);
    }

    #[test]
    fn test_bucket_without_hexes() {
        let text = r#"<histogram type="read"><histo_bucket index="2">
            <bucket_interval><interval_lo>9</interval_lo><interval_hi>10</interval_hi></bucket_interval>
            <sum_count>4</sum_count>
        </histo_bucket></histogram>"#;
        let doc = Document::parse(text).unwrap();
        let xml = SafeXml::new();
        let h = parse_histogram(&xml, doc.root_element(), Access::Read);
        assert!(h.buckets[0].hexes.is_none());
        assert_eq!(xml.failures(), 0);
    }

    #[test]
    fn test_memory_linux() {
        let (data, _) = parse(&ReportBuilder::new().mid_run(true), Platform::Linux);
        let phases: Vec<&str> = data.memory.iter().map(|m| m.phase.as_str()).collect();
        assert_eq!(phases, ["pre-warmup", "pre-run", "mid-run", "post-run"]);
        assert_eq!(data.memory[0].info.values()[2], 300.0);
        assert_eq!(data.memory[0].delta.as_ref().unwrap().values(), &[1.0; 10]);
        assert!(data.memory[3].delta.is_none());
    }

    #[test]
    fn test_memory_windows_cold() {
        let builder = ReportBuilder::new().platform(Platform::Windows).cold(true);
        let (data, failures) = parse(&builder, Platform::Windows);
        assert_eq!(failures, 0);
        assert_eq!(data.memory.len(), 2);
        assert_eq!(data.memory[0].info.platform(), Platform::Windows);
        assert_eq!(data.memory[0].info.values(), &[100.0, 200.0, 300.0, 400.0, 500.0]);
    }

    #[test]
    fn test_garbage_becomes_zero() {
        let (data, failures) = parse(&ReportBuilder::new().garbage("latency_us"), Platform::Linux);
        assert_eq!(failures, 1);
        assert_eq!(data.threads[0].latency_us, 0.0);
        assert_eq!(data.threads[0].netavg_us, 1.0);
    }

    #[test]
    fn test_run_config() {
        let text = ReportBuilder::new().jobs(8).ratio(0).cold(true).document();
        let doc = Document::parse(&text).unwrap();
        let report = select_node(doc.root_element(), "report").unwrap();
        let run = report_run_config(&SafeXml::new(), report);
        assert_eq!(run.jobs, 8);
        assert_eq!(run.ratio, 0);
        assert_eq!(run.mapsize, 512);
        assert_eq!(run.shape, 1.0);
        assert_eq!(run.pattern, "uniform");
        assert!(run.is_cold());
    }
}
