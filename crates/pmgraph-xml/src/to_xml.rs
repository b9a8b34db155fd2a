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

//! Serialization of a trial back into pmbench report XML.
//!
//! Used to save synthesized averages in the same format pmbench writes,
//! so they can be imported again like any other report.

use crate::error::{Result, XmlError};
use pmgraph_core::{
    Histogram, LowBucket, MemoryFields, ParameterSet, Platform, RunConfig, ThreadResult, TrialData,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

/// Write `trial` as a standalone `<pmbenchmark>` document.
///
/// `params.operating_system` becomes the `version_options` text.
pub fn write_report(params: &ParameterSet, trial: &TrialData) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| XmlError::write("XML declaration", e))?;

    open(&mut writer, BytesStart::new("pmbenchmark"))?;
    open(&mut writer, BytesStart::new("report"))?;
    write_signature(&mut writer, &params.operating_system, &params.run)?;
    write_threads(&mut writer, &trial.threads)?;

    open(&mut writer, BytesStart::new("statistics"))?;
    for histogram in trial.read.iter().chain(trial.write.iter()) {
        write_histogram(&mut writer, histogram)?;
    }
    close(&mut writer, "statistics")?;

    let platform = trial
        .memory
        .first()
        .map_or_else(|| params.platform(), |m| m.info.platform());
    open(&mut writer, BytesStart::new("sys_mem_info"))?;
    for snapshot in &trial.memory {
        let mut item = BytesStart::new("sys_mem_item");
        item.push_attribute(("name", snapshot.phase.as_str()));
        open(&mut writer, item)?;
        write_fields(&mut writer, "mem_item_info", &snapshot.info, platform)?;
        if let Some(delta) = &snapshot.delta {
            write_fields(&mut writer, "mem_item_delta", delta, platform)?;
        }
        close(&mut writer, "sys_mem_item")?;
    }
    close(&mut writer, "sys_mem_info")?;

    close(&mut writer, "report")?;
    close(&mut writer, "pmbenchmark")?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| XmlError::write("report", e))
}

fn open<W: Write>(writer: &mut Writer<W>, start: BytesStart<'_>) -> Result<()> {
    let context = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::write(context, e))
}

fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| XmlError::write(name, e))
}

fn leaf<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    open(writer, BytesStart::new(name))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| XmlError::write(name, e))?;
    close(writer, name)
}

fn number<W: Write>(writer: &mut Writer<W>, name: &str, value: f64) -> Result<()> {
    leaf(writer, name, &value.to_string())
}

fn write_signature<W: Write>(writer: &mut Writer<W>, os: &str, run: &RunConfig) -> Result<()> {
    open(writer, BytesStart::new("signature"))?;
    open(writer, BytesStart::new("pmbench_info"))?;
    leaf(writer, "version_options", os)?;
    close(writer, "pmbench_info")?;

    open(writer, BytesStart::new("params"))?;
    let integers = [
        ("duration", run.duration),
        ("mapsize", run.mapsize),
        ("setsize", run.setsize),
        ("initialize", run.initialize),
    ];
    for (name, value) in integers {
        leaf(writer, name, &value.to_string())?;
    }
    number(writer, "shape", run.shape)?;
    let integers = [
        ("delay", run.delay),
        ("quiet", run.quiet),
        ("cold", run.cold),
        ("jobs", run.jobs),
        ("offset", run.offset),
        ("ratio", run.ratio),
    ];
    for (name, value) in integers {
        leaf(writer, name, &value.to_string())?;
    }
    leaf(writer, "pattern", &run.pattern)?;
    leaf(writer, "access", &run.access)?;
    leaf(writer, "tsops", &run.tsops)?;
    leaf(writer, "xalloc_mib", &run.xalloc_mib.to_string())?;
    leaf(writer, "xalloc_path", &run.xalloc_path)?;
    close(writer, "params")?;
    close(writer, "signature")
}

fn write_threads<W: Write>(writer: &mut Writer<W>, threads: &[ThreadResult]) -> Result<()> {
    open(writer, BytesStart::new("result"))?;
    for t in threads {
        let mut start = BytesStart::new("result_thread");
        start.push_attribute(("thread_num", t.thread_num.to_string().as_str()));
        open(writer, start)?;

        open(writer, BytesStart::new("result_netavg"))?;
        number(writer, "netavg_us", t.netavg_us)?;
        number(writer, "netavg_clk", t.netavg_clk)?;
        close(writer, "result_netavg")?;

        open(writer, BytesStart::new("result_details"))?;
        open(writer, BytesStart::new("details_latency"))?;
        number(writer, "latency_us", t.latency_us)?;
        number(writer, "latency_clk", t.latency_clk)?;
        close(writer, "details_latency")?;
        number(writer, "details_samples", t.samples)?;
        open(writer, BytesStart::new("details_overhead"))?;
        number(writer, "overhead_us", t.overhead_us)?;
        number(writer, "overhead_clk", t.overhead_clk)?;
        close(writer, "details_overhead")?;
        number(writer, "details_total", t.total)?;
        close(writer, "result_details")?;

        close(writer, "result_thread")?;
    }
    close(writer, "result")
}

fn write_histogram<W: Write>(writer: &mut Writer<W>, histogram: &Histogram) -> Result<()> {
    let mut start = BytesStart::new("histogram");
    start.push_attribute(("type", histogram.access.as_str()));
    open(writer, start)?;

    if let Some(first) = histogram.first_low() {
        write_low_bucket(writer, first)?;
    }
    for bucket in &histogram.buckets {
        open_bucket(writer, bucket.index)?;
        write_interval(writer, bucket.interval_lo, bucket.interval_hi)?;
        number(writer, "sum_count", bucket.sum_count)?;
        if let Some(hexes) = &bucket.hexes {
            open(writer, BytesStart::new("bucket_hexes"))?;
            for (j, hex) in hexes.iter().enumerate() {
                let mut start = BytesStart::new("hex");
                start.push_attribute(("index", j.to_string().as_str()));
                open(writer, start)?;
                writer
                    .write_event(Event::Text(BytesText::new(&hex.to_string())))
                    .map_err(|e| XmlError::write("hex", e))?;
                close(writer, "hex")?;
            }
            close(writer, "bucket_hexes")?;
        }
        close(writer, "histo_bucket")?;
    }
    for low in histogram.tail_low() {
        write_low_bucket(writer, low)?;
    }
    close(writer, "histogram")
}

fn open_bucket<W: Write>(writer: &mut Writer<W>, index: u8) -> Result<()> {
    let mut start = BytesStart::new("histo_bucket");
    start.push_attribute(("index", index.to_string().as_str()));
    open(writer, start)
}

fn write_interval<W: Write>(writer: &mut Writer<W>, lo: i32, hi: i32) -> Result<()> {
    open(writer, BytesStart::new("bucket_interval"))?;
    leaf(writer, "interval_lo", &lo.to_string())?;
    leaf(writer, "interval_hi", &hi.to_string())?;
    close(writer, "bucket_interval")
}

fn write_low_bucket<W: Write>(writer: &mut Writer<W>, low: &LowBucket) -> Result<()> {
    open_bucket(writer, 0)?;
    write_interval(writer, low.interval_lo, low.interval_hi)?;
    number(writer, "sum_count", low.sum_count)?;
    close(writer, "histo_bucket")
}

fn write_fields<W: Write>(
    writer: &mut Writer<W>,
    element: &str,
    fields: &MemoryFields,
    platform: Platform,
) -> Result<()> {
    open(writer, BytesStart::new(element))?;
    for (name, value) in MemoryFields::names(platform).iter().zip(fields.values()) {
        number(writer, name, *value)?;
    }
    close(writer, element)
}
