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

//! Standalone reports written by a single pmbench run.

use crate::accessor::{select_node, SafeXml};
use crate::error::{Result, XmlError};
use crate::report::{parse_trial, report_run_config};
use pmgraph_core::{ParameterSet, Platform, RunConfig, TrialData};
use roxmltree::Document;

/// One imported report.
#[derive(Debug, Clone)]
pub struct SingleReport {
    /// Name the report was imported under, usually its file stem.
    pub name: String,
    /// Contents of `signature/pmbench_info/version_options`.
    pub operating_system: String,
    pub run: RunConfig,
    pub trial: TrialData,
    /// Values that could not be read and were taken as zero.
    pub failures: usize,
}

impl SingleReport {
    /// Parameter set of the report, without dimension indices.
    pub fn params(&self) -> ParameterSet {
        ParameterSet::from_run(self.operating_system.clone(), self.run.clone())
    }
}

/// Parse a document whose root is `<pmbenchmark>`.
pub fn parse_single_report(name: &str, text: &str) -> Result<SingleReport> {
    let doc = Document::parse(text).map_err(|e| XmlError::parse(name, e))?;
    let root = doc.root_element();
    if root.tag_name().name() != "pmbenchmark" {
        return Err(XmlError::Structure {
            source_name: name.to_string(),
            message: format!("expected <pmbenchmark>, found <{}>", root.tag_name().name()),
        });
    }
    let report = select_node(root, "report").ok_or_else(|| XmlError::Structure {
        source_name: name.to_string(),
        message: "missing <report>".to_string(),
    })?;

    let xml = SafeXml::new();
    let operating_system = xml.string(report, "signature/pmbench_info/version_options");
    let platform = Platform::detect(Some(operating_system.as_str()).filter(|s| !s.is_empty()));
    let run = report_run_config(&xml, report);
    let trial = parse_trial(&xml, report, platform);
    Ok(SingleReport {
        name: name.to_string(),
        operating_system,
        run,
        trial,
        failures: xml.failures(),
    })
}
