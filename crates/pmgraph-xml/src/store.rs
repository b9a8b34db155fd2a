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

//! Result documents keyed by `key1`.
//!
//! A result document holds every series measured for one
//! (kernel, device, memory) combination. On insert the document is parsed
//! once to check it and to record where each `test_nice` series element
//! sits in the text. Extracting a series later parses only that element.

use crate::accessor::{select_node, select_nodes, SafeXml};
use crate::error::{Result, XmlError};
use crate::report::{parse_trial, report_run_config};
use pmgraph_core::{
    CancellationToken, Dimension, DimensionTables, IndexProduct, ParamIndices, ParameterSet,
    Platform, RunConfig, TrialData,
};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default limit for a single result document (1 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Reads attempted before an out-of-memory failure is reported.
const READ_ATTEMPTS: usize = 3;

const SERIES_PATH: &str = "test_content/test_mapsize/test_jobs/test_delay/test_ratio/test_nice";

/// File name of the result document for one (kernel, device, memory) triple.
pub fn result_file_name(kernel: &str, device: &str, memory_mib: i32) -> String {
    format!("results_{}_{}_{}_final.xml", kernel, device, memory_mib)
}

/// The `iter` values that locate a series inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesAddress {
    pub mapsize: i32,
    pub jobs: i32,
    pub delay: i32,
    pub ratio: i32,
    pub nice: i32,
}

impl SeriesAddress {
    pub fn of(params: &ParameterSet) -> Self {
        Self {
            mapsize: params.mapsize_mib,
            jobs: params.jobs,
            delay: params.delay,
            ratio: params.ratio_percent,
            nice: params.nice,
        }
    }

    /// Address of a `test_nice` element, read from it and its four ancestors.
    fn of_node(node: Node<'_, '_>) -> Option<Self> {
        let mut iters = [0i32; 5];
        let mut chain = node.ancestors();
        for slot in iters.iter_mut().rev() {
            let value = chain.next()?.attribute("iter")?;
            *slot = value.trim().parse().ok()?;
        }
        let [mapsize, jobs, delay, ratio, nice] = iters;
        Some(Self {
            mapsize,
            jobs,
            delay,
            ratio,
            nice,
        })
    }
}

/// Raw trials of one series.
#[derive(Debug, Clone)]
pub struct SeriesExtract {
    /// Run options of the first trial.
    pub run: RunConfig,
    /// One entry per `test_round`, in document order.
    pub trials: Vec<TrialData>,
    /// Values that could not be read and were taken as zero.
    pub failures: usize,
}

/// Outcome of [`DocumentStore::load_folder`].
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// `key1` of every document loaded.
    pub loaded: Vec<String>,
    /// Expected files that do not exist.
    pub missing: usize,
    /// Files that exist but could not be loaded.
    pub failed: Vec<(PathBuf, XmlError)>,
    pub cancelled: bool,
}

#[derive(Debug)]
struct StoredDocument {
    name: String,
    text: String,
    series: HashMap<SeriesAddress, Range<usize>>,
}

/// In-memory result documents.
#[derive(Debug)]
pub struct DocumentStore {
    documents: HashMap<String, StoredDocument>,
    max_file_size: u64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl DocumentStore {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            documents: HashMap::new(),
            max_file_size,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Store a result document under `key1`, replacing any previous one.
    ///
    /// Returns the number of series found. Fails when the text is not
    /// well-formed or its root is not `benchmark_set`.
    pub fn insert(&mut self, key1: &str, name: &str, text: String) -> Result<usize> {
        let series = index_series(name, &text)?;
        let count = series.len();
        debug!(key1, name, series = count, "document stored");
        self.documents.insert(
            key1.to_string(),
            StoredDocument {
                name: name.to_string(),
                text,
                series,
            },
        );
        Ok(count)
    }

    /// Text of the document stored under `key1`.
    pub fn get(&self, key1: &str) -> Option<&str> {
        self.documents.get(key1).map(|d| d.text.as_str())
    }

    /// Name the document was stored with.
    pub fn name(&self, key1: &str) -> Option<&str> {
        self.documents.get(key1).map(|d| d.name.as_str())
    }

    pub fn contains(&self, key1: &str) -> bool {
        self.documents.contains_key(key1)
    }

    pub fn remove(&mut self, key1: &str) -> bool {
        self.documents.remove(key1).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Stored `key1` values, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of series in the document under `key1`.
    pub fn series_count(&self, key1: &str) -> usize {
        self.documents.get(key1).map_or(0, |d| d.series.len())
    }

    fn release_spare(&mut self) {
        self.documents.shrink_to_fit();
        for doc in self.documents.values_mut() {
            doc.text.shrink_to_fit();
            doc.series.shrink_to_fit();
        }
    }

    /// Read a file, refusing files above the size limit.
    ///
    /// An out-of-memory failure releases spare capacity and is retried a
    /// bounded number of times; other failures are reported at once.
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let metadata = fs::metadata(path).map_err(|e| XmlError::io(path, e))?;
        if metadata.len() > self.max_file_size {
            return Err(XmlError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max: self.max_file_size,
            });
        }

        let mut attempt = 1;
        loop {
            match fs::read_to_string(path) {
                Ok(text) => return Ok(text),
                Err(e) if e.kind() == io::ErrorKind::OutOfMemory && attempt < READ_ATTEMPTS => {
                    warn!(path = %path.display(), attempt, "out of memory reading document, retrying");
                    self.release_spare();
                    attempt += 1;
                }
                Err(e) => return Err(XmlError::io(path, e)),
            }
        }
    }

    /// Load every result document of `dir` that the tables name.
    ///
    /// Missing files are counted, unreadable ones are collected in the
    /// summary. The token is checked before each file.
    pub fn load_folder(
        &mut self,
        dir: &Path,
        tables: &DimensionTables,
        token: &CancellationToken,
    ) -> Result<LoadSummary> {
        if !dir.is_dir() {
            return Err(XmlError::io(dir, "not a directory"));
        }
        let mut summary = LoadSummary::default();
        let cards = tables.cardinalities();
        let limits = [cards[0], cards[1], cards[2], 1, 1, 1, 1, 1];

        for indices in IndexProduct::with_limits(limits) {
            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let name = document_name(&indices, tables)?;
            let path = dir.join(&name);
            if !path.is_file() {
                summary.missing += 1;
                continue;
            }
            let key1 = indices.key1();
            let stored = match self.load_file(&path) {
                Ok(text) => self.insert(&key1, &name, text),
                Err(e) => Err(e),
            };
            match stored {
                Ok(series) => {
                    info!(key1 = %key1, file = %name, series, "loaded result document");
                    summary.loaded.push(key1);
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping result document");
                    summary.failed.push((path, e));
                }
            }
        }
        Ok(summary)
    }

    /// Raw trials of the series described by `params` in document `key1`.
    ///
    /// `Ok(None)` when the document or the series is absent.
    pub fn extract(&self, key1: &str, params: &ParameterSet) -> Result<Option<SeriesExtract>> {
        let Some(doc) = self.documents.get(key1) else {
            return Ok(None);
        };
        let Some(range) = doc.series.get(&SeriesAddress::of(params)) else {
            return Ok(None);
        };
        let fragment = doc.text.get(range.clone()).ok_or_else(|| XmlError::Structure {
            source_name: doc.name.clone(),
            message: format!("series range {:?} outside document", range),
        })?;
        let parsed = Document::parse(fragment).map_err(|e| XmlError::parse(&doc.name, e))?;
        series_from_node(&doc.name, parsed.root_element(), params.platform()).map(Some)
    }
}

fn document_name(indices: &ParamIndices, tables: &DimensionTables) -> Result<String> {
    let kernel = tables.value_label(
        Dimension::OperatingSystem,
        indices.get(Dimension::OperatingSystem),
    )?;
    let device = tables.value_label(Dimension::SwapDevice, indices.get(Dimension::SwapDevice))?;
    let memory = tables.int_value(Dimension::Memory, indices.get(Dimension::Memory))?;
    Ok(result_file_name(&kernel, &device, memory))
}

fn index_series(name: &str, text: &str) -> Result<HashMap<SeriesAddress, Range<usize>>> {
    let doc = Document::parse(text).map_err(|e| XmlError::parse(name, e))?;
    let root = doc.root_element();
    if root.tag_name().name() != "benchmark_set" {
        return Err(XmlError::Structure {
            source_name: name.to_string(),
            message: format!("root element is <{}>", root.tag_name().name()),
        });
    }

    let mut series = HashMap::new();
    for node in select_nodes(root, SERIES_PATH) {
        match SeriesAddress::of_node(node) {
            // the first of several equal addresses wins, as a path lookup would
            Some(address) => {
                series.entry(address).or_insert_with(|| node.range());
            }
            None => warn!(document = name, "series without numeric iter attributes"),
        }
    }
    Ok(series)
}

/// Locate and read one series in a complete result document.
///
/// Parses the whole text; [`DocumentStore::extract`] is the indexed variant.
pub fn extract_series(
    name: &str,
    text: &str,
    params: &ParameterSet,
) -> Result<Option<SeriesExtract>> {
    let doc = Document::parse(text).map_err(|e| XmlError::parse(name, e))?;
    match select_node(doc.root_element(), &params.series_path()) {
        Some(node) => series_from_node(name, node, params.platform()).map(Some),
        None => Ok(None),
    }
}

fn series_from_node(name: &str, series: Node<'_, '_>, platform: Platform) -> Result<SeriesExtract> {
    let xml = SafeXml::new();
    let mut run = None;
    let mut trials = Vec::new();
    for round in select_nodes(series, "test_round") {
        let report = select_node(round, "pmbenchmark/report").ok_or_else(|| XmlError::Structure {
            source_name: name.to_string(),
            message: format!(
                "test_round {} has no pmbenchmark/report",
                round.attribute("iter").unwrap_or("?")
            ),
        })?;
        if run.is_none() {
            run = Some(report_run_config(&xml, report));
        }
        trials.push(parse_trial(&xml, report, platform));
    }
    let Some(run) = run else {
        return Err(XmlError::Structure {
            source_name: name.to_string(),
            message: "series without test_round".to_string(),
        });
    };
    Ok(SeriesExtract {
        run,
        trials,
        failures: xml.failures(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmgraph_test::fixtures;

    fn params(key1: &str, key2: &str) -> ParameterSet {
        let tables = DimensionTables::default();
        let indices = ParamIndices::from_keys(key1, key2).unwrap();
        ParameterSet::from_indices(indices, &tables, RunConfig::default()).unwrap()
    }

    #[test]
    fn test_insert_indexes_series() {
        let mut store = DocumentStore::default();
        let count = store
            .insert("0_0_0", "linux.xml", fixtures::linux_document())
            .unwrap();
        assert_eq!(count, 5);
        assert_eq!(store.series_count("0_0_0"), 5);
        assert_eq!(store.name("0_0_0"), Some("linux.xml"));
        assert!(store.get("0_0_0").unwrap().contains("benchmark_set"));
        assert_eq!(store.keys(), ["0_0_0"]);
    }

    #[test]
    fn test_insert_rejects_bad_documents() {
        let mut store = DocumentStore::default();
        for (label, text) in fixtures::errors::malformed_xml_samples() {
            let err = store.insert("0_0_0", label, text.to_string()).unwrap_err();
            assert!(matches!(err, XmlError::Parse { .. }), "{}: {:?}", label, err);
        }
        let err = store
            .insert("0_0_0", "single", fixtures::single_report(1.0))
            .unwrap_err();
        assert!(matches!(err, XmlError::Structure { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_extract_series() {
        let mut store = DocumentStore::default();
        store
            .insert("0_0_0", "linux.xml", fixtures::linux_document())
            .unwrap();
        // mapsize 512, jobs 1, delay 0, ratio 50, nice 19
        let series = store.extract("0_0_0", &params("0_0_0", "0_0_0_1_0")).unwrap().unwrap();
        assert_eq!(series.trials.len(), 3);
        assert_eq!(series.failures, 0);
        assert_eq!(series.run.ratio, 50);
        assert_eq!(series.trials[2].threads[0].netavg_us, 6.0);

        let jobs8 = store.extract("0_0_0", &params("0_0_0", "0_1_0_1_0")).unwrap().unwrap();
        assert_eq!(jobs8.trials.len(), 1);
        assert_eq!(jobs8.trials[0].threads.len(), 8);
    }

    #[test]
    fn test_extract_absent() {
        let mut store = DocumentStore::default();
        store
            .insert("0_0_0", "linux.xml", fixtures::linux_document())
            .unwrap();
        // delay 1000 was never measured
        assert!(store.extract("0_0_0", &params("0_0_0", "0_0_1_1_0")).unwrap().is_none());
        assert!(store.extract("1_0_0", &params("1_0_0", "0_0_0_1_0")).unwrap().is_none());
    }

    #[test]
    fn test_indexed_and_full_extract_agree() {
        let text = fixtures::linux_document();
        let mut store = DocumentStore::default();
        store.insert("0_0_0", "linux.xml", text.clone()).unwrap();
        let p = params("0_0_0", "0_0_0_2_0");
        let indexed = store.extract("0_0_0", &p).unwrap().unwrap();
        let full = extract_series("linux.xml", &text, &p).unwrap().unwrap();
        assert_eq!(indexed.trials, full.trials);
        assert_eq!(indexed.run, full.run);
    }

    #[test]
    fn test_windows_platform_from_key() {
        let mut store = DocumentStore::default();
        store
            .insert("2_0_0", "windows.xml", fixtures::windows_document())
            .unwrap();
        let series = store.extract("2_0_0", &params("2_0_0", "0_0_0_0_0")).unwrap().unwrap();
        assert_eq!(series.failures, 0);
        assert_eq!(series.trials[0].memory[0].info.platform(), Platform::Windows);
    }

    #[test]
    fn test_load_folder() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_sample_result_set(dir.path()).unwrap();
        std::fs::write(
            dir.path().join(result_file_name("Fedora23_Xen", "chatham", 256)),
            "<benchmark_set>",
        )
        .unwrap();

        let mut store = DocumentStore::default();
        let tables = DimensionTables::default();
        let summary = store
            .load_folder(dir.path(), &tables, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary.loaded, ["0_0_0", "2_0_0"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.missing, 4 * 3 * 7 - 3);
        assert!(!summary.cancelled);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_folder_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_sample_result_set(dir.path()).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let mut store = DocumentStore::default();
        let summary = store
            .load_folder(dir.path(), &DimensionTables::default(), &token)
            .unwrap();
        assert!(summary.cancelled);
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.xml");
        std::fs::write(&path, fixtures::linux_document()).unwrap();
        let mut store = DocumentStore::new(16);
        assert!(matches!(
            store.load_file(&path),
            Err(XmlError::FileTooLarge { max: 16, .. })
        ));
        assert!(matches!(
            store.load_file(&dir.path().join("absent.xml")),
            Err(XmlError::Io { .. })
        ));
    }
}
