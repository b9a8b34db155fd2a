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

//! Lenient path-based access to XML nodes.
//!
//! Paths are `/`-separated element steps, each optionally filtered by one
//! attribute: `result/result_thread[@thread_num='2']/result_netavg`. A
//! leading `/` starts at the document root instead of the given node.
//!
//! Numeric reads never fail. A missing node or unparsable text yields `0`,
//! is logged at `warn` level and counted, so one damaged field does not
//! sink a whole report.

use roxmltree::Node;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step<'p> {
    name: &'p str,
    attr: Option<(&'p str, &'p str)>,
}

impl<'p> Step<'p> {
    fn parse(step: &'p str) -> Option<Step<'p>> {
        let Some(open) = step.find('[') else {
            return Some(Step {
                name: step,
                attr: None,
            });
        };
        let name = &step[..open];
        let predicate = step[open + 1..].strip_suffix(']')?.strip_prefix('@')?;
        let (attr, value) = predicate.split_once('=')?;
        let value = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
            .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))?;
        Some(Step {
            name,
            attr: Some((attr.trim(), value)),
        })
    }

    fn matches(&self, node: &Node<'_, '_>) -> bool {
        node.is_element()
            && node.tag_name().name() == self.name
            && self
                .attr
                .map_or(true, |(attr, value)| node.attribute(attr) == Some(value))
    }
}

/// Every node reached by `path` from `start`, in document order.
pub fn select_nodes<'a, 'input>(start: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let (mut current, relative) = match path.strip_prefix('/') {
        Some(rest) => (vec![start.document().root()], rest),
        None => (vec![start], path),
    };
    for raw in relative.split('/').filter(|s| !s.is_empty()) {
        let Some(step) = Step::parse(raw) else {
            warn!(path, step = raw, "unsupported path step");
            return Vec::new();
        };
        current = current
            .iter()
            .flat_map(|n| n.children().filter(|c| step.matches(c)))
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

/// First node reached by `path` from `start`.
pub fn select_node<'a, 'input>(start: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    select_nodes(start, path).into_iter().next()
}

/// Numeric accessor that substitutes zero for missing or unparsable values.
#[derive(Debug, Default)]
pub struct SafeXml {
    failures: AtomicUsize,
}

impl SafeXml {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reads that fell back to zero.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    fn fail(&self, node: &Node<'_, '_>, path: &str, reason: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        warn!(
            element = node.tag_name().name(),
            path, reason, "unreadable value, using 0"
        );
    }

    /// Record a value that is absent from `node` and will read as zero.
    pub fn missing(&self, node: Node<'_, '_>, path: &str) {
        self.fail(&node, path, "missing");
    }

    /// Trimmed text of the node at `path`; `None` when the node is missing.
    pub fn text<'a>(&self, node: Node<'a, '_>, path: &str) -> Option<&'a str> {
        let target = if path.is_empty() {
            node
        } else {
            select_node(node, path)?
        };
        Some(target.text().unwrap_or("").trim())
    }

    /// Text of the node at `path`, or an empty string.
    pub fn string(&self, node: Node<'_, '_>, path: &str) -> String {
        self.text(node, path).unwrap_or("").to_string()
    }

    pub fn to_double(&self, node: Node<'_, '_>, path: &str) -> f64 {
        match self.text(node, path) {
            None => {
                self.fail(&node, path, "missing");
                0.0
            }
            Some(text) => match text.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    self.fail(&node, path, "not a number");
                    0.0
                }
            },
        }
    }

    pub fn to_long(&self, node: Node<'_, '_>, path: &str) -> i64 {
        match self.text(node, path) {
            None => {
                self.fail(&node, path, "missing");
                0
            }
            Some(text) => match text.parse::<i64>() {
                Ok(v) => v,
                Err(_) => {
                    self.fail(&node, path, "not an integer");
                    0
                }
            },
        }
    }

    pub fn to_int(&self, node: Node<'_, '_>, path: &str) -> i32 {
        let value = self.to_long(node, path);
        i32::try_from(value).unwrap_or_else(|_| {
            self.fail(&node, path, "integer out of range");
            0
        })
    }

    /// Integer attribute of `node`, zero when missing or unparsable.
    pub fn attr_int(&self, node: Node<'_, '_>, attr: &str) -> i64 {
        match node.attribute(attr).map(|v| v.trim().parse::<i64>()) {
            Some(Ok(v)) => v,
            _ => {
                self.fail(&node, attr, "bad attribute");
                0
            }
        }
    }
}
