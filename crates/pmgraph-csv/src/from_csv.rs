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

//! Reading back the signature of an exported table.

use crate::error::{CsvError, Result};
use pmgraph_core::Dimension;

/// The dimension values an exported table was built around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Values in positional order; `*` where the table varies.
    pub values: [String; 8],
    /// Dimensions marked `*`.
    pub wildcards: Vec<Dimension>,
}

impl Signature {
    /// The varying dimension, when exactly one is marked.
    pub fn pivot(&self) -> Option<Dimension> {
        match self.wildcards.as_slice() {
            [dim] => Some(*dim),
            _ => None,
        }
    }

    pub fn value(&self, dim: Dimension) -> &str {
        &self.values[dim.position()]
    }
}

/// Parse the first two rows of an exported table.
///
/// # Examples
///
/// ```
/// use pmgraph_core::Dimension;
/// use pmgraph_csv::read_signature;
///
/// let text = "OS/kernel,Swap device,Phys. memory,Map size,Jobs,Delay,Read/write ratio,Niceness\n\
///             Fedora23_native,chatham,256MiB,*,1,0,50,19\n";
/// let signature = read_signature(text)?;
/// assert_eq!(signature.pivot(), Some(Dimension::Mapsize));
/// assert_eq!(signature.value(Dimension::Memory), "256MiB");
/// # Ok::<(), pmgraph_csv::CsvError>(())
/// ```
pub fn read_signature(text: &str) -> Result<Signature> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = records.next().ok_or(CsvError::MissingRow("header"))??;
    if header.len() != Dimension::ALL.len() {
        return Err(CsvError::WidthMismatch {
            expected: Dimension::ALL.len(),
            actual: header.len(),
            row: 1,
        });
    }
    for (position, (field, dim)) in header.iter().zip(Dimension::ALL).enumerate() {
        if field.trim() != dim.header() {
            return Err(CsvError::InvalidHeader {
                position,
                reason: format!("expected '{}', found '{}'", dim.header(), field),
            });
        }
    }

    let row = records.next().ok_or(CsvError::MissingRow("signature"))??;
    if row.len() != Dimension::ALL.len() {
        return Err(CsvError::WidthMismatch {
            expected: Dimension::ALL.len(),
            actual: row.len(),
            row: 2,
        });
    }

    let values: [String; 8] = std::array::from_fn(|i| row[i].trim().to_string());
    let wildcards = Dimension::ALL
        .into_iter()
        .filter(|d| values[d.position()] == "*")
        .collect();
    Ok(Signature { values, wildcards })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "OS/kernel,Swap device,Phys. memory,Map size,Jobs,Delay,Read/write ratio,Niceness";

    #[test]
    fn test_manual_signature_has_no_single_pivot() {
        let text = format!("{HEADER}\n*,chatham,*,512MiB,1,0,50,19\n\nrest,of,file\n");
        let signature = read_signature(&text).unwrap();
        assert_eq!(
            signature.wildcards,
            vec![Dimension::OperatingSystem, Dimension::Memory]
        );
        assert_eq!(signature.pivot(), None);
    }

    #[test]
    fn test_trials_signature() {
        let text = format!("{HEADER}\nFedora23_Xen,RAMDISK,1024MiB,512MiB,8,1000,0,-20\n");
        let signature = read_signature(&text).unwrap();
        assert!(signature.wildcards.is_empty());
        assert_eq!(signature.value(Dimension::Nice), "-20");
    }

    #[test]
    fn test_bad_header() {
        let text = "OS,Swap device,Phys. memory,Map size,Jobs,Delay,Read/write ratio,Niceness\n";
        let err = read_signature(text).unwrap_err();
        assert!(matches!(err, CsvError::InvalidHeader { position: 0, .. }));
    }

    #[test]
    fn test_short_row() {
        let text = format!("{HEADER}\na,b,c\n");
        let err = read_signature(&text).unwrap_err();
        assert!(matches!(
            err,
            CsvError::WidthMismatch {
                actual: 3,
                row: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_rows() {
        assert!(matches!(
            read_signature("").unwrap_err(),
            CsvError::MissingRow("header")
        ));
        assert!(matches!(
            read_signature(HEADER).unwrap_err(),
            CsvError::MissingRow("signature")
        ));
    }
}
