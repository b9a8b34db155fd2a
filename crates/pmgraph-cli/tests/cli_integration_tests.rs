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

//! CLI integration tests over the sample result set

use assert_cmd::Command;
use pmgraph_test::fixtures;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pmgraph_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pmgraph").expect("Failed to find pmgraph binary");
    cmd.env("NO_COLOR", "1").env_remove("PMGRAPH_LOG");
    cmd
}

fn sample_data() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fixtures::write_sample_result_set(dir.path()).expect("Failed to write result set");
    dir
}

fn csv_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".csv"))
        .collect();
    names.sort();
    names
}

// ===== Help and Version Tests =====

#[test]
fn test_help_output() {
    pmgraph_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pmbench report aggregation and pivot engine"))
        .stdout(predicate::str::contains("export-all"));
}

#[test]
fn test_version_output() {
    pmgraph_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pmgraph"));
}

#[test]
fn test_no_subcommand_fails() {
    pmgraph_cmd().assert().failure();
}

// ===== Export Tests =====

#[test]
fn test_export_ratio_pivot_into_directory() {
    let data = sample_data();
    let out = tempfile::tempdir().unwrap();

    pmgraph_cmd()
        .args(["export", "--at", "0_0_0", "0_0_0_1_0", "--pivot", "ratio"])
        .arg("--data")
        .arg(data.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Fedora23_native_chatham_256MiB_512MiB_1_0_all_19.csv",
        ));

    let text = fs::read_to_string(
        out.path()
            .join("Fedora23_native_chatham_256MiB_512MiB_1_0_all_19.csv"),
    )
    .unwrap();
    assert!(text.starts_with("OS/kernel,Swap device,"));
    assert!(text.contains("Read latencies,,50%,Read-only\n"));
}

#[test]
fn test_export_trials_to_explicit_path() {
    let data = sample_data();
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("trials.csv");

    pmgraph_cmd()
        .args(["export", "--at", "2_0_0", "0_0_0_1_0", "--resolution", "coarse"])
        .arg("--data")
        .arg(data.path())
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("Windows10_native,chatham,256MiB,512MiB,1,0,50,19"));
    assert!(text.contains("Read latencies,,Trial 1,Trial 2,Trial 3,Average\n"));
}

#[test]
fn test_export_missing_series_fails() {
    let data = sample_data();
    pmgraph_cmd()
        .args(["export", "--at", "0_0_0", "0_0_1_1_0"])
        .arg("--data")
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("series 0_0_0 0_0_1_1_0 not found"));
}

#[test]
fn test_export_invalid_series_fails() {
    let data = sample_data();
    pmgraph_cmd()
        .args(["export", "--at", "0_0_0", "0_0_0_1_1"])
        .arg("--data")
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no valid average"));
}

#[test]
fn test_export_rejects_unknown_pivot() {
    pmgraph_cmd()
        .args(["export", "--data", ".", "--at", "0_0_0", "0_0_0_1_0", "--pivot", "swap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown pivot 'swap'"));
}

#[test]
fn test_export_from_empty_folder_fails() {
    let empty = tempfile::tempdir().unwrap();
    pmgraph_cmd()
        .args(["export", "--at", "0_0_0", "0_0_0_1_0"])
        .arg("--data")
        .arg(empty.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no result documents found"));
}

#[test]
fn test_export_all_writes_every_comparison() {
    let data = sample_data();
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("csv");

    pmgraph_cmd()
        .arg("export-all")
        .arg("--data")
        .arg(data.path())
        .arg("--output")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("16 file(s) written"));

    let names = csv_files(&target);
    assert_eq!(names.len(), 16);
    assert!(names.contains(&"all_chatham_256MiB_512MiB_1_0_50_19.csv".to_string()));
}

// ===== Verify Tests =====

#[test]
fn test_verify_lists_invalid_series() {
    let data = sample_data();
    pmgraph_cmd()
        .arg("verify")
        .arg("--data")
        .arg(data.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("8 series"))
        .stdout(predicate::str::contains("0_0_0 0_0_0_1_1"))
        .stderr(predicate::str::contains("1 series failed verification"));
}

// ===== Series and Stats Tests =====

#[test]
fn test_series_json_for_one_access() {
    let data = sample_data();
    let output = pmgraph_cmd()
        .args(["series", "--at", "0_0_0", "0_0_0_1_0", "--access", "read"])
        .arg("--data")
        .arg(data.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let series: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let series = series.as_array().unwrap();
    let names: Vec<&str> = series.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        ["Trial 1 (read)", "Trial 2 (read)", "Trial 3 (read)", "Average (read)"]
    );
    for s in series {
        assert_eq!(s["points"].as_array().unwrap().len(), 250);
    }
}

#[test]
fn test_series_mini_area_to_file() {
    let data = sample_data();
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("series.json");

    pmgraph_cmd()
        .args(["series", "--at", "0_0_0", "0_0_0_1_0", "--area", "mini", "--pivot", "ratio"])
        .arg("--data")
        .arg(data.path())
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let series: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let series = series.as_array().unwrap();
    assert!(!series.is_empty());
    for s in series {
        assert_eq!(s["points"].as_array().unwrap().len(), 25);
    }
}

#[test]
fn test_stats_text() {
    let data = sample_data();
    pmgraph_cmd()
        .args(["stats", "--at", "0_0_0", "0_0_0_1_0"])
        .arg("--data")
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Trials:\t3"))
        .stdout(predicate::str::contains("Net average latency:"))
        .stdout(predicate::str::contains("Average (write)\t"));
}

#[test]
fn test_stats_json() {
    let data = sample_data();
    let output = pmgraph_cmd()
        .args(["stats", "--json", "--at", "0_0_0", "0_0_0_1_0"])
        .arg("--data")
        .arg(data.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["trials"], 3);
    assert_eq!(value["runtime"]["series"].as_array().unwrap().len(), 8);
    assert_eq!(value["runtime"]["aggregated"].as_array().unwrap().len(), 4);
    assert!(value["stats"]["read_spike"].is_object());
}

// ===== Import Tests =====

#[test]
fn test_import_average_and_reimport() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.xml");
    let b = dir.path().join("b.xml");
    fs::write(&a, fixtures::single_report(1.0)).unwrap();
    fs::write(&b, fixtures::single_report(3.0)).unwrap();
    let table = dir.path().join("manual.csv");
    let mean = dir.path().join("mean.xml");

    pmgraph_cmd()
        .arg("import")
        .arg(&a)
        .arg(&b)
        .args(["--average", "Mean"])
        .arg("--output")
        .arg(&table)
        .arg("--save-average")
        .arg(&mean)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 report(s)"));

    let text = fs::read_to_string(&table).unwrap();
    assert!(text.contains("Read latencies,,a,b,Mean\n"));
    assert!(fs::read_to_string(&mean).unwrap().contains("<pmbenchmark"));

    pmgraph_cmd()
        .arg("import")
        .arg(&mean)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 report(s)"));
}

#[test]
fn test_import_of_garbage_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.xml");
    fs::write(&bad, "<pmbenchmark><test_round>").unwrap();

    pmgraph_cmd()
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad"))
        .stderr(predicate::str::contains("no report could be imported"));
}

#[test]
fn test_save_average_requires_average() {
    pmgraph_cmd()
        .args(["import", "a.xml", "--save-average", "mean.xml"])
        .assert()
        .failure();
}

// ===== Completion Tests =====

#[test]
fn test_bash_completion() {
    pmgraph_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pmgraph"));
}
