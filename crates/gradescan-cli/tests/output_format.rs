//! Integration tests for report output formats.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use gradescan_test_support::{write_image, SyntheticImageBuilder};
use serde_json::Value;

fn gradescan(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gradescan").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home).current_dir(config_home);
    cmd
}

fn two_pages(dir: &Path) {
    write_image(dir, "a_sharp.png", &SyntheticImageBuilder::sharp_image());
    write_image(dir, "b_flat.png", &SyntheticImageBuilder::blurry_image());
}

#[test]
fn test_jsonl_has_one_report_per_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_pages(temp_dir.path());

    let output = gradescan(temp_dir.path())
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let reports: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 2);

    for report in &reports {
        for field in ["path", "id", "timestamp", "quality", "blur_score", "dimensions"] {
            assert!(report.get(field).is_some(), "missing {field} in {report}");
        }
        assert!(report.get("edges").is_none(), "edges only with --corners");
    }
    // Directory listing is sorted.
    assert!(reports[0]["path"].as_str().unwrap().ends_with("a_sharp.png"));
    assert_eq!(reports[0]["dimensions"]["width"], 128);
}

#[test]
fn test_report_ids_are_unique() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_pages(temp_dir.path());

    let output = gradescan(temp_dir.path())
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let ids: Vec<String> = stdout
        .lines()
        .map(|line| {
            let report: Value = serde_json::from_str(line).unwrap();
            report["id"].as_str().unwrap().to_owned()
        })
        .collect();
    assert_ne!(ids[0], ids[1]);
    assert!(uuid_like(&ids[0]), "{}", ids[0]);
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}

#[test]
fn test_json_format_is_array() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_pages(temp_dir.path());

    let output = gradescan(temp_dir.path())
        .args(["--format", "json"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_json_pretty_is_multiline() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_pages(temp_dir.path());

    let output = gradescan(temp_dir.path())
        .args(["--format", "json", "--pretty"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().count() > 2);
    assert!(stdout.contains("\n  "));
    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.is_array());
}

#[test]
fn test_poor_page_message_on_stderr() {
    let temp_dir = tempfile::tempdir().unwrap();
    let page = write_image(temp_dir.path(), "flat.png", &SyntheticImageBuilder::blurry_image());

    let output = gradescan(temp_dir.path()).arg(page).output().unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("rescan recommended"), "{stderr}");
}

#[test]
fn test_quiet_suppresses_poor_page_message() {
    let temp_dir = tempfile::tempdir().unwrap();
    let page = write_image(temp_dir.path(), "flat.png", &SyntheticImageBuilder::blurry_image());

    let output = gradescan(temp_dir.path())
        .arg("--quiet")
        .arg(page)
        .output()
        .unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(!stderr.contains("rescan recommended"), "{stderr}");
    assert_eq!(output.status.code(), Some(1));
}
