#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn scanlist_cmd(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("scanlist"));
    cmd.env("SCANLIST_DATA", data.as_os_str())
        .env_remove("SCANLIST_HANDOFF")
        .env_remove("SCANLIST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_list_create_and_ls() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["list", "create", "  Warehouse A "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse A"));

    scanlist_cmd(temp.path())
        .args(["list", "create", "Warehouse A"])
        .assert()
        .failure();

    scanlist_cmd(temp.path())
        .args(["list", "create", "   "])
        .assert()
        .failure();

    // No subcommand lists the lists
    scanlist_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse A"));
}

#[test]
fn test_scan_items_and_export() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["scan", "L1", "5901234123457", "-t", "EAN13", "-l", "Box, large"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 5901234123457"));

    scanlist_cmd(temp.path())
        .args(["items", "L1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5901234123457"))
        .stdout(predicate::str::contains("[EAN13]"));

    scanlist_cmd(temp.path())
        .args(["export", "L1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,listId,codeRaw,codeType,label,createdAt\n",
        ))
        .stdout(predicate::str::contains(",L1,5901234123457,EAN13,\"Box, large\","));

    scanlist_cmd(temp.path())
        .args(["export", "L1", "--no-header", "-d", ";"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,listId").not())
        .stdout(predicate::str::contains(";L1;5901234123457;EAN13;Box, large;"));
}

#[test]
fn test_export_to_directory() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir_all(&out).unwrap();

    scanlist_cmd(temp.path())
        .args(["scan", "Dock 4", "1"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["export", "Dock 4", "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("scan-items-Dock_4-"));

    let files: Vec<_> = fs::read_dir(&out).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn test_repeat_scan_in_one_bucket_is_stored_once() {
    let temp = TempDir::new().unwrap();

    for _ in 0..2 {
        scanlist_cmd(temp.path())
            .env("SCANLIST_BUCKET_MS", "86400000")
            .args(["scan", "L1", "123", "-t", "QR"])
            .assert()
            .success();
    }

    let output = scanlist_cmd(temp.path())
        .args(["--json", "items", "L1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["listed_items"].as_array().unwrap().len(), 1);
}

#[test]
fn test_label_and_remove_by_position() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["scan", "L1", "AAA"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["label", "L1", "1", "Pallet"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["items", "L1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pallet [MANUAL]"));

    scanlist_cmd(temp.path())
        .args(["rm", "L1", "5"])
        .assert()
        .failure();

    scanlist_cmd(temp.path())
        .args(["rm", "L1", "1"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["items", "L1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No items in 'L1'."));
}

#[test]
fn test_capture_then_insert_types_joined_text() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["capture", "A", "B", "--mode", "multi"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["pending", "insert", "--attempts", "1"])
        .assert()
        .success()
        .stdout("A\nB\n");

    // Drained: a second consumer finds nothing
    scanlist_cmd(temp.path())
        .args(["pending", "insert", "--attempts", "1", "--delay-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing pending."));
}

#[test]
fn test_capture_then_commit_into_list() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["capture", "X1", "X2", "-m", "multi", "--list", "Dock", "-t", "QR"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["pending", "commit"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["items", "Dock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("X1"))
        .stdout(predicate::str::contains("X2"));

    // Staging with a list registers its name
    scanlist_cmd(temp.path())
        .args(["known", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dock"));
}

#[test]
fn test_route_build_and_parse() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["route", "build", "--mode", "multi"])
        .assert()
        .success()
        .stdout("barcodekb://scan?mode=multi\n");

    let output = scanlist_cmd(temp.path())
        .args(["--json", "route", "build"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mode"], "single");
    assert_eq!(json["address"], "barcodekb://scan?mode=single");

    scanlist_cmd(temp.path())
        .args(["route", "parse", "barcodekb://scan?mode=multi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("multi"));

    scanlist_cmd(temp.path())
        .args(["route", "parse", "https://example.com/scan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a scan address"));
}

#[test]
fn test_delete_needs_matching_confirmation() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["list", "create", "Dock"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["list", "delete", "Dock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--confirm"));

    scanlist_cmd(temp.path())
        .args(["list", "delete", "Dock", "--confirm", "dock"])
        .assert()
        .failure();

    scanlist_cmd(temp.path())
        .args(["list", "delete", "Dock", "--confirm", "Dock"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["list", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No lists yet."));
}

#[test]
fn test_config_from_file_and_env() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("scanlist.toml"), "bucket_ms = 250\n").unwrap();

    scanlist_cmd(temp.path())
        .args(["config", "bucket_ms"])
        .assert()
        .success()
        .stdout("250\n");

    scanlist_cmd(temp.path())
        .env("SCANLIST_DEBOUNCE_MS", "42")
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debounce_ms"))
        .stdout(predicate::str::contains("42"));

    scanlist_cmd(temp.path())
        .args(["config", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debounce_ms"));

    fs::write(temp.path().join("scanlist.toml"), "export_delimiter = \"ab\"\n").unwrap();
    scanlist_cmd(temp.path())
        .args(["list", "ls"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("export_delimiter"));
}

#[test]
fn test_export_rejects_quote_delimiter() {
    let temp = TempDir::new().unwrap();

    scanlist_cmd(temp.path())
        .args(["scan", "L1", "1", "-l", "a\"b"])
        .assert()
        .success();

    scanlist_cmd(temp.path())
        .args(["export", "L1", "-d", "\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delimiter"));
}
