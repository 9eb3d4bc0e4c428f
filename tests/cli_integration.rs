//! CLI integration tests for fatbin.
//!
//! These tests run the binary against a scratch directory with its own home,
//! so no user config leaks in.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the fatbin binary command, isolated in `tmp`.
fn fatbin(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fatbin").unwrap();
    cmd.current_dir(tmp.path()).env("HOME", tmp.path());
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// fatbin vars
// ============================================================================

#[test]
fn test_vars_defaults() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["vars", "--cpu", "ios_x86_64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xcode_version_override_value = 7.3.1"))
        .stdout(predicate::str::contains("apple_sdk_version_override_value = 8.4"))
        .stdout(predicate::str::contains("apple_sdk_platform_value = iPhoneSimulator"))
        .stdout(predicate::str::contains("version_min = 8.4"));
}

#[test]
fn test_vars_single_variable() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args([
            "vars",
            "--cpu",
            "ios_x86_64",
            "--xcode-version",
            "5.8",
            "--minimum-os",
            "ios=12.345",
            "--var",
            "version_min",
        ])
        .assert()
        .success()
        .stdout("12.345\n");
}

#[test]
fn test_vars_unknown_variable_fails() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["vars", "--var", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_vars_json() {
    let tmp = temp_dir();

    let output = fatbin(&tmp)
        .args(["vars", "--platform-type", "watchos", "--arch", "armv7k", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let set = &json[0];
    assert_eq!(set["platform_type"], "watchos");
    assert_eq!(set["architecture"], "armv7k");
    assert_eq!(set["variables"]["apple_sdk_platform_value"], "WatchOS");
    assert_eq!(set["variables"]["apple_sdk_version_override_value"], "2.0");
}

#[test]
fn test_vars_uses_project_config() {
    let tmp = temp_dir();
    fs::create_dir_all(tmp.path().join(".fatbin")).unwrap();
    fs::write(
        tmp.path().join(".fatbin/config.toml"),
        r#"
[options]
xcode_version = "5.8"
minimum_os = { watchos = "11.111" }
cpus = { watchos = ["armv7k"] }
"#,
    )
    .unwrap();

    fatbin(&tmp)
        .args(["vars", "--platform-type", "watchos"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[watchos armv7k]"))
        .stdout(predicate::str::contains("xcode_version_override_value = 5.8"))
        .stdout(predicate::str::contains("version_min = 11.111"));
}

#[test]
fn test_vars_fails_on_bad_project_config() {
    let tmp = temp_dir();
    fs::create_dir_all(tmp.path().join(".fatbin")).unwrap();
    fs::write(
        tmp.path().join(".fatbin/config.toml"),
        "[options]\nxcode_version = \"5..8\"\n",
    )
    .unwrap();

    fatbin(&tmp)
        .args(["vars", "--cpu", "ios_x86_64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_plan_rejects_colliding_objects() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["plan", "app", "--arch", "arm64", "--src", "a/x.c", "--src", "b/x.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("x.c.o"));
}

#[test]
fn test_vars_rejects_mismatched_cpu() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["vars", "--platform-type", "tvos", "--cpu", "ios_arm64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a tvos architecture"));
}

#[test]
fn test_vars_rejects_bad_version() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["vars", "--xcode-version", "5..8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xcode_version"));
}

// ============================================================================
// fatbin plan
// ============================================================================

#[test]
fn test_plan_human_output() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args([
            "plan",
            "bin",
            "--platform-type",
            "watchos",
            "--arch",
            "armv7k",
            "--arch",
            "x86_64",
            "--src",
            "bin/main.cc",
            "--dep",
            "a=a/a.cc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan for 'bin' (watchos: armv7k, x86_64)"))
        .stdout(predicate::str::contains("Lipo bin"))
        .stdout(predicate::str::contains("lipo -create"))
        .stdout(predicate::str::contains("Universal binary: fatbin-out/bin_lipobin"));
}

#[test]
fn test_plan_json() {
    let tmp = temp_dir();

    let output = fatbin(&tmp)
        .args([
            "plan",
            "bin",
            "--arch",
            "arm64",
            "--arch",
            "sim_arm64",
            "--src",
            "main.c",
            "--out-dir",
            "out",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["target"], "bin");
    assert_eq!(json["universal_binary"], "out/bin_lipobin");
    assert_eq!(json["architectures"].as_array().unwrap().len(), 2);

    let actions = json["actions"].as_array().unwrap();
    // compile + link per arch, then lipo
    assert_eq!(actions.len(), 5);
    let last = actions.last().unwrap();
    assert_eq!(last["kind"], "combine");
    assert!(last.get("variables").is_none());
}

#[test]
fn test_plan_duplicate_arch_fails() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["plan", "bin", "--arch", "arm64", "--arch", "arm64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than once"));
}

#[test]
fn test_plan_unknown_platform_fails() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["plan", "bin", "--platform-type", "beos"])
        .assert()
        .failure();
}

// ============================================================================
// fatbin completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    fatbin(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fatbin"));
}
