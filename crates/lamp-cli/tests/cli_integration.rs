//! CLI subprocess integration tests.
//!
//! These tests invoke the `lamp` binary as a subprocess and verify exit
//! codes, stdout content, and JSON output shape.

use std::process::{Command, Output};

fn lamp_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lamp"));
    // The mock runtime does not need docker.
    cmd.env("LAMP_SKIP_PREREQS", "1");
    cmd.env_remove("LAMP_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    lamp_bin().args(args).output().unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("expected JSON output: {e}\nstdout: {stdout}"))
}

fn write_fleet(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("fleet.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_version_exits_zero() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("lamp"));
}

#[test]
fn cli_help_lists_commands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["systems", "resolve", "plan", "check", "up", "down", "doctor"] {
        assert!(stdout.contains(cmd), "help must list '{cmd}'");
    }
}

#[test]
fn cli_systems_json_lists_builtin_fleet() {
    let output = run(&["--json", "systems"]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    let ids: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 9);
    assert!(ids.contains(&"nglamp"));
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[test]
fn cli_inspect_unknown_system_is_config_error() {
    let output = run(&["inspect", "prism_v9"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown system: prism_v9"));
}

#[test]
fn cli_resolve_json_shows_merged_config() {
    let output = run(&["--json", "resolve", "nglamp"]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["system"], "nglamp");
    assert_eq!(parsed["host_class"], "nuc");
    assert_eq!(parsed["config"]["ros_domain_id"], 11);
    assert_eq!(parsed["config"]["tag"], "humble");
}

#[test]
fn cli_plan_is_deterministic() {
    let first = run(&["--json", "plan", "polaris_v2"]);
    let second = run(&["--json", "plan", "polaris_v2"]);
    assert!(first.status.success());
    let a = stdout_json(&first);
    let b = stdout_json(&second);
    assert_eq!(a, b);
    assert_eq!(a["digest"].as_str().unwrap().len(), 64);
    assert_eq!(a["short_digest"].as_str().unwrap().len(), 12);
    let services: Vec<&str> = a["plan"]["services"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        services,
        vec!["gpu-runtime", "lidar-driver", "imu-driver", "gnss-driver", "map-overlay"]
    );
}

#[test]
fn cli_plan_incompatible_host_exits_3() {
    let output = run(&["plan", "prism_v2", "--host-class", "macos-dev"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("incompatible host 'macos-dev'"));
}

#[test]
fn cli_plan_rejects_unknown_host_class() {
    let output = run(&["plan", "prism_v2", "--host-class", "raspberry-pi"]);
    assert!(!output.status.success());
}

#[test]
fn cli_check_reports_every_system() {
    let output = run(&["--json", "check"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed = stdout_json(&output);
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 9);
    assert!(rows.iter().all(|r| r["status"] == "ok"));
}

#[test]
fn cli_check_on_macos_flags_gpu_systems() {
    let output = run(&["--json", "check", "--host-class", "macos-dev"]);
    assert_eq!(output.status.code(), Some(3));
    let parsed = stdout_json(&output);
    let nglamp = parsed
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["system"] == "nglamp")
        .unwrap();
    assert_eq!(nglamp["status"], "incompatible");
}

#[test]
fn cli_up_with_mock_runtime() {
    let work = tempfile::tempdir().unwrap();
    let output = run(&[
        "--json",
        "up",
        "slamp",
        "--runtime",
        "mock",
        "--work-dir",
        &work.path().to_string_lossy(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed = stdout_json(&output);
    assert_eq!(parsed["project"], "lamp-slamp");
    assert_eq!(parsed["services"][0], "lidar-driver");
}

#[test]
fn cli_up_incompatible_host_exits_3() {
    let output = run(&[
        "up",
        "nglamp",
        "--runtime",
        "mock",
        "--host-class",
        "macos-dev",
    ]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn cli_down_when_not_running_is_runtime_error() {
    let output = run(&["down", "slamp", "--runtime", "mock"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("runtime error:"));
}

#[test]
fn cli_custom_fleet_file() {
    let dir = tempfile::tempdir().unwrap();
    let fleet = write_fleet(
        dir.path(),
        r#"
fleet_version = 1

[base]
tag = "iron"

[systems.bench]
host_class = "generic-x86"
capabilities = ["lidar"]
"#,
    );
    let output = run(&["--json", "--fleet", &fleet.to_string_lossy(), "plan", "bench"]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(
        parsed["plan"]["services"][0]["image"],
        "ghcr.io/lamp/lidar-driver:iron"
    );
}

#[test]
fn cli_invalid_fleet_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let fleet = write_fleet(
        dir.path(),
        "fleet_version = 1\n[systems.bench]\nhost_class = \"nuc\"\ncapabilities = [\"sonar\"]\n",
    );
    let output = run(&["--fleet", &fleet.to_string_lossy(), "systems"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("fleet error:"));
}

#[test]
fn cli_merge_conflict_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let fleet = write_fleet(
        dir.path(),
        r#"
fleet_version = 1

[base]
tag = "humble"

[systems.bench]
host_class = "nuc"
capabilities = ["lidar"]

[systems.bench.config]
tag = 2
"#,
    );
    let output = run(&["--fleet", &fleet.to_string_lossy(), "resolve", "bench"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("merge conflict on key 'tag'"));
}

#[test]
fn cli_config_dir_overrides_layers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("base.toml"), "tag = \"jazzy\"\n").unwrap();
    std::fs::create_dir(dir.path().join("clamp")).unwrap();

    let output = run(&[
        "--json",
        "--config-dir",
        &dir.path().to_string_lossy(),
        "resolve",
        "clamp",
    ]);
    assert!(output.status.success());
    let parsed = stdout_json(&output);
    assert_eq!(parsed["config"]["tag"], "jazzy");

    let missing = run(&[
        "--config-dir",
        &dir.path().to_string_lossy(),
        "resolve",
        "slamp",
    ]);
    assert_eq!(missing.status.code(), Some(2));
}

#[test]
fn cli_doctor_json_is_valid() {
    let output = run(&["--json", "doctor"]);
    let parsed = stdout_json(&output);
    assert!(parsed["healthy"].is_boolean());
    assert!(parsed["checks"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["name"] == "host_class"));
}

#[test]
fn cli_completions_bash() {
    let output = run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("lamp"));
}

#[test]
fn cli_man_pages_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["man-pages", &dir.path().to_string_lossy()]);
    assert!(output.status.success());
    assert!(dir.path().join("lamp.1").exists());
    assert!(dir.path().join("lamp-plan.1").exists());
}
