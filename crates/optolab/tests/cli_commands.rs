#![cfg(all(unix, feature = "cli"))]

use std::path::Path;
use std::process::{Command, Output};

const HEADER_SIZE: usize = 4100;

fn optolab(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_optolab"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("optolab should run")
}

fn put(raw: &mut [u8], at: usize, bytes: &[u8]) {
    raw[at..at + bytes.len()].copy_from_slice(bytes);
}

/// Two frames of 3x2 unsigned 16-bit samples counting up from `base`.
fn write_spe(path: &Path, base: u16) {
    let mut raw = vec![0u8; HEADER_SIZE];
    put(&mut raw, 42, &3u16.to_le_bytes());
    put(&mut raw, 656, &2u16.to_le_bytes());
    put(&mut raw, 1446, &2i32.to_le_bytes());
    put(&mut raw, 108, &3u16.to_le_bytes());
    put(&mut raw, 3263, &500.0f64.to_le_bytes());
    put(&mut raw, 3271, &0.5f64.to_le_bytes());
    for i in 0..12u16 {
        raw.extend_from_slice(&(base + i).to_le_bytes());
    }
    std::fs::write(path, raw).expect("spe file should be writable");
}

#[test]
fn version_prints_package_version() {
    let output = optolab(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("optolab {}", env!("CARGO_PKG_VERSION")));

    let output = optolab(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: optolab"));
    assert!(stdout.contains("features: "));
}

#[test]
fn spe_info_reports_header_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.spe");
    write_spe(&path, 10);

    let output = optolab(&["--format", "json", "spe", "info", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("optolab/cli/v1/spe-info"));
    assert!(stdout.contains("\"x_dim\":3"));
    assert!(stdout.contains("\"datatype\":\"uint16\""));
    assert!(stdout.contains("\"max\":21.0"));
}

#[test]
fn spe_axis_uses_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.spe");
    write_spe(&path, 0);

    let output = optolab(&["--format", "raw", "spe", "axis", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let axis: Vec<&str> = stdout.lines().collect();
    assert_eq!(axis, ["500", "500.5", "501"]);
}

#[test]
fn spe_subtract_removes_background() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("scan.spe");
    let dark = dir.path().join("dark.spe");
    write_spe(&image, 110);
    write_spe(&dark, 100);

    let output = optolab(&[
        "--format",
        "raw",
        "spe",
        "subtract",
        image.to_str().unwrap(),
        "--background",
        dark.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.lines().all(|line| line == "10 10 10"));
}

#[test]
fn spe_missing_file_exits_1() {
    let output = optolab(&["spe", "info", "/nonexistent/optolab/missing.spe"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
}

#[test]
fn spe_truncated_file_exits_60() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.spe");
    write_spe(&path, 0);
    let mut raw = std::fs::read(&path).unwrap();
    raw.truncate(raw.len() - 4);
    std::fs::write(&path, raw).unwrap();

    let output = optolab(&["spe", "info", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn zaber_simulated_home_replies_per_device() {
    let output = optolab(&["--format", "json", "zaber", "--simulate", "2", "home"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("optolab/cli/v1/zaber-replies"));
    assert!(stdout.contains("\"device_id\":1"));
    assert!(stdout.contains("\"device_id\":2"));
}

#[test]
fn zaber_simulated_move_then_position() {
    let output = optolab(&[
        "--format", "raw", "zaber", "--simulate", "1", "move-abs", "-d", "1", "1200",
    ]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1 1200");
}

#[test]
fn zaber_unknown_device_number_is_rejected() {
    let output = optolab(&["zaber", "--simulate", "1", "position", "-d", "0"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn sweep_simulated_emits_one_line_per_step() {
    let output = optolab(&[
        "--format", "json", "sweep", "--simulate", "--start", "0", "--end", "1", "--step", "0.25",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| l.contains("optolab/cli/v1/sweep-step")));
    assert!(lines[4].contains("\"setpoint\":1.0"));
}

#[test]
fn sweep_nested_runs_inner_for_each_outer_step() {
    let output = optolab(&[
        "--format",
        "raw",
        "sweep",
        "--simulate",
        "--start",
        "1",
        "--end",
        "0",
        "--step",
        "0.5",
        "--zaber-start",
        "0",
        "--zaber-end",
        "200",
        "--zaber-step",
        "100",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 9);
    assert!(stdout.lines().next().unwrap().starts_with("1 "));
}

#[test]
fn sweep_voltage_above_limit_fails_with_usage() {
    let output = optolab(&[
        "sweep", "--simulate", "--start", "9", "--end", "11", "--step", "1",
    ]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn sweep_without_port_or_simulator_is_a_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_optolab"))
        .args(["sweep", "--start", "0", "--end", "1", "--step", "1"])
        .env_remove("OPTOLAB_LCVR_PORT")
        .output()
        .expect("optolab should run");
    assert_eq!(output.status.code(), Some(2));
}
