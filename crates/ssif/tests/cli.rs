#![cfg(all(target_os = "linux", feature = "cli"))]

use std::process::{Command, Output};

fn ssif(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ssif"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env_remove("SSIF_DEVICE")
        .env_remove("SSIF_ADDRESS")
        .output()
        .expect("ssif should run")
}

const MISSING_DEVICE: &str = "/nonexistent/ssif-test/i2c-99";

#[test]
fn version_prints_package_version() {
    let output = ssif(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("ssif {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn extended_version_reports_bus() {
    let output = ssif(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: ssif"));
    assert!(stdout.contains("bus: linux-i2c-dev"));
}

#[test]
fn invalid_net_function_is_usage_error_before_open() {
    let output = ssif(&[
        "raw",
        "--device",
        MISSING_DEVICE,
        "--address",
        "0x10",
        "0x40",
        "0x01",
    ]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid request"));
}

#[test]
fn unparsable_data_byte_is_usage_error() {
    let output = ssif(&[
        "raw",
        "--device",
        MISSING_DEVICE,
        "--address",
        "0x10",
        "6",
        "1",
        "0x1ff",
    ]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("DATA"));
}

#[test]
fn wide_address_is_usage_error() {
    let output = ssif(&["selftest", "--device", MISSING_DEVICE, "--address", "0x80"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn missing_device_is_transport_error() {
    let output = ssif(&[
        "raw",
        "--device",
        MISSING_DEVICE,
        "--address",
        "0x10",
        "6",
        "1",
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("open failed"));
}

#[test]
fn missing_required_args_fail_parsing() {
    let output = ssif(&["raw", "6", "1"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn doctor_json_reports_overall() {
    let output = ssif(&["--format", "json", "doctor"]);
    let code = output.status.code();
    assert!(matches!(code, Some(0) | Some(30)), "unexpected exit: {code:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("doctor-report.schema.json"));
    assert!(stdout.contains("\"overall\":"));
    assert!(stdout.contains("\"platform_bus\""));
}
