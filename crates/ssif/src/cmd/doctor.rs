use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use ssif_endpoint::SsifConfig;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

const DEV_DIR: &str = "/dev";

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let adapters = list_adapters(Path::new(DEV_DIR));
    let checks = vec![
        platform_bus_check(),
        adapters_check(&adapters),
        adapter_access_check(&adapters),
        configured_device_check(std::env::var_os("SSIF_DEVICE").map(PathBuf::from)),
        transport_defaults_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput {
        schema_id: "https://schemas.3leaps.dev/ssif/cli/v1/doctor-report.schema.json",
        checks,
        overall,
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("ssif doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_bus_check() -> CheckResult {
    if cfg!(target_os = "linux") {
        CheckResult::new("platform_bus", CheckStatus::Pass, "Linux i2c-dev master available")
    } else {
        CheckResult::new(
            "platform_bus",
            CheckStatus::Fail,
            "no bus master for this platform (i2c-dev is Linux only)",
        )
    }
}

/// i2c-dev nodes under `dir`, sorted.
fn list_adapters(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut adapters: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix("i2c-"))
                .is_some_and(|bus| !bus.is_empty() && bus.bytes().all(|b| b.is_ascii_digit()))
        })
        .map(|entry| entry.path())
        .collect();
    adapters.sort();
    adapters
}

fn adapters_check(adapters: &[PathBuf]) -> CheckResult {
    if adapters.is_empty() {
        return CheckResult::new(
            "i2c_adapters",
            CheckStatus::Fail,
            "no /dev/i2c-* nodes found (is the i2c-dev module loaded?)",
        );
    }
    let names: Vec<String> = adapters.iter().map(|p| p.display().to_string()).collect();
    CheckResult::new("i2c_adapters", CheckStatus::Pass, names.join(", "))
}

fn adapter_access_check(adapters: &[PathBuf]) -> CheckResult {
    if adapters.is_empty() {
        return CheckResult::new("adapter_access", CheckStatus::Skip, "no adapters to open");
    }

    let denied: Vec<String> = adapters
        .iter()
        .filter(|path| {
            open_read_write(path)
                .is_err_and(|err| err.kind() == io::ErrorKind::PermissionDenied)
        })
        .map(|path| path.display().to_string())
        .collect();

    if denied.is_empty() {
        CheckResult::new("adapter_access", CheckStatus::Pass, "read/write access to all adapters")
    } else if denied.len() == adapters.len() {
        CheckResult::new(
            "adapter_access",
            CheckStatus::Fail,
            "permission denied on every adapter (add the user to the i2c group)",
        )
    } else {
        CheckResult::new(
            "adapter_access",
            CheckStatus::Warn,
            format!("permission denied: {}", denied.join(", ")),
        )
    }
}

fn configured_device_check(device: Option<PathBuf>) -> CheckResult {
    let Some(device) = device else {
        return CheckResult::new("ssif_device", CheckStatus::Skip, "SSIF_DEVICE not set");
    };
    match open_read_write(&device) {
        Ok(()) => CheckResult::new(
            "ssif_device",
            CheckStatus::Pass,
            format!("{} opened read/write", device.display()),
        ),
        Err(err) if err.kind() == io::ErrorKind::NotFound => CheckResult::new(
            "ssif_device",
            CheckStatus::Fail,
            format!("{} does not exist", device.display()),
        ),
        Err(err) => CheckResult::new(
            "ssif_device",
            CheckStatus::Fail,
            format!("{}: {err}", device.display()),
        ),
    }
}

fn transport_defaults_check() -> CheckResult {
    let config = SsifConfig::default();
    CheckResult::new(
        "transport_defaults",
        CheckStatus::Info,
        format!(
            "retries={} delay={}ms resync={} hard_fail_threshold={}",
            config.retry_count,
            config.retry_delay.as_millis(),
            config.resync_limit,
            config.hard_fail_threshold
        ),
    )
}

fn open_read_write(path: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).write(true).open(path).map(drop)
}
