use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use ssif_endpoint::{HealthReport, SelfTestOutcome};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ResponseOutput<'a> {
    schema_id: &'a str,
    net_function: u8,
    command: u8,
    completion_code: Option<u8>,
    response_size: usize,
    response: String,
    health: &'a HealthReport,
}

pub fn print_response(
    net_function: u8,
    command: u8,
    response: &[u8],
    health: &HealthReport,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = ResponseOutput {
                schema_id: "https://schemas.3leaps.dev/ssif/cli/v1/raw-response.schema.json",
                net_function,
                command,
                completion_code: response.first().copied(),
                response_size: response.len(),
                response: hex(response),
                health,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NETFN", "CMD", "CC", "SIZE", "DATA", "HEALTH"])
                .add_row(vec![
                    format!("{net_function:#04x}"),
                    format!("{command:#04x}"),
                    completion_code_text(response),
                    response.len().to_string(),
                    hex(response.get(1..).unwrap_or_default()),
                    health_text(health),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "netfn={net_function:#04x} cmd={command:#04x} cc={} size={} data={} health={}",
                completion_code_text(response),
                response.len(),
                hex(response.get(1..).unwrap_or_default()),
                health_text(health)
            );
        }
        OutputFormat::Raw => {
            print_raw(response);
        }
    }
}

#[derive(Serialize)]
struct SelfTestOutput<'a> {
    schema_id: &'a str,
    passed: bool,
    outcome: &'a str,
    result: Option<u8>,
    detail: Option<u8>,
    error: Option<String>,
    health: &'a HealthReport,
}

pub fn print_selftest(outcome: &SelfTestOutcome, health: &HealthReport, format: OutputFormat) {
    let (label, result, detail, error) = match outcome {
        SelfTestOutcome::Passed(r) => ("passed", Some(r.result), Some(r.detail), None),
        SelfTestOutcome::Failed(r) => ("failed", Some(r.result), Some(r.detail), None),
        SelfTestOutcome::Malformed(len) => (
            "malformed",
            None,
            None,
            Some(format!("response held {len} bytes")),
        ),
        SelfTestOutcome::Unreachable(err) => ("unreachable", None, None, Some(err.to_string())),
    };

    match format {
        OutputFormat::Json => {
            let out = SelfTestOutput {
                schema_id: "https://schemas.3leaps.dev/ssif/cli/v1/selftest.schema.json",
                passed: outcome.passed(),
                outcome: label,
                result,
                detail,
                error,
                health,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OUTCOME", "RESULT", "DETAIL", "HEALTH"])
                .add_row(vec![
                    label.to_string(),
                    result.map(|r| format!("{r:#04x}")).unwrap_or_default(),
                    error
                        .clone()
                        .or_else(|| detail.map(|d| format!("{d:#04x}")))
                        .unwrap_or_default(),
                    health_text(health),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            print!("selftest={label}");
            if let Some(result) = result {
                print!(" result={result:#04x}");
            }
            if let Some(error) = &error {
                print!(" error=\"{error}\"");
            }
            println!(" health={}", health_text(health));
        }
        OutputFormat::Raw => {
            println!("{label}");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn completion_code_text(response: &[u8]) -> String {
    response
        .first()
        .map(|cc| format!("{cc:#04x}"))
        .unwrap_or_else(|| "-".to_string())
}

fn health_text(health: &HealthReport) -> String {
    format!("{} ({} errors)", health.state.as_str(), health.error_count)
}

#[cfg(test)]
mod tests {
    use ssif_endpoint::{BmcAddress, HealthState};

    use super::*;

    #[test]
    fn hex_is_space_separated() {
        assert_eq!(hex(&[0x00, 0x1c, 0xff]), "00 1c ff");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn response_output_serializes_health() {
        let health = HealthReport {
            state: HealthState::SoftFail,
            address: BmcAddress::sm_bmc(0x20),
            error_count: 2,
        };
        let out = ResponseOutput {
            schema_id: "x",
            net_function: 6,
            command: 1,
            completion_code: Some(0),
            response_size: 1,
            response: hex(&[0]),
            health: &health,
        };
        let json = serde_json::to_string(&out).expect("response output should serialize");
        assert!(json.contains("\"state\":\"soft_fail\""));
        assert!(json.contains("\"channel_type\":\"sm_bmc\""));
        assert!(json.contains("\"error_count\":2"));
    }
}
