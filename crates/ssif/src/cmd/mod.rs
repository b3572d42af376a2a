use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use ssif_bus::{I2cMaster, SlaveAddress};
use ssif_endpoint::{SsifConfig, SsifEndpoint};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod raw;
pub mod selftest;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit one IPMI request and print the response.
    Raw(RawArgs),
    /// Run the BMC self test.
    Selftest(SelftestArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Raw(args) => raw::run(args, format),
        Command::Selftest(args) => selftest::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Doctor(args) => doctor::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct BusArgs {
    /// i2c-dev adapter, e.g. /dev/i2c-1.
    #[arg(long, env = "SSIF_DEVICE")]
    pub device: PathBuf,
    /// 7-bit BMC slave address (hex with 0x prefix, or decimal).
    #[arg(long, env = "SSIF_ADDRESS")]
    pub address: String,
    /// Attempts allowed for the first response read.
    #[arg(long, default_value_t = 10)]
    pub retries: u32,
    /// Delay before the first read and between retries (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub retry_delay: String,
    /// Reads allowed while resynchronizing a multi-part response.
    #[arg(long, default_value_t = 10)]
    pub resync_limit: u32,
    /// Largest response accepted, in bytes.
    #[arg(long, default_value_t = 4096)]
    pub max_response_size: usize,
    /// Soft errors at which health is reported as hard_fail.
    #[arg(long, default_value_t = 10)]
    pub hard_fail_threshold: u32,
    /// BMC logical address reported in health output.
    #[arg(long, default_value = "0x20")]
    pub logical_address: String,
}

#[derive(Args, Debug)]
pub struct RawArgs {
    #[command(flatten)]
    pub bus: BusArgs,
    /// IPMI NetFunction.
    pub net_function: String,
    /// IPMI command.
    pub command: String,
    /// Request data bytes.
    pub data: Vec<String>,
    /// Logical unit number.
    #[arg(long, default_value = "0")]
    pub lun: String,
    /// Send the request without reading a response.
    #[arg(long)]
    pub no_response: bool,
}

#[derive(Args, Debug)]
pub struct SelftestArgs {
    #[command(flatten)]
    pub bus: BusArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

impl BusArgs {
    pub fn config(&self) -> CliResult<SsifConfig> {
        Ok(SsifConfig {
            retry_count: self.retries,
            retry_delay: parse_duration(&self.retry_delay)?,
            resync_limit: self.resync_limit,
            hard_fail_threshold: self.hard_fail_threshold,
            max_response_size: self.max_response_size,
            logical_address: parse_byte("--logical-address", &self.logical_address)?,
        })
    }

    pub fn slave_address(&self) -> CliResult<SlaveAddress> {
        let address = parse_byte("--address", &self.address)?;
        if address > 0x7f {
            return Err(CliError::new(
                USAGE,
                format!("--address {address:#04x} is not a 7-bit address"),
            ));
        }
        Ok(SlaveAddress::new(u16::from(address)))
    }

    /// Validate arguments, then open the adapter and bind an endpoint.
    pub fn open(&self) -> CliResult<SsifEndpoint<Box<dyn I2cMaster>>> {
        let config = self.config()?;
        let address = self.slave_address()?;
        let master = open_master(&self.device)?;
        Ok(SsifEndpoint::with_config(master, address, config))
    }
}

#[cfg(target_os = "linux")]
fn open_master(path: &Path) -> CliResult<Box<dyn I2cMaster>> {
    let master = ssif_bus::LinuxI2cMaster::open(path)
        .map_err(|err| crate::exit::bus_error("open failed", err))?;
    Ok(Box::new(master))
}

#[cfg(not(target_os = "linux"))]
fn open_master(path: &Path) -> CliResult<Box<dyn I2cMaster>> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        format!("{}: i2c-dev adapters are only supported on Linux", path.display()),
    ))
}

/// Parse a byte given as `0x`-prefixed hex or decimal.
pub fn parse_byte(name: &str, input: &str) -> CliResult<u8> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("{name}: invalid byte value: {input}")))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
