use ssif_bus::{DeviceEnumerator, I2cMaster, SlaveAddress, Stall};
use tracing::{error, info};

use crate::config::SsifConfig;
use crate::endpoint::SsifEndpoint;
use crate::error::{Result, SsifError};

/// Find the slave address of the first usable SSIF BMC.
///
/// SSIF devices must answer on exactly one address; others are skipped.
pub fn find_bmc<E>(enumerator: &E) -> Result<SlaveAddress>
where
    E: DeviceEnumerator + ?Sized,
{
    for device in enumerator.devices() {
        if !device.is_ssif_bmc() {
            continue;
        }
        match device.slave_addresses.as_slice() {
            [address] => return Ok(*address),
            addresses => error!(
                compatible = %device.compatible,
                count = addresses.len(),
                "SSIF device must expose exactly one slave address, skipping"
            ),
        }
    }
    Err(SsifError::NoDevice)
}

/// Discover the BMC and bind an endpoint to it.
pub fn bind<E, M, S>(
    enumerator: &E,
    master: M,
    config: SsifConfig,
    stall: S,
) -> Result<SsifEndpoint<M, S>>
where
    E: DeviceEnumerator + ?Sized,
    M: I2cMaster,
    S: Stall,
{
    let address = find_bmc(enumerator)?;
    info!(%address, "bound SSIF endpoint");
    Ok(SsifEndpoint::with_stall(master, address, config, stall))
}
