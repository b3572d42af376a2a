//! Devices discovered on a bus.
//!
//! Enumeration happens outside the transport (firmware tables, device tree,
//! or the command line). The transport only consumes the result.

use crate::traits::SlaveAddress;

/// Compatible id of an SSIF BMC node.
pub const SSIF_BMC_COMPATIBLE: &str = "ipmi-ssif";

/// A device found on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cDevice {
    /// Compatible id identifying what sits behind the addresses.
    pub compatible: String,
    /// Slave addresses the device answers on.
    pub slave_addresses: Vec<SlaveAddress>,
}

impl I2cDevice {
    pub fn new(compatible: impl Into<String>, slave_addresses: Vec<SlaveAddress>) -> Self {
        Self {
            compatible: compatible.into(),
            slave_addresses,
        }
    }

    /// An SSIF BMC answering on a single address.
    pub fn ssif_bmc(address: SlaveAddress) -> Self {
        Self::new(SSIF_BMC_COMPATIBLE, vec![address])
    }

    pub fn is_ssif_bmc(&self) -> bool {
        self.compatible == SSIF_BMC_COMPATIBLE
    }
}

/// Source of bus devices.
pub trait DeviceEnumerator {
    fn devices(&self) -> Vec<I2cDevice>;
}

/// Enumerator over a fixed device list.
#[derive(Debug, Clone, Default)]
pub struct StaticEnumerator {
    devices: Vec<I2cDevice>,
}

impl StaticEnumerator {
    pub fn new(devices: Vec<I2cDevice>) -> Self {
        Self { devices }
    }
}

impl DeviceEnumerator for StaticEnumerator {
    fn devices(&self) -> Vec<I2cDevice> {
        self.devices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssif_bmc_constructor_sets_compatible() {
        let device = I2cDevice::ssif_bmc(SlaveAddress::new(0x10));
        assert!(device.is_ssif_bmc());
        assert_eq!(device.slave_addresses, vec![SlaveAddress::new(0x10)]);
    }

    #[test]
    fn static_enumerator_returns_its_devices() {
        let devices = vec![
            I2cDevice::new("atmel,24c02", vec![SlaveAddress::new(0x50)]),
            I2cDevice::ssif_bmc(SlaveAddress::new(0x10)),
        ];
        let enumerator = StaticEnumerator::new(devices.clone());
        assert_eq!(enumerator.devices(), devices);
    }
}
