//! I2C/SMBus bus-master abstraction.
//!
//! This is the lowest layer of the SSIF stack. It defines what the transport
//! needs from a bus master and nothing more:
//! - [`I2cMaster`] executes an ordered list of [`Operation`]s against one
//!   target address and reports success, failure, or "no response"
//! - [`Stall`] provides the bounded delays used between polling attempts
//! - [`DeviceEnumerator`] supplies the devices found on the bus
//!
//! Packet error checking, arbitration and clock stretching all belong to the
//! master implementation.

pub mod enumerate;
pub mod error;
pub mod traits;

#[cfg(target_os = "linux")]
pub mod linux;

pub use enumerate::{DeviceEnumerator, I2cDevice, StaticEnumerator, SSIF_BMC_COMPATIBLE};
pub use error::{BusError, Result};
pub use traits::{I2cMaster, Operation, OperationFlags, SlaveAddress, Stall, ThreadStall};

#[cfg(target_os = "linux")]
pub use linux::LinuxI2cMaster;
