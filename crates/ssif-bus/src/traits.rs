use std::fmt;
use std::time::Duration;

use bitflags::bitflags;

use crate::error::Result;

/// 7-bit (or 10-bit) target address on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlaveAddress(u16);

impl SlaveAddress {
    pub const fn new(address: u16) -> Self {
        Self(address)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for SlaveAddress {
    fn from(address: u16) -> Self {
        Self(address)
    }
}

impl fmt::Display for SlaveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

bitflags! {
    /// Per-operation flags handed to the bus master.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperationFlags: u32 {
        /// Data moves from the target to the master.
        const READ = 1 << 0;
        /// The operation is part of an SMBus protocol transaction.
        const SMBUS_OPERATION = 1 << 16;
        /// SMBus block transfer (length-prefixed).
        const SMBUS_BLOCK = 1 << 17;
        /// Append and verify a packet error code.
        const SMBUS_PEC = 1 << 19;
    }
}

impl OperationFlags {
    /// Flags used for every SSIF block write.
    pub const SMBUS_BLOCK_PEC: Self = Self::SMBUS_OPERATION
        .union(Self::SMBUS_BLOCK)
        .union(Self::SMBUS_PEC);
}

/// One step of a bus request.
///
/// A request is an ordered slice of operations executed back to back with
/// repeated starts between them.
#[derive(Debug)]
pub enum Operation<'a> {
    Write {
        flags: OperationFlags,
        buf: &'a [u8],
    },
    Read {
        flags: OperationFlags,
        buf: &'a mut [u8],
    },
}

impl<'a> Operation<'a> {
    /// SMBus block write with PEC. `buf` is `[command, length, data...]`.
    pub fn block_write(buf: &'a [u8]) -> Self {
        Operation::Write {
            flags: OperationFlags::SMBUS_BLOCK_PEC,
            buf,
        }
    }

    /// Plain read filling `buf`.
    pub fn read(buf: &'a mut [u8]) -> Self {
        Operation::Read {
            flags: OperationFlags::READ,
            buf,
        }
    }

    pub fn flags(&self) -> OperationFlags {
        match self {
            Operation::Write { flags, .. } | Operation::Read { flags, .. } => *flags,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Operation::Write { buf, .. } => buf.len(),
            Operation::Read { buf, .. } => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Operation::Read { .. })
    }
}

/// A bus master able to run requests against a target.
///
/// Implementations own all electrical-level behavior. The caller only learns
/// whether the request completed, was not acknowledged, or failed.
pub trait I2cMaster {
    fn start_request(
        &mut self,
        address: SlaveAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<()>;
}

impl<T: I2cMaster + ?Sized> I2cMaster for &mut T {
    fn start_request(
        &mut self,
        address: SlaveAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<()> {
        (**self).start_request(address, operations)
    }
}

impl<T: I2cMaster + ?Sized> I2cMaster for Box<T> {
    fn start_request(
        &mut self,
        address: SlaveAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<()> {
        (**self).start_request(address, operations)
    }
}

/// A bounded delay between polling attempts.
pub trait Stall {
    fn stall(&mut self, duration: Duration);
}

/// [`Stall`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadStall;

impl Stall for ThreadStall {
    fn stall(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl<T: Stall + ?Sized> Stall for &mut T {
    fn stall(&mut self, duration: Duration) {
        (**self).stall(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_displays_as_hex() {
        assert_eq!(SlaveAddress::new(0x10).to_string(), "0x10");
        assert_eq!(SlaveAddress::from(0x7f).get(), 0x7f);
    }

    #[test]
    fn block_write_carries_pec() {
        let buf = [0x02, 0x02, 0x18, 0x01];
        let op = Operation::block_write(&buf);
        assert!(op.flags().contains(OperationFlags::SMBUS_PEC));
        assert!(op.flags().contains(OperationFlags::SMBUS_BLOCK));
        assert!(!op.is_read());
        assert_eq!(op.len(), 4);
    }

    #[test]
    fn read_operation_is_read() {
        let mut buf = [0u8; 33];
        let op = Operation::read(&mut buf);
        assert!(op.is_read());
        assert_eq!(op.flags(), OperationFlags::READ);
        assert_eq!(op.len(), 33);
    }

    #[test]
    fn master_usable_through_mutable_reference() {
        struct Counting(usize);
        impl I2cMaster for Counting {
            fn start_request(
                &mut self,
                _address: SlaveAddress,
                operations: &mut [Operation<'_>],
            ) -> Result<()> {
                self.0 += operations.len();
                Ok(())
            }
        }

        fn write_once<M: I2cMaster>(mut master: M) {
            let buf = [0x02, 0x00];
            master
                .start_request(SlaveAddress::new(0x10), &mut [Operation::block_write(&buf)])
                .unwrap();
        }

        let mut master = Counting(0);
        write_once(&mut master);
        write_once(&mut master);
        assert_eq!(master.0, 2);
    }
}
