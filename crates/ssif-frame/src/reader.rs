use ssif_bus::{I2cMaster, Operation, OperationFlags, SlaveAddress};
use tracing::trace;

use crate::codec::READ_BLOCK_SIZE;
use crate::command::command_name;
use crate::error::{FrameError, Result};

/// Reads response blocks with a command write followed by a block read.
///
/// The returned slice is the raw read buffer: a length byte followed by up
/// to 32 data bytes. It stays valid until the next read.
#[derive(Debug)]
pub struct BlockReader {
    address: SlaveAddress,
    buf: [u8; READ_BLOCK_SIZE],
}

impl BlockReader {
    pub fn new(address: SlaveAddress) -> Self {
        Self {
            address,
            buf: [0; READ_BLOCK_SIZE],
        }
    }

    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    /// Issue `command` and read one block (blocking).
    pub fn read_block<M>(&mut self, master: &mut M, command: u8) -> Result<&[u8]>
    where
        M: I2cMaster + ?Sized,
    {
        self.buf = [0; READ_BLOCK_SIZE];
        let select = [command];
        let mut operations = [
            Operation::Write {
                flags: OperationFlags::SMBUS_BLOCK_PEC,
                buf: &select,
            },
            Operation::read(&mut self.buf),
        ];

        master
            .start_request(self.address, &mut operations)
            .map_err(|err| FrameError::bus(command, err))?;

        trace!(
            address = %self.address,
            command = command_name(command),
            len = self.buf[0],
            "read block"
        );
        Ok(&self.buf)
    }
}
