use bytes::BytesMut;
use ssif_bus::{I2cMaster, Operation, SlaveAddress};
use tracing::{debug, trace};

use crate::codec::{WriteFrame, MAX_BLOCK_DATA};
use crate::command::command_name;
use crate::error::{FrameError, Result};

/// Places write frames on the bus as SMBus block writes with PEC.
#[derive(Debug)]
pub struct FrameWriter {
    address: SlaveAddress,
    buf: BytesMut,
}

impl FrameWriter {
    pub fn new(address: SlaveAddress) -> Self {
        Self {
            address,
            buf: BytesMut::with_capacity(MAX_BLOCK_DATA + 2),
        }
    }

    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    /// Write a single frame (blocking).
    pub fn write_frame<M>(&mut self, master: &mut M, frame: &WriteFrame) -> Result<()>
    where
        M: I2cMaster + ?Sized,
    {
        self.buf.clear();
        frame.encode(&mut self.buf);

        trace!(
            address = %self.address,
            command = command_name(frame.command()),
            len = frame.payload().len(),
            "writing frame"
        );
        master
            .start_request(self.address, &mut [Operation::block_write(&self.buf)])
            .map_err(|err| FrameError::bus(frame.command(), err))
    }

    /// Write frames in order, stopping at the first failure.
    ///
    /// Nothing is sent to undo frames that already went out.
    pub fn write_all<M>(&mut self, master: &mut M, frames: &[WriteFrame]) -> Result<()>
    where
        M: I2cMaster + ?Sized,
    {
        for (index, frame) in frames.iter().enumerate() {
            if let Err(err) = self.write_frame(master, frame) {
                debug!(
                    address = %self.address,
                    frame = index,
                    frames = frames.len(),
                    "write aborted"
                );
                return Err(err);
            }
        }
        Ok(())
    }
}
