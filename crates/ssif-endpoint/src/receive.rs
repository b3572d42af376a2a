use ssif_bus::{BusError, I2cMaster, Stall};
use ssif_frame::{
    decode_continuation, decode_first_block, Accepted, BlockReader, FirstBlock, FrameWriter,
    Reassembly, Request, WriteFrame, MULTI_PART_READ_MIDDLE, READ_BLOCK_SIZE,
    SINGLE_PART_READ,
};
use tracing::{debug, warn};

use crate::config::SsifConfig;
use crate::error::{Result, SsifError};
use crate::health::HealthTracker;
use crate::retry::{Attempt, Retry, RetryError};

/// Borrowed view of an endpoint for one response read.
pub(crate) struct Receiver<'a, M: ?Sized, S: ?Sized> {
    pub(crate) master: &'a mut M,
    pub(crate) stall: &'a mut S,
    pub(crate) writer: &'a mut FrameWriter,
    pub(crate) reader: &'a mut BlockReader,
    pub(crate) config: &'a SsifConfig,
    pub(crate) health: &'a mut HealthTracker,
}

impl<M, S> Receiver<'_, M, S>
where
    M: I2cMaster + ?Sized,
    S: Stall + ?Sized,
{
    /// Read and reassemble the response to `request` into `buf`.
    ///
    /// Returns the number of bytes written.
    pub(crate) fn receive(mut self, request: &Request<'_>, buf: &mut [u8]) -> Result<usize> {
        self.stall.stall(self.config.retry_delay);

        let first = self.read_first_block()?;
        match decode_first_block(&first, request)? {
            FirstBlock::Single(data) => {
                let mut reassembly = Reassembly::new(buf);
                reassembly.extend(data)?;
                debug!(len = reassembly.len(), "single-part response");
                Ok(reassembly.finish())
            }
            FirstBlock::MultiPart(data) => {
                let mut reassembly = Reassembly::new(buf);
                reassembly.extend(data)?;
                self.read_continuations(&mut reassembly)?;
                debug!(len = reassembly.len(), "multi-part response");
                Ok(reassembly.finish())
            }
        }
    }

    /// Poll for the first response block. Every unanswered poll counts
    /// against health, so a silent BMC degrades within a single request.
    fn read_first_block(&mut self) -> Result<[u8; READ_BLOCK_SIZE]> {
        let retry = Retry::new(self.config.retry_count, self.config.retry_delay);
        let Self {
            master,
            stall,
            reader,
            health,
            ..
        } = self;

        let outcome = retry.run(&mut **stall, |attempt| {
            match reader.read_block(&mut **master, SINGLE_PART_READ) {
                Ok(block) => {
                    let mut raw = [0u8; READ_BLOCK_SIZE];
                    raw.copy_from_slice(block);
                    Attempt::Done(raw)
                }
                Err(err) if err.bus_error().is_some_and(BusError::is_no_response) => {
                    let error_count = health.record_error();
                    debug!(attempt, error_count, "response not ready");
                    Attempt::Retry(err)
                }
                Err(err) => Attempt::Abort(err),
            }
        });

        match outcome {
            Ok(raw) => Ok(raw),
            Err(RetryError::Aborted(err)) => Err(err.into()),
            Err(RetryError::Exhausted { attempts, .. }) => Err(SsifError::NotReady { attempts }),
        }
    }

    fn read_continuations(&mut self, reassembly: &mut Reassembly<'_>) -> Result<()> {
        let resync = Retry::new(self.config.resync_limit, std::time::Duration::ZERO);
        let Self {
            master,
            stall,
            writer,
            reader,
            ..
        } = self;

        loop {
            let outcome = resync.run(&mut **stall, |_| {
                let raw = match reader.read_block(&mut **master, MULTI_PART_READ_MIDDLE) {
                    Ok(raw) => raw,
                    Err(err) => return Attempt::Abort(err),
                };
                let block = match decode_continuation(raw) {
                    Ok(block) => block,
                    Err(err) => return Attempt::Abort(err),
                };
                match reassembly.accept(&block) {
                    Ok(Accepted::Appended) => Attempt::Done(false),
                    Ok(Accepted::Complete) => Attempt::Done(true),
                    Ok(Accepted::OutOfOrder { expected, received }) => {
                        warn!(expected, received, "out-of-order block, requesting retry");
                        let retry_frame = WriteFrame::ReadRetry { expected };
                        match writer.write_frame(&mut **master, &retry_frame) {
                            Ok(()) => Attempt::Retry(expected),
                            Err(err) => Attempt::Abort(err),
                        }
                    }
                    Err(err) => Attempt::Abort(err),
                }
            });

            match outcome {
                Ok(true) => return Ok(()),
                Ok(false) => continue,
                Err(RetryError::Aborted(err)) => return Err(err.into()),
                Err(RetryError::Exhausted { attempts, last }) => {
                    return Err(SsifError::ResyncExhausted {
                        expected: last,
                        attempts,
                    })
                }
            }
        }
    }
}
