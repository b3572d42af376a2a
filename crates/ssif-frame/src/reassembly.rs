use crate::codec::{ContinuationBlock, FINAL_BLOCK};
use crate::error::{FrameError, Result};

/// Outcome of offering a continuation block to a [`Reassembly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// Data appended; more blocks follow.
    Appended,
    /// Final block appended; the response is complete.
    Complete,
    /// Block rejected. Nothing was appended and the expected sequence is unchanged.
    OutOfOrder { expected: u8, received: u8 },
}

/// Accumulates a multi-part response into a caller-supplied buffer.
///
/// Blocks are accepted only when their sequence number is the next expected
/// one or the final-block marker. The final marker ends reassembly even when
/// intermediate sequence numbers were never seen. Block 254 also ends it,
/// since no sequence number is left before the marker.
#[derive(Debug)]
pub struct Reassembly<'a> {
    buf: &'a mut [u8],
    len: usize,
    expected: u8,
}

impl<'a> Reassembly<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            expected: 0,
        }
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sequence number the next continuation block must carry.
    pub fn expected_sequence(&self) -> u8 {
        self.expected
    }

    /// Append raw response bytes, failing without writing if they do not fit.
    pub fn extend(&mut self, data: &[u8]) -> Result<()> {
        let required = self.len + data.len();
        if required > self.buf.len() {
            return Err(FrameError::ResponseTooLarge {
                required,
                capacity: self.buf.len(),
            });
        }
        self.buf[self.len..required].copy_from_slice(data);
        self.len = required;
        Ok(())
    }

    /// Offer a continuation block.
    pub fn accept(&mut self, block: &ContinuationBlock<'_>) -> Result<Accepted> {
        if block.sequence != self.expected && !block.is_final() {
            return Ok(Accepted::OutOfOrder {
                expected: self.expected,
                received: block.sequence,
            });
        }

        self.extend(block.data)?;
        if block.is_final() {
            return Ok(Accepted::Complete);
        }
        // `expected` is below FINAL_BLOCK here, so this cannot overflow.
        self.expected += 1;
        if self.expected == FINAL_BLOCK {
            return Ok(Accepted::Complete);
        }
        Ok(Accepted::Appended)
    }

    /// Consume the accumulator, returning the number of bytes written.
    pub fn finish(self) -> usize {
        self.len
    }
}
