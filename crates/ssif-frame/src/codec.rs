use bytes::{BufMut, Bytes, BytesMut};

use crate::command::{
    MULTI_PART_READ_RETRY, MULTI_PART_WRITE_END, MULTI_PART_WRITE_MIDDLE, MULTI_PART_WRITE_START,
    SINGLE_PART_WRITE,
};
use crate::error::{FrameError, Result};
use crate::message::{Request, IPMI_HEADER_SIZE};

/// Maximum data bytes in one SMBus block.
pub const MAX_BLOCK_DATA: usize = 32;

/// Size of a block read: length byte + data.
pub const READ_BLOCK_SIZE: usize = MAX_BLOCK_DATA + 1;

/// Largest request that still goes out as a single-part write.
pub const MAX_SINGLE_PART_REQUEST: usize = MAX_BLOCK_DATA - IPMI_HEADER_SIZE;

/// Sequence number marking the last block of a multi-part response.
pub const FINAL_BLOCK: u8 = 0xff;

/// Leading bytes of the first block of a multi-part response.
pub const MULTI_PART_READ_MARKER: [u8; 2] = [0x00, 0x01];

/// SMBus write header: command + length.
const WRITE_HEADER_SIZE: usize = 2;

/// A block write placed on the bus.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬──────────────────────┐
/// │ Command (1B) │ Length (1B)  │ Payload (≤ 32 bytes) │
/// └──────────────┴──────────────┴──────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFrame {
    /// Complete request: header + data.
    SinglePart(Bytes),
    /// First 32 bytes of a multi-part request.
    MultiPartStart(Bytes),
    /// Next 32 bytes of a multi-part request.
    MultiPartMiddle(Bytes),
    /// Final 1..=32 bytes of a multi-part request.
    MultiPartEnd(Bytes),
    /// Ask for a multi-part response block to be sent again.
    ReadRetry { expected: u8 },
}

impl WriteFrame {
    /// SMBus command code for this frame.
    pub fn command(&self) -> u8 {
        match self {
            WriteFrame::SinglePart(_) => SINGLE_PART_WRITE,
            WriteFrame::MultiPartStart(_) => MULTI_PART_WRITE_START,
            WriteFrame::MultiPartMiddle(_) => MULTI_PART_WRITE_MIDDLE,
            WriteFrame::MultiPartEnd(_) => MULTI_PART_WRITE_END,
            WriteFrame::ReadRetry { .. } => MULTI_PART_READ_RETRY,
        }
    }

    /// Bytes following the length byte.
    pub fn payload(&self) -> &[u8] {
        match self {
            WriteFrame::SinglePart(data)
            | WriteFrame::MultiPartStart(data)
            | WriteFrame::MultiPartMiddle(data)
            | WriteFrame::MultiPartEnd(data) => data.as_ref(),
            WriteFrame::ReadRetry { expected } => std::slice::from_ref(expected),
        }
    }

    /// Total bytes handed to the bus master.
    pub fn wire_size(&self) -> usize {
        WRITE_HEADER_SIZE + self.payload().len()
    }

    /// Append the wire encoding to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        let payload = self.payload();
        debug_assert!(payload.len() <= MAX_BLOCK_DATA);
        dst.reserve(WRITE_HEADER_SIZE + payload.len());
        dst.put_u8(self.command());
        dst.put_u8(payload.len() as u8);
        dst.put_slice(payload);
    }
}

/// Split a request into the write frames that carry it, in bus order.
///
/// The concatenated frame payloads equal the IPMI header followed by the
/// request data. Requests up to [`MAX_SINGLE_PART_REQUEST`] bytes produce one
/// single-part frame; anything larger produces a full start frame, zero or
/// more full middle frames and a non-empty end frame.
pub fn encode_request(request: &Request<'_>) -> Vec<WriteFrame> {
    let mut message = BytesMut::with_capacity(request.encoded_len());
    message.put_slice(&request.header());
    message.put_slice(request.data());
    let mut message = message.freeze();

    if request.is_single_part() {
        return vec![WriteFrame::SinglePart(message)];
    }

    let mut frames =
        Vec::with_capacity(1 + (message.len() - MAX_BLOCK_DATA).div_ceil(MAX_BLOCK_DATA));
    frames.push(WriteFrame::MultiPartStart(message.split_to(MAX_BLOCK_DATA)));
    while message.len() > MAX_BLOCK_DATA {
        frames.push(WriteFrame::MultiPartMiddle(message.split_to(MAX_BLOCK_DATA)));
    }
    frames.push(WriteFrame::MultiPartEnd(message));
    frames
}

/// Decoded first response block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstBlock<'a> {
    /// The whole response; header already stripped.
    Single(&'a [u8]),
    /// First slice of a multi-part response; marker and header stripped.
    MultiPart(&'a [u8]),
}

/// A multi-part response continuation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuationBlock<'a> {
    pub sequence: u8,
    pub data: &'a [u8],
}

impl ContinuationBlock<'_> {
    pub fn is_final(&self) -> bool {
        self.sequence == FINAL_BLOCK
    }
}

/// Decode the block returned by a single-part read.
///
/// `raw` is the read buffer: a length byte followed by data. The echoed
/// NetFunction and Command are checked against `request`.
pub fn decode_first_block<'a>(raw: &'a [u8], request: &Request<'_>) -> Result<FirstBlock<'a>> {
    let payload = block_payload(raw)?;
    if payload.len() < IPMI_HEADER_SIZE {
        return Err(FrameError::ShortBlock {
            len: payload.len(),
            min: IPMI_HEADER_SIZE,
        });
    }

    if payload[..MULTI_PART_READ_MARKER.len()] == MULTI_PART_READ_MARKER {
        let header_end = MULTI_PART_READ_MARKER.len() + IPMI_HEADER_SIZE;
        if payload.len() < header_end {
            return Err(FrameError::ShortBlock {
                len: payload.len(),
                min: header_end,
            });
        }
        check_identity(request, payload[2], payload[3])?;
        return Ok(FirstBlock::MultiPart(&payload[header_end..]));
    }

    check_identity(request, payload[0], payload[1])?;
    Ok(FirstBlock::Single(&payload[IPMI_HEADER_SIZE..]))
}

/// Decode a block returned by a multi-part read middle/end request.
pub fn decode_continuation(raw: &[u8]) -> Result<ContinuationBlock<'_>> {
    let payload = block_payload(raw)?;
    match payload {
        [sequence, data @ ..] if !data.is_empty() => Ok(ContinuationBlock {
            sequence: *sequence,
            data,
        }),
        _ => Err(FrameError::ShortBlock {
            len: payload.len(),
            min: 2,
        }),
    }
}

/// Encode a single-part response block as a responder would return it.
///
/// Used to script simulated responders; the result is laid out exactly like
/// a block read buffer.
pub fn encode_response(request: &Request<'_>, data: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = IPMI_HEADER_SIZE + data.len();
    if len > MAX_BLOCK_DATA {
        return Err(FrameError::OversizedBlock {
            len,
            max: MAX_BLOCK_DATA,
        });
    }
    dst.reserve(1 + len);
    dst.put_u8(len as u8);
    dst.put_u8(request.response_net_function() << 2 | request.lun());
    dst.put_u8(request.command());
    dst.put_slice(data);
    Ok(())
}

fn block_payload(raw: &[u8]) -> Result<&[u8]> {
    let Some((&len, rest)) = raw.split_first() else {
        return Err(FrameError::ShortBlock { len: 0, min: 1 });
    };
    let len = usize::from(len);
    let max = MAX_BLOCK_DATA.min(rest.len());
    if len > max {
        return Err(FrameError::OversizedBlock { len, max });
    }
    Ok(&rest[..len])
}

fn check_identity(request: &Request<'_>, net_function_byte: u8, command: u8) -> Result<()> {
    let net_function = net_function_byte >> 2;
    if net_function != request.response_net_function() || command != request.command() {
        return Err(FrameError::IdentityMismatch {
            expected_net_function: request.response_net_function(),
            expected_command: request.command(),
            net_function,
            command,
        });
    }
    Ok(())
}
