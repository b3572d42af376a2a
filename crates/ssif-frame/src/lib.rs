//! SSIF framing over SMBus block transfers.
//!
//! An IPMI message travels as one or more SMBus blocks of at most 32 bytes:
//! - Requests that fit in one block go out as a single-part write
//! - Larger requests are split into start, middle and end writes
//! - Responses come back as a single block, or as a start block marked with
//!   `0x00 0x01` followed by sequence-numbered continuation blocks
//!
//! Encoding and decoding are pure functions over typed frames. Only
//! [`FrameWriter`] and [`BlockReader`] touch the bus.

pub mod codec;
pub mod command;
pub mod error;
pub mod message;
pub mod reader;
pub mod reassembly;
pub mod writer;

pub use codec::{
    decode_continuation, decode_first_block, encode_request, ContinuationBlock, FirstBlock,
    WriteFrame, FINAL_BLOCK, MAX_BLOCK_DATA, MAX_SINGLE_PART_REQUEST, MULTI_PART_READ_MARKER,
    READ_BLOCK_SIZE,
};
pub use command::{
    command_name, MULTI_PART_READ_MIDDLE, MULTI_PART_READ_RETRY, MULTI_PART_WRITE_END,
    MULTI_PART_WRITE_MIDDLE, MULTI_PART_WRITE_START, SINGLE_PART_READ, SINGLE_PART_WRITE,
};
pub use error::{FrameError, Result};
pub use message::{Request, IPMI_HEADER_SIZE};
pub use reader::BlockReader;
pub use reassembly::{Accepted, Reassembly};
pub use writer::FrameWriter;
