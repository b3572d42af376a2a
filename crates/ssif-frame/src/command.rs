//! SMBus command codes carrying SSIF traffic.
//!
//! Codes 0x09 and 0x0A follow the Arm Server Base Manageability Requirements
//! for multi-part reads.

/// Whole request in one block.
pub const SINGLE_PART_WRITE: u8 = 0x02;

/// Read the response (or the first block of a multi-part response).
pub const SINGLE_PART_READ: u8 = 0x03;

/// First block of a multi-part request.
pub const MULTI_PART_WRITE_START: u8 = 0x06;

/// Intermediate block of a multi-part request.
pub const MULTI_PART_WRITE_MIDDLE: u8 = 0x07;

/// Last block of a multi-part request.
pub const MULTI_PART_WRITE_END: u8 = 0x08;

/// Read the next block of a multi-part response.
pub const MULTI_PART_READ_MIDDLE: u8 = 0x09;

/// Ask the responder to resend a multi-part response block.
pub const MULTI_PART_READ_RETRY: u8 = 0x0A;

/// Returns a human-readable name for an SMBus command code.
pub fn command_name(command: u8) -> &'static str {
    match command {
        SINGLE_PART_WRITE => "single-part write",
        SINGLE_PART_READ => "single-part read",
        MULTI_PART_WRITE_START => "multi-part write start",
        MULTI_PART_WRITE_MIDDLE => "multi-part write middle",
        MULTI_PART_WRITE_END => "multi-part write end",
        MULTI_PART_READ_MIDDLE => "multi-part read middle/end",
        MULTI_PART_READ_RETRY => "multi-part read retry",
        _ => "unknown",
    }
}
