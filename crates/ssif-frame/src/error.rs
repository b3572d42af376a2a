use ssif_bus::BusError;

use crate::command::command_name;

/// Errors that can occur while framing or deframing SSIF traffic.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// NetFunction does not fit in the six bits the header provides.
    #[error("invalid NetFunction {0:#04x} (max 0x3f)")]
    InvalidNetFunction(u8),

    /// LUN does not fit in two bits.
    #[error("invalid LUN {0} (max 3)")]
    InvalidLun(u8),

    /// The bus master failed a transaction.
    #[error("{stage} failed: {source}")]
    Bus {
        command: u8,
        stage: &'static str,
        source: BusError,
    },

    /// A block's length byte is too small for what the block must carry.
    #[error("block length {len} shorter than expected {min}")]
    ShortBlock { len: usize, min: usize },

    /// A block's length byte claims more data than a block can hold.
    #[error("block length {len} exceeds maximum {max}")]
    OversizedBlock { len: usize, max: usize },

    /// The response does not answer the request that was sent.
    #[error(
        "unexpected NetFn:Command {net_function:#04x}:{command:#04x}, \
         expected {expected_net_function:#04x}:{expected_command:#04x}"
    )]
    IdentityMismatch {
        expected_net_function: u8,
        expected_command: u8,
        net_function: u8,
        command: u8,
    },

    /// The reassembled response would not fit in the caller's buffer.
    #[error("response needs {required} bytes, buffer holds {capacity}")]
    ResponseTooLarge { required: usize, capacity: usize },
}

impl FrameError {
    pub(crate) fn bus(command: u8, source: BusError) -> Self {
        FrameError::Bus {
            command,
            stage: command_name(command),
            source,
        }
    }

    /// Returns the bus error behind a failed transaction, if any.
    pub fn bus_error(&self) -> Option<&BusError> {
        match self {
            FrameError::Bus { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
