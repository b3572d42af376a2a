use crate::codec::MAX_BLOCK_DATA;
use crate::error::{FrameError, Result};

/// IPMI header carried ahead of the request data: `[NetFn<<2 | LUN, Cmd]`.
pub const IPMI_HEADER_SIZE: usize = 2;

const MAX_NET_FUNCTION: u8 = 0x3f;
const MAX_LUN: u8 = 0x03;

/// An outbound IPMI request.
///
/// Fields are validated on construction so every later stage can pack them
/// into the header byte without masking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    net_function: u8,
    lun: u8,
    command: u8,
    data: &'a [u8],
}

impl<'a> Request<'a> {
    pub fn new(net_function: u8, lun: u8, command: u8, data: &'a [u8]) -> Result<Self> {
        if net_function > MAX_NET_FUNCTION {
            return Err(FrameError::InvalidNetFunction(net_function));
        }
        if lun > MAX_LUN {
            return Err(FrameError::InvalidLun(lun));
        }
        Ok(Self {
            net_function,
            lun,
            command,
            data,
        })
    }

    pub fn net_function(&self) -> u8 {
        self.net_function
    }

    pub fn lun(&self) -> u8 {
        self.lun
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The two header bytes placed ahead of the request data.
    pub fn header(&self) -> [u8; IPMI_HEADER_SIZE] {
        [self.net_function << 2 | self.lun, self.command]
    }

    /// NetFunction the responder must echo (request NetFn + 1).
    pub fn response_net_function(&self) -> u8 {
        self.net_function + 1
    }

    /// Header plus data length.
    pub fn encoded_len(&self) -> usize {
        IPMI_HEADER_SIZE + self.data.len()
    }

    /// Whether the request fits in one single-part write.
    pub fn is_single_part(&self) -> bool {
        self.encoded_len() <= MAX_BLOCK_DATA
    }
}
