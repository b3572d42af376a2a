use serde::Serialize;
use ssif_frame::FrameError;

/// Errors that can occur while talking to a BMC over SSIF.
#[derive(Debug, thiserror::Error)]
pub enum SsifError {
    /// Frame-level error (bus failure, malformed block, identity, capacity).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The responder never acknowledged the response read.
    #[error("response not ready after {attempts} attempts")]
    NotReady { attempts: u32 },

    /// A multi-part response kept arriving out of order.
    #[error("multi-part read lost sync: block {expected} not received in {attempts} reads")]
    ResyncExhausted { expected: u8, attempts: u32 },

    /// Enumeration yielded no usable SSIF BMC.
    #[error("no SSIF BMC device found")]
    NoDevice,
}

/// Coarse classification of an [`SsifError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request itself was malformed; nothing reached the bus.
    InvalidRequest,
    /// The bus master reported a failure.
    Transport,
    /// The first-read retry budget ran out.
    NotReady,
    /// A block was too short or too long.
    Framing,
    /// The response echoed a different NetFn/Command.
    IdentityMismatch,
    /// The response did not fit the caller's buffer.
    ResourceExhausted,
    /// Out-of-order blocks persisted past the resync budget.
    ResyncExhausted,
    /// Device discovery failed.
    Discovery,
}

impl SsifError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SsifError::Frame(err) => match err {
                FrameError::InvalidNetFunction(_) | FrameError::InvalidLun(_) => {
                    ErrorKind::InvalidRequest
                }
                FrameError::Bus { .. } => ErrorKind::Transport,
                FrameError::ShortBlock { .. } | FrameError::OversizedBlock { .. } => {
                    ErrorKind::Framing
                }
                FrameError::IdentityMismatch { .. } => ErrorKind::IdentityMismatch,
                FrameError::ResponseTooLarge { .. } => ErrorKind::ResourceExhausted,
            },
            SsifError::NotReady { .. } => ErrorKind::NotReady,
            SsifError::ResyncExhausted { .. } => ErrorKind::ResyncExhausted,
            SsifError::NoDevice => ErrorKind::Discovery,
        }
    }

    /// Whether the error says something about the link, and so feeds health.
    pub fn counts_against_health(&self) -> bool {
        !matches!(self.kind(), ErrorKind::InvalidRequest | ErrorKind::Discovery)
    }
}

pub type Result<T> = std::result::Result<T, SsifError>;

#[cfg(test)]
mod tests {
    use ssif_bus::{BusError, SlaveAddress};

    use super::*;

    #[test]
    fn kinds_follow_frame_errors() {
        let transport = SsifError::from(FrameError::Bus {
            command: 0x02,
            stage: "single-part write",
            source: BusError::NoResponse {
                address: SlaveAddress::new(0x10),
            },
        });
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert_eq!(
            SsifError::from(FrameError::ShortBlock { len: 1, min: 2 }).kind(),
            ErrorKind::Framing
        );
        assert_eq!(
            SsifError::from(FrameError::ResponseTooLarge {
                required: 40,
                capacity: 32
            })
            .kind(),
            ErrorKind::ResourceExhausted
        );
        assert_eq!(
            SsifError::ResyncExhausted {
                expected: 2,
                attempts: 10
            }
            .kind(),
            ErrorKind::ResyncExhausted
        );
    }

    #[test]
    fn caller_errors_do_not_count_against_health() {
        assert!(!SsifError::from(FrameError::InvalidLun(4)).counts_against_health());
        assert!(!SsifError::NoDevice.counts_against_health());
        assert!(SsifError::NotReady { attempts: 10 }.counts_against_health());
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ResyncExhausted).unwrap();
        assert_eq!(json, "\"resync_exhausted\"");
    }
}
