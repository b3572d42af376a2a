//! IPMI over SSIF (SMBus System Interface).
//!
//! ssif carries IPMI requests to a baseboard management controller over
//! SMBus block transfers, reassembles the responses and tracks link health.
//!
//! # Crate Structure
//!
//! - [`bus`]: Bus-master abstraction and the Linux i2c-dev master
//! - [`frame`]: SSIF frame codec, block reader and writer
//! - [`endpoint`]: Request submission, resync, health and BMC self test

/// Re-export bus types.
pub mod bus {
    pub use ssif_bus::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ssif_frame::*;
}

/// Re-export endpoint types.
pub mod endpoint {
    pub use ssif_endpoint::*;
}

pub use ssif_endpoint::{HealthReport, HealthState, SsifConfig, SsifEndpoint, SsifError};
