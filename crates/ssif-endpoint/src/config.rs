use std::time::Duration;

/// Logical slave address of the BMC on the system management bus.
pub const DEFAULT_BMC_LOGICAL_ADDRESS: u8 = 0x20;

/// Tuning for an [`SsifEndpoint`](crate::SsifEndpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsifConfig {
    /// Attempts allowed for the first response read. Default: 10.
    pub retry_count: u32,
    /// Stall before the first read and between attempts. Default: 100 ms.
    pub retry_delay: Duration,
    /// Reads allowed while waiting for one expected multi-part block. Default: 10.
    pub resync_limit: u32,
    /// Soft errors at which health turns to `HardFail`. Default: 10.
    pub hard_fail_threshold: u32,
    /// Buffer capacity used by [`SsifEndpoint::submit`](crate::SsifEndpoint::submit).
    /// Default: 4 KiB.
    pub max_response_size: usize,
    /// Address reported by health queries. Default: 0x20.
    pub logical_address: u8,
}

impl Default for SsifConfig {
    fn default() -> Self {
        Self {
            retry_count: 10,
            retry_delay: Duration::from_millis(100),
            resync_limit: 10,
            hard_fail_threshold: 10,
            max_response_size: 4 * 1024,
            logical_address: DEFAULT_BMC_LOGICAL_ADDRESS,
        }
    }
}
