use serde::Serialize;

/// Transport health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// No error has been observed.
    Ok,
    /// Errors observed, still below the threshold.
    SoftFail,
    /// Error threshold reached, or the BMC failed its self test.
    HardFail,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Ok => "ok",
            HealthState::SoftFail => "soft_fail",
            HealthState::HardFail => "hard_fail",
        }
    }
}

/// Kind of channel the BMC is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// BMC on the system management bus.
    SmBmc,
}

/// Logical address of the BMC as seen by IPMI callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BmcAddress {
    pub channel_type: ChannelType,
    pub slave_address: u8,
    pub lun: u8,
    pub channel: u8,
}

impl BmcAddress {
    pub fn sm_bmc(slave_address: u8) -> Self {
        Self {
            channel_type: ChannelType::SmBmc,
            slave_address,
            lun: 0,
            channel: 0,
        }
    }
}

/// Result of a health query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub address: BmcAddress,
    pub error_count: u32,
}

/// Soft-error bookkeeping for one endpoint.
///
/// The counter only grows. Classification is derived from it on every
/// query, so a frozen counter means a frozen classification.
#[derive(Debug, Clone)]
pub struct HealthTracker {
    error_count: u32,
    threshold: u32,
    forced_hard_fail: bool,
}

impl HealthTracker {
    /// A threshold of zero is treated as one.
    pub fn new(threshold: u32) -> Self {
        Self {
            error_count: 0,
            threshold: threshold.max(1),
            forced_hard_fail: false,
        }
    }

    /// Count one error, returning the new total.
    pub fn record_error(&mut self) -> u32 {
        self.error_count = self.error_count.saturating_add(1);
        self.error_count
    }

    /// Pin the classification to `HardFail` for the rest of the session.
    pub fn force_hard_fail(&mut self) {
        self.forced_hard_fail = true;
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn classify(&self) -> HealthState {
        if self.forced_hard_fail || self.error_count >= self.threshold {
            HealthState::HardFail
        } else if self.error_count > 0 {
            HealthState::SoftFail
        } else {
            HealthState::Ok
        }
    }
}
