//! BMC self test run right after binding.
//!
//! A BMC that cannot report a passing self test is not trusted: the
//! endpoint's health is pinned to `HardFail` for the rest of the session.

use serde::Serialize;
use ssif_bus::{I2cMaster, Stall};
use tracing::{error, info};

use crate::endpoint::SsifEndpoint;
use crate::error::SsifError;

/// IPMI Application network function.
pub const NETFN_APP: u8 = 0x06;
/// Get Self Test Results.
pub const CMD_GET_SELF_TEST_RESULTS: u8 = 0x04;
/// Self test passed.
pub const SELF_TEST_NO_ERROR: u8 = 0x55;
/// Self test not implemented by this BMC.
pub const SELF_TEST_NOT_IMPLEMENTED: u8 = 0x56;

const RESPONSE_SIZE: usize = 3;

/// Parsed Get Self Test Results response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelfTestResult {
    pub completion_code: u8,
    pub result: u8,
    /// Failure detail bits; zero when the BMC omits them.
    pub detail: u8,
}

impl SelfTestResult {
    /// Parse response data; `None` when it is shorter than two bytes.
    pub fn parse(data: &[u8]) -> Option<Self> {
        match *data {
            [completion_code, result, ref rest @ ..] => Some(Self {
                completion_code,
                result,
                detail: rest.first().copied().unwrap_or(0),
            }),
            _ => None,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.result, SELF_TEST_NO_ERROR | SELF_TEST_NOT_IMPLEMENTED)
    }
}

/// What the self test concluded.
#[derive(Debug)]
pub enum SelfTestOutcome {
    Passed(SelfTestResult),
    Failed(SelfTestResult),
    /// The response held this many bytes, too few to carry a result.
    Malformed(usize),
    /// The request itself failed.
    Unreachable(SsifError),
}

impl SelfTestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, SelfTestOutcome::Passed(_))
    }
}

impl<M: I2cMaster, S: Stall> SsifEndpoint<M, S> {
    /// Ask the BMC for its self-test results.
    ///
    /// Anything but a passing result forces health to `HardFail`.
    pub fn run_self_test(&mut self) -> SelfTestOutcome {
        let mut buf = [0u8; RESPONSE_SIZE];
        let response = self.submit_into(NETFN_APP, 0, CMD_GET_SELF_TEST_RESULTS, &[], &mut buf);
        let outcome = match response {
            Ok(len) => match SelfTestResult::parse(&buf[..len]) {
                Some(result) if result.passed() => SelfTestOutcome::Passed(result),
                Some(result) => SelfTestOutcome::Failed(result),
                None => SelfTestOutcome::Malformed(len),
            },
            Err(err) => SelfTestOutcome::Unreachable(err),
        };

        match &outcome {
            SelfTestOutcome::Passed(result) => {
                info!(address = %self.address(), result = result.result, "BMC self test passed");
            }
            SelfTestOutcome::Failed(result) => {
                error!(
                    address = %self.address(),
                    result = result.result,
                    detail = result.detail,
                    "BMC self test failed"
                );
                self.force_hard_fail();
            }
            SelfTestOutcome::Malformed(len) => {
                error!(address = %self.address(), len, "malformed self test response");
                self.force_hard_fail();
            }
            SelfTestOutcome::Unreachable(err) => {
                error!(address = %self.address(), error = %err, "failed to get BMC self test");
                self.force_hard_fail();
            }
        }
        outcome
    }
}
