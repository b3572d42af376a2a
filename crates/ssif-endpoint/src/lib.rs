//! IPMI over SSIF.
//!
//! This is the layer callers talk to. An [`SsifEndpoint`] owns the bus
//! master and the BMC's slave address, submits IPMI requests, reassembles
//! their responses and keeps the soft-error count behind [`HealthReport`].

pub mod config;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod health;
mod receive;
pub mod retry;
pub mod selftest;
mod transmit;

pub use config::SsifConfig;
pub use discovery::{bind, find_bmc};
pub use endpoint::SsifEndpoint;
pub use error::{ErrorKind, Result, SsifError};
pub use health::{BmcAddress, ChannelType, HealthReport, HealthState, HealthTracker};
pub use retry::{Attempt, Retry, RetryError};
pub use selftest::{SelfTestOutcome, SelfTestResult};
