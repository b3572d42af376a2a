use bytes::Bytes;
use ssif_bus::{I2cMaster, SlaveAddress, Stall, ThreadStall};
use ssif_frame::{BlockReader, FrameWriter, Request};
use tracing::{debug, warn};

use crate::config::SsifConfig;
use crate::error::{ErrorKind, Result};
use crate::health::{BmcAddress, HealthReport, HealthTracker};
use crate::receive::Receiver;
use crate::transmit::transmit;

/// One SSIF session with a BMC.
///
/// The endpoint owns its bus master and serializes every request through
/// `&mut self`; one request is in flight at a time.
pub struct SsifEndpoint<M, S = ThreadStall> {
    master: M,
    stall: S,
    address: SlaveAddress,
    writer: FrameWriter,
    reader: BlockReader,
    config: SsifConfig,
    health: HealthTracker,
}

impl<M: I2cMaster> SsifEndpoint<M, ThreadStall> {
    /// Create an endpoint with default configuration.
    pub fn new(master: M, address: SlaveAddress) -> Self {
        Self::with_config(master, address, SsifConfig::default())
    }

    /// Create an endpoint with explicit configuration.
    pub fn with_config(master: M, address: SlaveAddress, config: SsifConfig) -> Self {
        Self::with_stall(master, address, config, ThreadStall)
    }
}

impl<M: I2cMaster, S: Stall> SsifEndpoint<M, S> {
    /// Create an endpoint that waits through `stall` instead of sleeping.
    pub fn with_stall(master: M, address: SlaveAddress, config: SsifConfig, stall: S) -> Self {
        let health = HealthTracker::new(config.hard_fail_threshold);
        Self {
            master,
            stall,
            address,
            writer: FrameWriter::new(address),
            reader: BlockReader::new(address),
            config,
            health,
        }
    }

    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    pub fn config(&self) -> &SsifConfig {
        &self.config
    }

    pub fn error_count(&self) -> u32 {
        self.health.error_count()
    }

    /// Submit one IPMI request and read its response data into `buf`.
    ///
    /// The returned length excludes the NetFn/Command echo. On error `buf`
    /// may hold a partial response.
    pub fn submit_into(
        &mut self,
        net_function: u8,
        lun: u8,
        command: u8,
        data: &[u8],
        buf: &mut [u8],
    ) -> Result<usize> {
        let result = self.exchange(net_function, lun, command, data, Some(buf));
        self.account(net_function, command, result)
    }

    /// Submit one IPMI request and return the response data.
    ///
    /// Responses larger than [`SsifConfig::max_response_size`] fail with a
    /// resource error.
    pub fn submit(&mut self, net_function: u8, lun: u8, command: u8, data: &[u8]) -> Result<Bytes> {
        let mut buf = vec![0u8; self.config.max_response_size];
        let len = self.submit_into(net_function, lun, command, data, &mut buf)?;
        buf.truncate(len);
        Ok(Bytes::from(buf))
    }

    /// Transmit a request without reading a response.
    pub fn send(&mut self, net_function: u8, lun: u8, command: u8, data: &[u8]) -> Result<()> {
        let result = self
            .exchange(net_function, lun, command, data, None)
            .map(drop);
        self.account(net_function, command, result)
    }

    /// Current health classification and the BMC's logical address.
    pub fn health(&self) -> HealthReport {
        HealthReport {
            state: self.health.classify(),
            address: BmcAddress::sm_bmc(self.config.logical_address),
            error_count: self.health.error_count(),
        }
    }

    pub(crate) fn force_hard_fail(&mut self) {
        self.health.force_hard_fail();
    }

    pub fn master(&self) -> &M {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    pub fn stall(&self) -> &S {
        &self.stall
    }

    /// Release the bus master.
    pub fn into_master(self) -> M {
        self.master
    }

    fn exchange(
        &mut self,
        net_function: u8,
        lun: u8,
        command: u8,
        data: &[u8],
        response: Option<&mut [u8]>,
    ) -> Result<usize> {
        let request = Request::new(net_function, lun, command, data)?;
        transmit(&mut self.master, &mut self.writer, &request)?;

        let Some(buf) = response else {
            return Ok(0);
        };
        let receiver = Receiver {
            master: &mut self.master,
            stall: &mut self.stall,
            writer: &mut self.writer,
            reader: &mut self.reader,
            config: &self.config,
            health: &mut self.health,
        };
        let len = receiver.receive(&request, buf)?;
        debug!(address = %self.address, net_function, command, len, "request complete");
        Ok(len)
    }

    fn account<T>(&mut self, net_function: u8, command: u8, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.counts_against_health() {
                // NotReady polls were counted as they failed.
                let error_count = if err.kind() == ErrorKind::NotReady {
                    self.health.error_count()
                } else {
                    self.health.record_error()
                };
                warn!(
                    address = %self.address,
                    net_function,
                    command,
                    kind = ?err.kind(),
                    error_count,
                    threshold = self.health.threshold(),
                    error = %err,
                    "SSIF request failed"
                );
            } else {
                debug!(net_function, command, error = %err, "request rejected");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ssif_bus::{BusError, Operation};

    use super::*;
    use crate::health::HealthState;

    /// Acknowledges writes and answers every read with one fixed block.
    struct EchoMaster {
        block: Vec<u8>,
        transactions: usize,
    }

    impl I2cMaster for EchoMaster {
        fn start_request(
            &mut self,
            _address: SlaveAddress,
            operations: &mut [Operation<'_>],
        ) -> ssif_bus::Result<()> {
            self.transactions += 1;
            for op in operations.iter_mut() {
                if let Operation::Read { buf, .. } = op {
                    buf[..self.block.len()].copy_from_slice(&self.block);
                }
            }
            Ok(())
        }
    }

    struct Silent;

    impl I2cMaster for Silent {
        fn start_request(
            &mut self,
            address: SlaveAddress,
            _operations: &mut [Operation<'_>],
        ) -> ssif_bus::Result<()> {
            Err(BusError::NoResponse { address })
        }
    }

    #[derive(Default)]
    struct NoWait;

    impl Stall for NoWait {
        fn stall(&mut self, _duration: Duration) {}
    }

    fn endpoint<M: I2cMaster>(master: M) -> SsifEndpoint<M, NoWait> {
        SsifEndpoint::with_stall(master, SlaveAddress::new(0x10), SsifConfig::default(), NoWait)
    }

    #[test]
    fn submit_returns_owned_response() {
        let master = EchoMaster {
            block: vec![0x05, 0x1c, 0x01, 0x00, 0xaa, 0xbb],
            transactions: 0,
        };
        let mut ep = endpoint(master);
        let response = ep.submit(0x06, 0, 0x01, &[]).expect("submit should succeed");
        assert_eq!(response.as_ref(), &[0x00, 0xaa, 0xbb]);
        assert_eq!(ep.health().state, HealthState::Ok);
    }

    #[test]
    fn send_skips_the_read_phase() {
        let master = EchoMaster {
            block: vec![],
            transactions: 0,
        };
        let mut ep = endpoint(master);
        ep.send(0x06, 0, 0x02, &[]).expect("send should succeed");
        assert_eq!(ep.into_master().transactions, 1);
    }

    #[test]
    fn invalid_request_never_touches_the_bus() {
        let mut ep = endpoint(Silent);
        let err = ep.submit(0x40, 0, 0x01, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(ep.error_count(), 0);
    }

    #[test]
    fn silent_responder_counts_once() {
        let mut ep = endpoint(Silent);
        let err = ep.send(0x06, 0, 0x01, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(ep.error_count(), 1);
        assert_eq!(ep.health().state, HealthState::SoftFail);
    }

    #[test]
    fn silent_responder_reaches_hard_fail_in_one_submit() {
        let mut ep = endpoint(Silent);
        let err = ep.submit(0x06, 0, 0x01, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert_eq!(ep.error_count(), SsifConfig::default().retry_count);
        assert_eq!(ep.health().state, HealthState::HardFail);
    }

    #[test]
    fn health_reports_logical_address() {
        let config = SsifConfig {
            logical_address: 0x22,
            ..SsifConfig::default()
        };
        let ep = SsifEndpoint::with_stall(Silent, SlaveAddress::new(0x10), config, NoWait);
        let report = ep.health();
        assert_eq!(report.address, BmcAddress::sm_bmc(0x22));
        assert_eq!(report.state, HealthState::Ok);
    }
}
