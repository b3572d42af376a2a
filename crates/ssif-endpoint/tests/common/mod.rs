#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use bytes::BytesMut;
use ssif_bus::{BusError, I2cMaster, Operation, SlaveAddress, Stall};
use ssif_endpoint::{SsifConfig, SsifEndpoint};
use ssif_frame::codec::encode_response;
use ssif_frame::Request;

pub const BMC: SlaveAddress = SlaveAddress::new(0x10);

/// One bus transaction as seen by the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Write { command: u8, payload: Vec<u8> },
    Read { command: u8 },
}

/// Scripted answer to one block read.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Raw read buffer contents: length byte then data.
    Block(Vec<u8>),
    NoResponse,
    Fail,
}

impl Reply {
    /// A block carrying `data`, length byte prepended.
    pub fn data(data: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(data.len() + 1);
        raw.push(data.len() as u8);
        raw.extend_from_slice(data);
        Reply::Block(raw)
    }
}

/// In-memory responder driven by a queue of read replies.
///
/// Writes are acknowledged unless their index matches `fail_write_at`.
/// Reads pop the queue; an empty queue never answers.
#[derive(Debug, Default)]
pub struct ScriptedMaster {
    pub log: Vec<Transaction>,
    pub reads: VecDeque<Reply>,
    pub fail_write_at: Option<usize>,
    writes: usize,
}

impl ScriptedMaster {
    pub fn new(reads: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn failing_write(index: usize) -> Self {
        Self {
            fail_write_at: Some(index),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transaction::Write { command, payload } => Some((*command, payload.clone())),
                Transaction::Read { .. } => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transaction::Read { command } => Some(*command),
                Transaction::Write { .. } => None,
            })
            .collect()
    }
}

impl I2cMaster for ScriptedMaster {
    fn start_request(
        &mut self,
        address: SlaveAddress,
        operations: &mut [Operation<'_>],
    ) -> ssif_bus::Result<()> {
        assert_eq!(address, BMC, "unexpected slave address");
        match operations {
            [Operation::Write { buf, .. }] => {
                let index = self.writes;
                self.writes += 1;
                if self.fail_write_at == Some(index) {
                    return Err(BusError::Failed {
                        address,
                        reason: "scripted write failure".into(),
                    });
                }
                let (command, rest) = buf.split_first().expect("write carries a command");
                let (len, payload) = rest.split_first().expect("write carries a length");
                assert_eq!(*len as usize, payload.len(), "length byte mismatch");
                self.log.push(Transaction::Write {
                    command: *command,
                    payload: payload.to_vec(),
                });
                Ok(())
            }
            [Operation::Write { buf: select, .. }, Operation::Read { buf, .. }] => {
                let command = select[0];
                self.log.push(Transaction::Read { command });
                match self.reads.pop_front().unwrap_or(Reply::NoResponse) {
                    Reply::Block(raw) => {
                        buf[..raw.len()].copy_from_slice(&raw);
                        Ok(())
                    }
                    Reply::NoResponse => Err(BusError::NoResponse { address }),
                    Reply::Fail => Err(BusError::Failed {
                        address,
                        reason: "scripted read failure".into(),
                    }),
                }
            }
            other => panic!("unexpected operation shape: {} operations", other.len()),
        }
    }
}

/// Records requested stalls instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingStall {
    pub stalls: Vec<Duration>,
}

impl Stall for RecordingStall {
    fn stall(&mut self, duration: Duration) {
        self.stalls.push(duration);
    }
}

pub fn endpoint(master: ScriptedMaster) -> SsifEndpoint<ScriptedMaster, RecordingStall> {
    endpoint_with(master, SsifConfig::default())
}

pub fn endpoint_with(
    master: ScriptedMaster,
    config: SsifConfig,
) -> SsifEndpoint<ScriptedMaster, RecordingStall> {
    SsifEndpoint::with_stall(master, BMC, config, RecordingStall::default())
}

/// Single-part response to a LUN 0 request.
pub fn single(net_function: u8, command: u8, data: &[u8]) -> Reply {
    let request = Request::new(net_function, 0, command, &[]).expect("valid request");
    let mut raw = BytesMut::new();
    encode_response(&request, data, &mut raw).expect("response fits one block");
    Reply::Block(raw.to_vec())
}

/// First block of a multi-part response.
pub fn multi_start(net_function: u8, command: u8, data: &[u8]) -> Reply {
    let mut payload = vec![0x00, 0x01, (net_function + 1) << 2, command];
    payload.extend_from_slice(data);
    Reply::data(&payload)
}

/// A continuation block.
pub fn block(sequence: u8, data: &[u8]) -> Reply {
    let mut payload = vec![sequence];
    payload.extend_from_slice(data);
    Reply::data(&payload)
}
