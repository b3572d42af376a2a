mod common;

use common::{endpoint, single, Reply, ScriptedMaster, RecordingStall, BMC};
use ssif_bus::{I2cDevice, SlaveAddress, StaticEnumerator, SSIF_BMC_COMPATIBLE};
use ssif_endpoint::selftest::{CMD_GET_SELF_TEST_RESULTS, NETFN_APP};
use ssif_endpoint::{bind, ErrorKind, HealthState, SelfTestOutcome, SsifConfig, SsifError};

fn self_test_reply(result: u8) -> Reply {
    single(NETFN_APP, CMD_GET_SELF_TEST_RESULTS, &[0x00, result, 0x00])
}

#[test]
fn passing_self_test_keeps_health() {
    for result in [0x55, 0x56] {
        let mut ep = endpoint(ScriptedMaster::new([self_test_reply(result)]));
        let outcome = ep.run_self_test();
        assert!(outcome.passed(), "result {result:#04x}");
        assert_eq!(ep.health().state, HealthState::Ok);
    }
}

#[test]
fn failing_self_test_forces_hard_fail() {
    let mut ep = endpoint(ScriptedMaster::new([self_test_reply(0x57)]));

    let outcome = ep.run_self_test();
    assert!(matches!(outcome, SelfTestOutcome::Failed(r) if r.result == 0x57));
    assert_eq!(ep.health().state, HealthState::HardFail);
    assert_eq!(ep.error_count(), 0);
}

#[test]
fn short_self_test_response_forces_hard_fail() {
    let master = ScriptedMaster::new([single(NETFN_APP, CMD_GET_SELF_TEST_RESULTS, &[0x00])]);
    let mut ep = endpoint(master);

    assert!(matches!(ep.run_self_test(), SelfTestOutcome::Malformed(1)));
    assert_eq!(ep.health().state, HealthState::HardFail);
}

#[test]
fn unreachable_bmc_forces_hard_fail() {
    let mut ep = endpoint(ScriptedMaster::default());

    match ep.run_self_test() {
        SelfTestOutcome::Unreachable(err) => assert_eq!(err.kind(), ErrorKind::NotReady),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(ep.health().state, HealthState::HardFail);
    assert_eq!(ep.error_count(), 10);
}

#[test]
fn bind_selects_enumerated_bmc() {
    let enumerator = StaticEnumerator::new(vec![
        I2cDevice::new("atmel,24c02", vec![SlaveAddress::new(0x50)]),
        I2cDevice::new(SSIF_BMC_COMPATIBLE, vec![SlaveAddress::new(0x11), BMC]),
        I2cDevice::ssif_bmc(BMC),
    ]);
    let master = ScriptedMaster::new([self_test_reply(0x55)]);

    let mut ep = bind(&enumerator, master, SsifConfig::default(), RecordingStall::default())
        .expect("bind should succeed");
    assert_eq!(ep.address(), BMC);
    assert!(ep.run_self_test().passed());
}

#[test]
fn bind_without_bmc_fails() {
    let enumerator = StaticEnumerator::new(vec![I2cDevice::new(
        "atmel,24c02",
        vec![SlaveAddress::new(0x50)],
    )]);

    let err = bind(
        &enumerator,
        ScriptedMaster::default(),
        SsifConfig::default(),
        RecordingStall::default(),
    )
    .err()
    .expect("bind should fail");
    assert!(matches!(err, SsifError::NoDevice));
    assert_eq!(err.kind(), ErrorKind::Discovery);
}
