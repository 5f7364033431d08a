use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use xvideo_isi::{omnivision::regs, ox05b1s, ox08b40, prelude::*};
use xvideo_tests::{test_data, FakeSccb};

const ADDRESS: u8 = 0x36;

#[test]
fn open_from_board_config() {
    let cfg: SensorConfig = serde_yaml::from_str(test_data::SENSOR).unwrap();
    assert_eq!(cfg.model, SensorModel::Ox08b40);

    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox08b40::CHIP_ID);
    let mut iss = cfg.open(&mut bus).unwrap();
    assert_eq!(iss.state(), IssState::Opened);
    assert_eq!(iss.sensor().model(), SensorModel::Ox08b40);
    assert_eq!(iss.sensor().current_mode().map(|m| m.width), Some(1920));

    iss.set_streaming(true).unwrap();
    assert_eq!(iss.set_mode(0), Err(IsiError::WrongState));
    iss.close().unwrap();
    assert_eq!(iss.state(), IssState::Created);
    drop(iss);

    assert_eq!(bus.reg(regs::SOFT_RESET), 1);
    assert_eq!(bus.reg16(regs::VTS), 1125);
    let streams: Vec<u8> = bus
        .written()
        .iter()
        .filter(|(reg, _)| *reg == regs::STREAM)
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(streams, [1, 0, 0]);
}

#[test]
fn exposure_control() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox08b40::CHIP_ID);
    let mut iss = Iss::new(Ox08b40::new(&mut bus, ADDRESS));
    assert_eq!(
        iss.exposure_control(Gain::ONE, 1000),
        Err(IsiError::WrongState)
    );
    iss.open(1).unwrap();

    assert_eq!(
        iss.exposure_control(Gain::from_int(2), 10_000),
        Ok((Gain::from_int(2), 9_999))
    );
    assert_eq!(
        iss.exposure_control(Gain::from_int(100), 1_000_000),
        Ok((Gain::from_q10(15 * 1024 + 512), 16_532))
    );
    assert_eq!(iss.exposure_control(Gain::ONE, 1), Ok((Gain::ONE, 14)));
    drop(iss);

    assert_eq!(bus.reg16(regs::EXPOSURE), 1);
    assert_eq!(bus.reg(regs::AGAIN_HI), 1);
}

#[test]
fn probe_detects_model() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox05b1s::CHIP_ID);
    let sensor = probe(&mut bus, ADDRESS).unwrap();
    assert_eq!(sensor.model(), SensorModel::Ox05b1s);
    assert_eq!(sensor.name(), "OX05B1S");

    let mut unknown = FakeSccb::with_chip_id(ADDRESS, 0x1234);
    assert!(matches!(
        probe(&mut unknown, ADDRESS),
        Err(IsiError::NotAvailable)
    ));

    let mut absent = FakeSccb::new(0x10);
    assert!(matches!(
        probe(&mut absent, ADDRESS),
        Err(IsiError::Bus(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        )))
    ));
}

#[test]
fn open_checks_chip_id() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox05b1s::CHIP_ID);
    let cfg = SensorConfig {
        model: SensorModel::Ox03f10,
        address: ADDRESS,
        mode: 0,
    };
    let err = cfg.open(&mut bus).unwrap_err();
    assert_eq!(
        err,
        IsiError::ChipId {
            expected: 0x5803,
            found: 0x5805
        }
    );
    assert!(bus.written().is_empty());
}

#[test]
fn bus_failure_keeps_state() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox08b40::CHIP_ID);
    // Opening takes the chip id read, the soft reset, four timing writes,
    // the exposure and two gain writes.
    bus.fail_after(9);
    let mut iss = Iss::new(SensorModel::Ox08b40.create(&mut bus, ADDRESS));
    iss.open(0).unwrap();

    assert_eq!(
        iss.set_streaming(true),
        Err(IsiError::Bus(ErrorKind::ArbitrationLoss))
    );
    assert_eq!(iss.state(), IssState::Opened);

    let bus = iss.into_inner().release();
    bus.recover();
    let mut iss = Iss::new(probe(bus, ADDRESS).unwrap());
    iss.open(0).unwrap();
    iss.set_streaming(true).unwrap();
    assert_eq!(iss.state(), IssState::Streaming);
}

#[test]
fn failed_exposure_keeps_gain() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox08b40::CHIP_ID);
    // The integration time is the first write after opening.
    bus.fail_after(9);
    let mut iss = Iss::new(Ox08b40::new(&mut bus, ADDRESS));
    iss.open(1).unwrap();
    let time = iss.integration_time().unwrap();
    assert_eq!(
        iss.exposure_control(Gain::from_int(2), 10_000),
        Err(IsiError::Bus(ErrorKind::ArbitrationLoss))
    );
    assert_eq!(iss.integration_time(), Ok(time));
    assert_eq!(iss.analog_gain(), Ok(Gain::ONE));

    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox08b40::CHIP_ID);
    // The gain write fails after the integration time was written.
    bus.fail_after(10);
    let mut iss = Iss::new(Ox08b40::new(&mut bus, ADDRESS));
    iss.open(1).unwrap();
    assert_eq!(
        iss.exposure_control(Gain::from_int(2), 10_000),
        Err(IsiError::Bus(ErrorKind::ArbitrationLoss))
    );
    assert_eq!(iss.analog_gain(), Ok(Gain::ONE));
    assert_eq!(iss.state(), IssState::Opened);
    drop(iss);

    assert_eq!(bus.reg(regs::AGAIN_HI), 1);
    assert_eq!(bus.reg(regs::AGAIN_LO), 0);
    let gain_writes = bus
        .written()
        .iter()
        .filter(|(reg, _)| *reg == regs::AGAIN_HI)
        .count();
    assert_eq!(gain_writes, 1);
}

#[test]
fn close_tracks_stopped_stream() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox08b40::CHIP_ID);
    // Opening, starting and stopping the stream succeed. Powering down fails.
    bus.fail_after(11);
    let mut iss = Iss::new(Ox08b40::new(&mut bus, ADDRESS));
    iss.open(1).unwrap();
    iss.set_streaming(true).unwrap();
    assert_eq!(
        iss.close(),
        Err(IsiError::Bus(ErrorKind::ArbitrationLoss))
    );
    assert_eq!(iss.state(), IssState::Opened);
    assert_eq!(iss.set_streaming(false), Ok(()));

    let bus = iss.into_inner().release();
    bus.recover();
    let mut iss = Iss::new(Ox08b40::new(bus, ADDRESS));
    iss.open(1).unwrap();
    iss.close().unwrap();
    assert_eq!(iss.state(), IssState::Created);
}

#[test]
fn optional_features_through_any_sensor() {
    let mut bus = FakeSccb::with_chip_id(ADDRESS, ox05b1s::CHIP_ID);
    let mut sensor = SensorModel::Ox05b1s.create(&mut bus, ADDRESS);
    sensor.set_test_pattern(TestPattern::ColorBars).unwrap();
    assert_eq!(sensor.digital_gain(), Err(IsiError::NotSupported));
    assert_eq!(
        sensor.set_black_level(BlackLevel::default()),
        Err(IsiError::NotSupported)
    );
    assert!(sensor.caps().test_pattern);
    drop(sensor);
    assert_eq!(bus.reg(regs::TEST_PATTERN), 0x80);
}

#[test]
fn error_codes_are_distinct() {
    let errors = [
        IsiError::Bus(ErrorKind::Bus),
        IsiError::NotSupported,
        IsiError::OutOfRange,
        IsiError::InvalidMode,
        IsiError::WrongState,
        IsiError::NotAvailable,
    ];
    let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}
