use xvideo::{prelude::*, vtc::regs};
use xvideo_tests::{test_config, SimRegisters};

const MODES: [VideoMode; 11] = [
    VideoMode::Vga60,
    VideoMode::Svga60,
    VideoMode::Xga60,
    VideoMode::Hd720p50,
    VideoMode::Hd720p60,
    VideoMode::Fhd1080p30,
    VideoMode::Fhd1080p50,
    VideoMode::Fhd1080p60,
    VideoMode::Fhd1080i60,
    VideoMode::Uhd2160p30,
    VideoMode::Uhd2160p60,
];

fn vtc(regs: &SimRegisters, device_id: u16) -> Vtc<&SimRegisters> {
    let cfg = test_config();
    Vtc::from_table(cfg.vtcs.iter(), device_id, regs).unwrap()
}

#[test]
fn generator_round_trip() {
    for mode in MODES {
        let sim = SimRegisters::new();
        let v = vtc(&sim, 0);
        v.set_generator_video_mode(mode).unwrap();
        assert_eq!(v.generator_timing(), Ok(mode.timing()), "{mode:?}");
    }
}

#[test]
fn generator_registers() {
    let sim = SimRegisters::new();
    let v = vtc(&sim, 0);
    v.set_generator_video_mode(VideoMode::Fhd1080p60).unwrap();
    let g = regs::GENERATOR;
    assert_eq!(sim.peek(g + regs::ASIZE), 1080 << 16 | 1920);
    assert_eq!(sim.peek(g + regs::HSIZE), 2200);
    assert_eq!(sim.peek(g + regs::VSIZE) & 0x1FFF, 1125);
    assert_eq!(sim.peek(g + regs::HSYNC), 2052 << 16 | 2008);
    assert_eq!(sim.peek(g + regs::F0_VSYNC), 1088 << 16 | 1083);
    assert_eq!(sim.peek(g + regs::ENC), 0);
    // Both syncs active high.
    assert_eq!(sim.peek(g + regs::POL), 0x7F);

    v.set_generator_video_mode(VideoMode::Fhd1080i60).unwrap();
    assert_ne!(sim.peek(g + regs::ENC), 0);
    let (signal, hoff) = v.generator().unwrap();
    assert!(signal.interlaced);
    assert_eq!(signal.v1_total, 563);
    assert_eq!(hoff.v1_sync_hori_start, 2008 - 1100);
}

#[test]
fn reject_unordered_timing() {
    let sim = SimRegisters::new();
    let v = vtc(&sim, 0);
    let mut timing = VideoMode::Hd720p60.timing();
    timing.h_total -= 1;
    assert_eq!(
        v.set_generator_timing(&timing),
        Err(VtcError::InvalidTiming)
    );

    let signal = VtcSignal {
        h_front_porch_start: 100,
        h_sync_start: 90,
        h_back_porch_start: 120,
        h_total: 130,
        v0_front_porch_start: 10,
        v0_sync_start: 12,
        v0_back_porch_start: 13,
        v0_total: 20,
        ..Default::default()
    };
    assert_eq!(
        v.set_generator(&signal, &VtcHoriOffsets::default()),
        Err(VtcError::InvalidTiming)
    );
    assert_eq!(sim.write_count(), 0);
}

#[test]
fn detector_reports_input_timing() {
    let sim = SimRegisters::new();
    let v = vtc(&sim, 0);
    assert_eq!(v.detector_locked(), Ok(false));

    // Feed the generator output back as the measured input.
    v.set_generator_video_mode(VideoMode::Hd720p50).unwrap();
    for reg in (0..=regs::F1_ASIZE).step_by(4) {
        sim.preset(regs::DETECTOR + reg, sim.peek(regs::GENERATOR + reg));
    }
    sim.force_bits(regs::DETECTOR + regs::STATUS, 1);

    assert_eq!(v.detector_locked(), Ok(true));
    assert_eq!(v.detector_timing(), Ok(VideoMode::Hd720p50.timing()));
}

#[test]
fn missing_detector() {
    let sim = SimRegisters::new();
    let v = vtc(&sim, 1);
    assert_eq!(v.detector_locked(), Err(VtcError::DisabledInHardware));
    assert_eq!(v.enable_detector(), Err(VtcError::DisabledInHardware));
    assert!(v.detector_timing().is_err());
    v.enable_generator().unwrap();
}

#[test]
fn unknown_device() {
    let sim = SimRegisters::new();
    let cfg = test_config();
    let err = Vtc::from_table(cfg.vtcs.iter(), 7, &sim).unwrap_err();
    assert_eq!(err, Error::Configuration(HardwareConfigError::NotFound));
}

#[test]
fn control_register() {
    let sim = SimRegisters::new();
    let v = vtc(&sim, 0);
    v.set_source_select_all();
    v.register_update_enable();
    v.enable_generator().unwrap();
    v.enable();
    assert_eq!(sim.peek(regs::CTL), 0x03FF_FF07);
    v.disable();
    v.disable_generator().unwrap();
    assert_eq!(sim.peek(regs::CTL), 0x03FF_FF02);
    v.sync_reset();
    assert_eq!(sim.writes_to(regs::CTL).last(), Some(&0x03FF_FF02));
}

#[test]
fn interrupts() {
    let sim = SimRegisters::new();
    let v = vtc(&sim, 0);
    v.interrupt_enable(VtcIrq::LOCK | VtcIrq::GEN_VBLANK);
    v.interrupt_disable(VtcIrq::LOCK);
    assert_eq!(sim.peek(regs::IER), VtcIrq::GEN_VBLANK.bits());

    sim.force_bits(regs::ISR, VtcIrq::LOST_LOCK.bits());
    assert_eq!(v.interrupt_status(), VtcIrq::LOST_LOCK);
    v.interrupt_clear(VtcIrq::LOST_LOCK);
    assert_eq!(sim.writes_to(regs::ISR), vec![VtcIrq::LOST_LOCK.bits()]);
}

#[test]
fn version() {
    let sim = SimRegisters::new();
    sim.preset(regs::VERSION, 0x0602_0000);
    let v = vtc(&sim, 0);
    assert_eq!(
        v.version(),
        VtcVersion {
            major: 6,
            minor: 2,
            revision: 0
        }
    );
}
