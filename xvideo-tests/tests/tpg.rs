use xvideo::{prelude::*, tpg::regs};
use xvideo_tests::{test_config, SimRegisters};

fn tpg(regs: &SimRegisters) -> Tpg<&SimRegisters> {
    let cfg = test_config();
    Tpg::initialize(cfg.lookup_tpg(0).unwrap().clone(), regs).unwrap()
}

fn stream(mode: VideoMode, ppc: PixelsPerClock) -> VideoStream {
    VideoStream::from_mode(mode, ColorFormat::Yuv422, ColorDepth::Bpc8, ppc)
}

#[test]
fn initialize_does_not_touch_hardware() {
    let sim = SimRegisters::new();
    let t = tpg(&sim);
    assert_eq!(sim.write_count(), 0);
    assert_eq!(t.config().max_width, 3840);
}

#[test]
fn configure_for_stream() {
    let sim = SimRegisters::new();
    let t = tpg(&sim);
    t.configure(
        &stream(VideoMode::Uhd2160p30, PixelsPerClock::Two),
        Pattern::ZonePlate,
    )
    .unwrap();
    assert_eq!(t.size(), (3840, 2160));
    assert_eq!(t.color_format(), Some(ColorFormat::Yuv422));
    assert_eq!(t.pattern(), Some(Pattern::ZonePlate));
    assert_eq!(sim.peek(regs::BCKGNDID), 10);

    sim.clear_log();
    assert_eq!(
        t.configure(
            &stream(VideoMode::Hd720p60, PixelsPerClock::One),
            Pattern::ColorBars
        ),
        Err(TpgError::InvalidParameter)
    );
    assert_eq!(t.set_size(1281, 720), Err(TpgError::InvalidParameter));
    assert_eq!(t.set_size(4096, 2160), Err(TpgError::InvalidParameter));
    assert_eq!(
        t.set_color_format(ColorFormat::Rgba8),
        Err(TpgError::InvalidParameter)
    );
    assert_eq!(sim.write_count(), 0);
}

#[test]
fn overlays() {
    let sim = SimRegisters::new();
    let t = tpg(&sim);
    t.set_size(1920, 1080).unwrap();

    t.set_overlay(Overlay::MovingBox);
    t.set_box(64, [255, 0, 128]).unwrap();
    t.set_motion_speed(4);
    assert_eq!(t.overlay(), Overlay::MovingBox);
    assert_eq!(t.box_config(), (64, [255, 0, 128]));
    assert_eq!(t.motion_speed(), 4);
    assert_eq!(t.set_box(64, [256, 0, 0]), Err(TpgError::InvalidParameter));
    assert_eq!(t.set_box(1200, [0, 0, 0]), Err(TpgError::InvalidParameter));

    t.set_overlay(Overlay::CrossHair);
    t.set_cross_hair(960, 540).unwrap();
    assert_eq!(t.cross_hair(), (960, 540));
    assert_eq!(t.set_cross_hair(1920, 0), Err(TpgError::InvalidParameter));

    t.set_mask(Mask::RED_CR | Mask::BLUE_CB);
    assert_eq!(t.mask(), Mask::RED_CR | Mask::BLUE_CB);

    t.set_zone_plate(1, 2, 3, 4);
    assert_eq!(t.zone_plate(), (1, 2, 3, 4));
}

#[test]
fn pass_through() {
    let sim = SimRegisters::new();
    let t = tpg(&sim);
    t.set_size(1920, 1080).unwrap();
    assert_eq!(t.pass_through(), None);

    let win = Window::new(480, 270, 960, 540);
    t.enable_pass_through(win).unwrap();
    assert_eq!(t.pass_through(), Some(win));
    assert_eq!(sim.peek(regs::PASSTHRU_END_X), 1440);
    assert_eq!(
        t.enable_pass_through(Window::new(1000, 0, 960, 540)),
        Err(TpgError::InvalidParameter)
    );
    t.set_pattern(Pattern::PassThrough).unwrap();
    t.disable_pass_through().unwrap();
    assert_eq!(t.pass_through(), None);
}

#[test]
fn pass_through_needs_video_input() {
    let sim = SimRegisters::new();
    let mut cfg = test_config().lookup_tpg(0).unwrap().clone();
    cfg.pass_through = false;
    let t = Tpg::initialize(cfg, &sim).unwrap();
    t.set_size(1920, 1080).unwrap();
    assert_eq!(
        t.enable_pass_through(Window::new(0, 0, 64, 64)),
        Err(TpgError::DisabledInHardware)
    );
    assert_eq!(
        t.set_pattern(Pattern::PassThrough),
        Err(TpgError::DisabledInHardware)
    );
    assert_eq!(TpgError::DisabledInHardware.code(), XST_FAILURE);
}

#[test]
fn start_and_stop() {
    let sim = SimRegisters::new();
    let t = tpg(&sim);
    t.start();
    assert!(!t.is_idle());
    assert_eq!(sim.peek(0x00), 0x81);
    sim.force_bits(0x00, 1 << 2);
    assert_eq!(t.stop(), Ok(()));
    assert!(t.is_idle());
}
