use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};
use xvideo::{mixer, prelude::*, tpg, vtc};
use xvideo_tests::{test_config, SimRegisters};
use xvideo_zynq7000::{bring_up, decode_config, DemoError, Pipeline, DEMO_SETTINGS};

const AP_CTRL: usize = 0x00;
const GIE: usize = 0x04;
const IER: usize = 0x08;
const ISR: usize = 0x0C;

static FRAMES: AtomicUsize = AtomicUsize::new(0);

fn frame_done() {
    _ = FRAMES.fetch_add(1, Ordering::SeqCst);
}

/// One simulated register file per base address of the test board.
fn board() -> BTreeMap<usize, SimRegisters> {
    let cfg = test_config();
    cfg.mixers
        .iter()
        .map(|c| c.base_address)
        .chain(cfg.vtcs.iter().map(|c| c.base_address))
        .chain(cfg.tpgs.iter().map(|c| c.base_address))
        .chain(cfg.demosaics.iter().map(|c| c.base_address))
        .map(|base| (base, SimRegisters::new()))
        .collect()
}

#[test]
fn start_demo_pipeline() {
    let cfg = test_config();
    let board = board();
    let mut pipeline = Pipeline::from_config(&cfg, |base| &board[&base]).unwrap();
    pipeline.start(&DEMO_SETTINGS).unwrap();

    let vtc_regs = &board[&0x43C1_0000];
    assert_eq!(vtc_regs.peek(vtc::regs::CTL), 0x03FF_FF07);
    assert_eq!(
        pipeline.vtc.generator_timing(),
        Ok(VideoMode::Fhd1080p60.timing())
    );

    let tpg_regs = &board[&0x43C2_0000];
    assert_eq!(tpg_regs.peek(tpg::regs::WIDTH), 1920);
    assert_eq!(tpg_regs.peek(tpg::regs::HEIGHT), 1080);
    assert_eq!(pipeline.tpg.pattern(), Some(Pattern::ColorBars));
    assert_eq!(tpg_regs.peek(AP_CTRL), 0x81);

    let mixer_regs = &board[&0x43C0_0000];
    assert_eq!(mixer_regs.peek(mixer::regs::WIDTH), 1920);
    assert_eq!(mixer_regs.peek(mixer::regs::LAYER_ENABLE), 0b11);
    assert_eq!(
        pipeline.mixer.layer_buffer_address(LayerId::Layer(1)),
        Ok(0x1000_0000)
    );
    assert_eq!(
        pipeline.mixer.layer_window(LayerId::Layer(1)),
        Ok(Window::new(640, 360, 640, 360))
    );
    assert_eq!(mixer_regs.peek(AP_CTRL), 0x81);

    // The VTC starts generating only after every core is set up.
    let last_vtc_enable = vtc_regs.writes_to(vtc::regs::CTL).last().copied();
    assert_eq!(last_vtc_enable, Some(0x03FF_FF07));

    for regs in board.values() {
        regs.force_bits(AP_CTRL, 1 << 2);
    }
    pipeline.stop().unwrap();
    assert_eq!(vtc_regs.peek(vtc::regs::CTL) & 1, 0);
}

#[test]
fn start_rejects_unsupported_settings() {
    let cfg = test_config();
    let board = board();
    let mut pipeline = Pipeline::from_config(&cfg, |base| &board[&base]).unwrap();
    let mut settings = DEMO_SETTINGS;
    settings.color_depth = ColorDepth::Bpc10;
    assert_eq!(
        pipeline.start(&settings),
        Err(Error::Tpg(TpgError::InvalidParameter))
    );
    // The mixer is left alone when an earlier core fails.
    assert_eq!(board[&0x43C0_0000].peek(AP_CTRL), 0);
}

#[test]
fn missing_core() {
    let mut cfg = test_config();
    cfg.tpgs.clear();
    let board = board();
    let err = Pipeline::from_config(&cfg, |base| &board[&base]).unwrap_err();
    assert_eq!(err.code(), XST_DEVICE_NOT_FOUND);
}

#[test]
fn decode_hardware_description() {
    let cfg = test_config();
    let blob = postcard::to_stdvec(&cfg).unwrap();
    assert_eq!(decode_config(&blob).unwrap(), cfg);

    let err = decode_config(&blob[..blob.len() / 2]).unwrap_err();
    assert!(matches!(err, DemoError::Decode(_)));
    assert_eq!(err.code(), XST_FAILURE);

    let mut invalid = cfg.clone();
    invalid.vtcs[1].device_id = 0;
    let blob = postcard::to_stdvec(&invalid).unwrap();
    let err = decode_config(&blob).unwrap_err();
    assert!(matches!(
        err,
        DemoError::Video(Error::Configuration(HardwareConfigError::DuplicateDevice))
    ));
}

#[test]
fn interrupt_enabled_after_pipeline_is_stored() {
    let board = board();
    let mixer_regs = &board[&0x43C0_0000];
    let mut slot = None;

    let blob = postcard::to_stdvec(&test_config()).unwrap();
    let err = bring_up(&mut slot, &blob[..blob.len() / 2], |base| &board[&base], frame_done)
        .unwrap_err();
    assert!(matches!(err, DemoError::Decode(_)));
    assert!(slot.is_none());
    assert_eq!(mixer_regs.write_count(), 0);

    bring_up(&mut slot, &blob, |base| &board[&base], frame_done).unwrap();
    assert_eq!(mixer_regs.peek(IER), 1);
    assert_eq!(mixer_regs.peek(GIE), 1);
    // The interrupt is unmasked only after the mixer was started.
    let writes = mixer_regs.writes();
    let started = writes.iter().position(|&w| w == (AP_CTRL, 0x81)).unwrap();
    let unmasked = writes.iter().position(|&(offset, _)| offset == GIE).unwrap();
    assert!(started < unmasked);

    mixer_regs.force_bits(ISR, 1);
    slot.as_ref().unwrap().mixer.interrupt_handler();
    assert_eq!(FRAMES.load(Ordering::SeqCst), 1);
    assert_eq!(mixer_regs.writes_to(ISR), vec![1]);
}
