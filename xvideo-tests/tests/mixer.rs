use std::sync::atomic::{AtomicUsize, Ordering};
use xvideo::{mixer::regs, prelude::*};
use xvideo_tests::{test_config, SimRegisters};

const AP_CTRL: usize = 0x00;
const GIE: usize = 0x04;
const IER: usize = 0x08;
const ISR: usize = 0x0C;

fn mixer(regs: &SimRegisters) -> Mixer<&SimRegisters> {
    let cfg = test_config();
    Mixer::initialize(cfg.lookup_mixer(0).unwrap().clone(), regs).unwrap()
}

fn fhd() -> VideoStream {
    VideoStream::from_mode(
        VideoMode::Fhd1080p60,
        ColorFormat::Rgb,
        ColorDepth::Bpc8,
        PixelsPerClock::Two,
    )
}

#[test]
fn initialize_programs_defaults() {
    let sim = SimRegisters::new();
    let m = mixer(&sim);
    assert_eq!(sim.peek(regs::WIDTH), 3840);
    assert_eq!(sim.peek(regs::HEIGHT), 2160);
    assert_eq!(sim.peek(regs::LAYER_ENABLE), 1);
    assert_eq!(sim.peek(regs::BACKGROUND_V_B), 255);
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_ALPHA)), ALPHA_MAX as u32);
    assert_eq!(sim.peek(regs::layer(3, regs::LAYER_VIDEO_FORMAT)), 2);
    assert_eq!(sim.peek(regs::LOGO_ALPHA), ALPHA_MAX as u32);
    // Layer 2 has neither alpha nor scale registers.
    assert!(sim.writes_to(regs::layer(2, regs::LAYER_ALPHA)).is_empty());
    assert!(sim.writes_to(regs::layer(2, regs::LAYER_SCALE)).is_empty());
    assert_eq!(
        m.csc_coefficients(),
        Some((ColorStandard::Bt709, ColorRange::Limited))
    );
    assert!(m.is_layer_enabled(LayerId::Master));
    assert!(!m.is_layer_enabled(LayerId::Layer(1)));
}

#[test]
fn layer_window_readback() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    m.set_video_stream(&fhd()).unwrap();
    assert_eq!(
        m.layer_window(LayerId::Master),
        Ok(Window::new(0, 0, 1920, 1080))
    );

    let win = Window::new(64, 32, 640, 480);
    m.set_layer_window(LayerId::Layer(1), win, 2560).unwrap();
    assert_eq!(m.layer_window(LayerId::Layer(1)), Ok(win));
    assert_eq!(m.layer_stride(LayerId::Layer(1)), Ok(2560));
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_START_X)), 64);
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_START_Y)), 32);
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_WIDTH)), 640);
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_HEIGHT)), 480);
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_STRIDE)), 2560);

    // Stream layers take any position and have no stride.
    let win = Window::new(33, 17, 1001, 333);
    m.set_layer_window(LayerId::Layer(3), win, 0).unwrap();
    assert_eq!(m.layer_window(LayerId::Layer(3)), Ok(win));
    assert_eq!(
        m.layer_stride(LayerId::Layer(3)),
        Err(MixerError::LayerInterfaceType)
    );
}

#[test]
fn rejected_window_leaves_registers_untouched() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    m.set_video_stream(&fhd()).unwrap();
    sim.clear_log();

    let l1 = LayerId::Layer(1);
    let rejected = [
        (Window::new(1, 0, 640, 480), 2560, MixerError::LayerWindowInvalid),
        (Window::new(0, 0, 641, 480), 2560, MixerError::LayerWindowInvalid),
        (Window::new(0, 0, 2000, 480), 8000, MixerError::LayerWindowInvalid),
        (Window::new(1600, 0, 640, 480), 2560, MixerError::LayerWindowInvalid),
        (Window::new(0, 700, 640, 480), 2560, MixerError::LayerWindowInvalid),
        (Window::new(0, 0, 32, 480), 128, MixerError::LayerWindowInvalid),
        (Window::new(0, 0, 640, 480), 2561, MixerError::WindowStrideMisaligned),
        (Window::new(0, 0, 640, 480), 0, MixerError::WindowStrideMisaligned),
    ];
    for (win, stride, err) in rejected {
        assert_eq!(m.set_layer_window(l1, win, stride), Err(err), "{win:?}");
    }
    assert_eq!(
        m.set_layer_window(LayerId::Layer(4), Window::new(0, 0, 640, 480), 2560),
        Err(MixerError::InvalidLayer)
    );
    assert_eq!(
        m.set_layer_window(LayerId::Master, Window::new(0, 0, 640, 480), 2560),
        Err(MixerError::InvalidLayer)
    );
    assert_eq!(sim.write_count(), 0);
    assert_eq!(m.layer_window(l1), Ok(Window::default()));
}

#[test]
fn buffer_addresses() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    let l1 = LayerId::Layer(1);
    let l2 = LayerId::Layer(2);

    m.set_layer_buffer_address(l1, 0x1_2000_0000).unwrap();
    assert_eq!(m.layer_buffer_address(l1), Ok(0x1_2000_0000));
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_BUF1)), 0x2000_0000);
    assert_eq!(sim.peek(regs::layer(1, regs::LAYER_BUF1) + 4), 1);

    sim.clear_log();
    assert_eq!(
        m.set_layer_buffer_address(l1, 0x2000_0008),
        Err(MixerError::MemoryAddressMisaligned)
    );
    assert_eq!(
        m.set_layer_buffer_address(LayerId::Layer(3), 0x2000_0000),
        Err(MixerError::LayerInterfaceType)
    );
    assert_eq!(
        m.set_layer_chroma_buffer_address(l1, 0x2000_0000),
        Err(MixerError::InvalidParameter)
    );
    assert_eq!(sim.write_count(), 0);

    m.set_layer_chroma_buffer_address(l2, 0x3000_0000).unwrap();
    assert_eq!(m.layer_chroma_buffer_address(l2), Ok(0x3000_0000));
}

#[test]
fn alpha_and_scale() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    m.set_video_stream(&fhd()).unwrap();
    let l1 = LayerId::Layer(1);

    m.set_layer_alpha(l1, 128).unwrap();
    assert_eq!(m.layer_alpha(l1), Ok(128));
    assert_eq!(
        m.set_layer_alpha(l1, ALPHA_MAX + 1),
        Err(MixerError::InvalidParameter)
    );
    assert_eq!(
        m.set_layer_alpha(LayerId::Layer(2), 10),
        Err(MixerError::DisabledInHardware)
    );
    assert_eq!(m.layer_alpha(LayerId::Layer(2)), Ok(ALPHA_MAX));

    m.set_layer_window(l1, Window::new(1280, 0, 640, 480), 2560)
        .unwrap();
    assert_eq!(
        m.set_layer_scale_factor(l1, Scale::X2),
        Err(MixerError::LayerWindowInvalid)
    );
    m.set_layer_window(l1, Window::new(0, 0, 640, 480), 2560)
        .unwrap();
    m.set_layer_scale_factor(l1, Scale::X2).unwrap();
    assert_eq!(m.layer_scale_factor(l1), Ok(Scale::X2));
    // A window that fits unscaled but not at twice its size.
    assert_eq!(
        m.set_layer_window(l1, Window::new(1000, 0, 640, 480), 2560),
        Err(MixerError::LayerWindowInvalid)
    );
    assert_eq!(
        m.set_layer_scale_factor(LayerId::Layer(2), Scale::X2),
        Err(MixerError::DisabledInHardware)
    );
}

#[test]
fn enable_and_disable_layers() {
    let sim = SimRegisters::new();
    let m = mixer(&sim);
    m.layer_enable(LayerId::Layer(2)).unwrap();
    m.layer_enable(LayerId::Logo).unwrap();
    assert_eq!(sim.peek(regs::LAYER_ENABLE), 1 | 1 << 2 | 1 << 23);
    m.layer_disable(LayerId::Master).unwrap();
    assert!(!m.is_layer_enabled(LayerId::Master));
    assert_eq!(
        m.layer_enable(LayerId::Layer(9)),
        Err(MixerError::InvalidLayer)
    );
    m.enable_all();
    assert_eq!(sim.peek(regs::LAYER_ENABLE), 0b1111 | 1 << 23);
    m.disable_all();
    assert_eq!(sim.peek(regs::LAYER_ENABLE), 0);
}

#[test]
fn background_follows_stream_format() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    m.set_background_color(BackgroundColor::Red, ColorDepth::Bpc8)
        .unwrap();
    assert_eq!(sim.peek(regs::BACKGROUND_Y_R), 255);
    assert_eq!(sim.peek(regs::BACKGROUND_U_G), 0);
    assert_eq!(m.background_color(), BackgroundColor::Red);

    let yuv = VideoStream::from_mode(
        VideoMode::Hd720p60,
        ColorFormat::Yuv422,
        ColorDepth::Bpc8,
        PixelsPerClock::Two,
    );
    m.set_video_stream(&yuv).unwrap();
    m.set_background_color(BackgroundColor::Black, ColorDepth::Bpc8)
        .unwrap();
    assert_eq!(sim.peek(regs::BACKGROUND_Y_R), 16);
    assert_eq!(sim.peek(regs::BACKGROUND_U_G), 128);

    sim.clear_log();
    assert_eq!(
        m.set_background_color(BackgroundColor::White, ColorDepth::Bpc10),
        Err(MixerError::InvalidParameter)
    );
    assert_eq!(sim.write_count(), 0);
}

#[test]
fn reject_stream_beyond_capabilities() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    sim.clear_log();
    let wrong_ppc = VideoStream::from_mode(
        VideoMode::Fhd1080p60,
        ColorFormat::Rgb,
        ColorDepth::Bpc8,
        PixelsPerClock::Four,
    );
    let memory_format = VideoStream::from_mode(
        VideoMode::Fhd1080p60,
        ColorFormat::Rgba8,
        ColorDepth::Bpc8,
        PixelsPerClock::Two,
    );
    let too_deep = VideoStream::from_mode(
        VideoMode::Fhd1080p60,
        ColorFormat::Rgb,
        ColorDepth::Bpc10,
        PixelsPerClock::Two,
    );
    for stream in [wrong_ppc, memory_format, too_deep] {
        assert_eq!(
            m.set_video_stream(&stream),
            Err(MixerError::InvalidParameter)
        );
    }
    assert_eq!(sim.write_count(), 0);
    assert_eq!(m.video_stream().width(), 3840);
}

#[test]
fn logo() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    let win = Window::new(100, 100, 16, 16);
    let plane = [0x11u8; 256];
    m.load_logo(win, &plane, &plane, &plane).unwrap();
    assert_eq!(m.layer_window(LayerId::Logo), Ok(win));
    assert_eq!(sim.peek(regs::LOGO_START_X), 100);
    assert_eq!(sim.peek(regs::LOGO_R_BRAM), 0x1111_1111);
    // Rows are spaced by the maximum logo width.
    assert_eq!(sim.peek(regs::LOGO_B_BRAM + 256), 0x1111_1111);
    m.load_logo_pixel_alpha(win, &plane).unwrap();

    assert_eq!(
        m.set_layer_window(LayerId::Logo, Window::new(0, 0, 8, 8), 0),
        Err(MixerError::LayerWindowInvalid)
    );
    assert_eq!(
        m.load_logo(win, &plane[..10], &plane, &plane),
        Err(MixerError::InvalidParameter)
    );

    let key = ColorKey {
        min: [0, 10, 20],
        max: [30, 40, 50],
    };
    m.set_logo_color_key(key).unwrap();
    assert_eq!(m.logo_color_key(), Ok(key));
}

static FRAMES: AtomicUsize = AtomicUsize::new(0);

fn frame_done() {
    _ = FRAMES.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn frame_done_interrupt() {
    let sim = SimRegisters::new();
    let mut m = mixer(&sim);
    m.set_frame_done_callback(frame_done);
    m.interrupt_enable();
    assert_eq!(sim.peek(IER), 1);
    assert_eq!(sim.peek(GIE), 1);

    sim.force_bits(ISR, 1);
    m.interrupt_handler();
    assert_eq!(FRAMES.load(Ordering::SeqCst), 1);
    assert_eq!(sim.writes_to(ISR), vec![1]);

    // Status bits are cleared on write.
    sim.preset(ISR, 0);
    sim.release_bits(ISR);
    m.interrupt_handler();
    assert_eq!(FRAMES.load(Ordering::SeqCst), 1);

    m.interrupt_disable();
    assert_eq!(sim.peek(IER), 0);
    assert_eq!(sim.peek(GIE), 0);
}

#[test]
fn start_and_stop() {
    let sim = SimRegisters::new();
    let m = mixer(&sim);
    m.start();
    assert_eq!(sim.peek(AP_CTRL), 0x81);
    assert_eq!(m.stop(), Err(HlsError::Timeout));
    assert_eq!(sim.peek(AP_CTRL), 0);

    sim.force_bits(AP_CTRL, 1 << 2);
    assert_eq!(m.stop(), Ok(()));
}
