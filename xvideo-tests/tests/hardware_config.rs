use xvideo::prelude::*;
use xvideo_tests::{test_config, test_data, TestConfig};

#[test]
fn main() {
    let cfg = test_config();
    println!("{cfg:?}");
    cfg.validate().unwrap();
}

#[test]
fn lookup_devices() {
    let cfg = test_config();

    let mixer = cfg.lookup_mixer(0).unwrap();
    assert_eq!(mixer.base_address, 0x43C0_0000);
    assert_eq!(mixer.ppc, PixelsPerClock::Two);
    assert_eq!(mixer.num_layers(), 4);
    assert_eq!(mixer.layers[1].color_format, ColorFormat::YUv8);
    assert!(!mixer.layers[1].alpha);
    assert_eq!(mixer.layers[2].interface, LayerInterface::Stream);
    assert!(mixer.logo.is_some_and(|l| l.pixel_alpha));

    assert!(cfg.lookup_vtc(0).unwrap().detector);
    assert!(!cfg.lookup_vtc(1).unwrap().detector);
    assert!(cfg.lookup_vtc(2).is_none());
    assert!(cfg.lookup_tpg(0).unwrap().pass_through);
    assert_eq!(
        cfg.lookup_demosaic(0).unwrap().max_data_width,
        ColorDepth::Bpc10
    );
    assert!(cfg.lookup_mixer(1).is_none());
}

#[test]
fn postcard_round_trip() {
    let cfg = test_config();
    let blob = postcard::to_stdvec(&cfg).unwrap();
    let decoded: TestConfig = postcard::from_bytes(&blob).unwrap();
    assert_eq!(cfg, decoded);
}

#[test]
fn reject_unsupported_ppc() {
    let yaml = test_data::CFG.replacen("ppc: 2", "ppc: 3", 1);
    assert!(serde_yaml::from_str::<TestConfig>(&yaml).is_err());
}

#[test]
fn reject_unsupported_depth() {
    let yaml = test_data::CFG.replacen("max_data_width: 10", "max_data_width: 9", 1);
    assert!(serde_yaml::from_str::<TestConfig>(&yaml).is_err());
}

#[test]
fn validate_rejects_duplicates() {
    let yaml = test_data::CFG.replacen("device_id: 1", "device_id: 0", 1);
    let cfg: TestConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(cfg.validate(), Err(HardwareConfigError::DuplicateDevice));
}

#[test]
fn validate_rejects_stream_layer_with_memory_format() {
    let yaml = test_data::CFG.replacen("color_format: yuv422", "color_format: rgba8", 1);
    let cfg: TestConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(cfg.validate(), Err(HardwareConfigError::ColorFormat));
}

#[test]
fn builder_checks_every_step() {
    let mut builder = HardwareConfig::<1, 2, 1, 1>::builder();
    assert_eq!(
        builder
            .vtc(VtcConfig {
                device_id: 0,
                base_address: 0x43C1_0000,
                generator: false,
                detector: false,
            })
            .unwrap_err(),
        HardwareConfigError::Capability
    );
    assert_eq!(
        builder
            .tpg(TpgConfig {
                device_id: 0,
                base_address: 0,
                ppc: PixelsPerClock::One,
                max_width: 1920,
                max_height: 1080,
                max_data_width: ColorDepth::Bpc8,
                pass_through: false,
            })
            .unwrap_err(),
        HardwareConfigError::BaseAddress
    );
    assert_eq!(
        builder
            .demosaic(DemosaicConfig {
                device_id: 0,
                base_address: 0x43C3_0000,
                ppc: PixelsPerClock::One,
                max_width: 16384,
                max_height: 1080,
                max_data_width: ColorDepth::Bpc8,
            })
            .unwrap_err(),
        HardwareConfigError::Resolution
    );

    let cfg = builder
        .vtc(VtcConfig {
            device_id: 0,
            base_address: 0x43C1_0000,
            generator: true,
            detector: false,
        })
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(cfg.vtcs.len(), 1);
    assert!(cfg.tpgs.is_empty());
}

#[test]
fn error_codes() {
    assert_eq!(Error::from(HardwareConfigError::NotFound).code(), XST_DEVICE_NOT_FOUND);
    assert_eq!(Error::from(HardwareConfigError::Logo).code(), XST_INVALID_PARAM);
    assert_eq!(Error::from(MixerError::LayerWindowInvalid).code(), 0x10);
    assert_eq!(Error::from(HlsError::Timeout).code(), XST_FAILURE);
}
