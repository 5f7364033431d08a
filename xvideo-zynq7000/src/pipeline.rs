use log::{debug, info};
use xvideo::prelude::*;

/// Overlay shown on top of the test pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySettings {
    /// Memory layer showing the frame buffer
    pub layer: u8,
    /// Position within the stream
    pub window: Window,
    /// Line stride of the frame buffer in bytes
    pub stride: u32,
    /// Address of the frame buffer
    pub buffer: u64,
}

/// What the pipeline shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub mode: VideoMode,
    pub color_format: ColorFormat,
    pub color_depth: ColorDepth,
    pub pattern: Pattern,
    pub background: BackgroundColor,
    pub overlay: Option<OverlaySettings>,
}

/// The chain TPG, mixer and VTC generator.
#[derive(Debug)]
pub struct Pipeline<R: RegisterIo> {
    pub vtc: Vtc<R>,
    pub tpg: Tpg<R>,
    pub mixer: Mixer<R>,
}

impl<R: RegisterIo> Pipeline<R> {
    /// Creates the drivers for device 0 of each core in `cfg`. `map` returns
    /// the register access for a base address.
    pub fn from_config<const MIX: usize, const VTC: usize, const TPG: usize, const DMS: usize>(
        cfg: &HardwareConfig<MIX, VTC, TPG, DMS>,
        mut map: impl FnMut(usize) -> R,
    ) -> Result<Self, Error> {
        let vtc = cfg.lookup_vtc(0).ok_or(HardwareConfigError::NotFound)?;
        let tpg = cfg.lookup_tpg(0).ok_or(HardwareConfigError::NotFound)?;
        let mixer = cfg.lookup_mixer(0).ok_or(HardwareConfigError::NotFound)?;
        Ok(Self {
            vtc: Vtc::initialize(vtc.clone(), map(vtc.base_address))?,
            tpg: Tpg::initialize(tpg.clone(), map(tpg.base_address))?,
            mixer: Mixer::initialize(mixer.clone(), map(mixer.base_address))?,
        })
    }

    /// Programs every core for `settings` and starts the pipeline.
    pub fn start(&mut self, settings: &PipelineSettings) -> Result<(), Error> {
        let stream = VideoStream::from_mode(
            settings.mode,
            settings.color_format,
            settings.color_depth,
            self.mixer.config().ppc,
        );

        self.vtc.disable();
        self.vtc.set_generator_video_mode(settings.mode)?;
        self.vtc.set_source_select_all();
        self.vtc.register_update_enable();
        self.vtc.enable_generator()?;

        self.tpg.configure(&stream, settings.pattern)?;

        self.mixer.set_video_stream(&stream)?;
        self.mixer
            .set_background_color(settings.background, settings.color_depth)?;
        if let Some(overlay) = settings.overlay {
            let id = LayerId::Layer(overlay.layer);
            self.mixer
                .set_layer_window(id, overlay.window, overlay.stride)?;
            self.mixer.set_layer_buffer_address(id, overlay.buffer)?;
            self.mixer.layer_enable(id)?;
            debug!("Overlay on layer {} at {:?}", overlay.layer, overlay.window);
        }

        self.tpg.start();
        self.mixer.start();
        self.vtc.enable();
        info!(
            "Pipeline running {:?} {:?} {}bpc",
            settings.mode,
            settings.color_format,
            settings.color_depth.bits()
        );
        Ok(())
    }

    /// Stops the pipeline after the current frame.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.mixer.stop()?;
        self.tpg.stop()?;
        self.vtc.disable();
        info!("Pipeline stopped");
        Ok(())
    }

    /// Logs the state of every core.
    pub fn report(&self) {
        self.vtc.report();
        self.tpg.report();
        self.mixer.report();
    }
}
