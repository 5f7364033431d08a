#![no_std]

use core::{
    ptr::addr_of_mut,
    sync::atomic::{AtomicU32, Ordering},
};
use log::{error, info, LevelFilter};
use xvideo::prelude::*;
use xvideo_zynq7000::{bring_up, config, Pipeline, UartLogger};

static FRAMES: AtomicU32 = AtomicU32::new(0);
static mut PIPELINE: Option<Pipeline<Mmio>> = None;

fn on_frame_done() {
    _ = FRAMES.fetch_add(1, Ordering::Relaxed);
}

/// Brings up the video pipeline described by the `postcard` blob at
/// `cfg_ptr`. Returns `0` on success and the status code of the error
/// otherwise.
///
/// # Safety
/// `cfg_ptr` must point to `cfg_len` readable bytes. Must not be called
/// while [xvideo_mixer_irq] can run.
#[no_mangle]
pub unsafe extern "C" fn xvideo_demo_main(cfg_ptr: *const u8, cfg_len: usize) -> u32 {
    _ = UartLogger::init(
        config::UART_BASE,
        config::UART_CLOCK_RATE,
        config::UART_BAUD_RATE,
        LevelFilter::Info,
    );
    if cfg_ptr.is_null() {
        error!("No hardware description");
        return XST_INVALID_PARAM;
    }
    let blob = core::slice::from_raw_parts(cfg_ptr, cfg_len);
    // SAFETY: the mixer interrupt is masked until the pipeline is stored.
    let slot = &mut *addr_of_mut!(PIPELINE);
    // SAFETY: base addresses are taken from the hardware description of
    // this design.
    match bring_up(slot, blob, |base| Mmio::new(base), on_frame_done) {
        Ok(_) => 0,
        Err(e) => {
            error!("{e}");
            e.code()
        }
    }
}

/// Interrupt service routine of the mixer.
///
/// # Safety
/// Must not run concurrently with [xvideo_demo_main].
#[no_mangle]
pub unsafe extern "C" fn xvideo_mixer_irq() {
    if let Some(pipeline) = (*addr_of_mut!(PIPELINE)).as_ref() {
        pipeline.mixer.interrupt_handler();
    }
}

/// Frames completed by the mixer since the pipeline was started.
#[no_mangle]
pub extern "C" fn xvideo_frames() -> u32 {
    FRAMES.load(Ordering::Relaxed)
}

/// Logs the state of every core.
///
/// # Safety
/// Must not run concurrently with [xvideo_mixer_irq].
#[no_mangle]
pub unsafe extern "C" fn xvideo_report() {
    match (*addr_of_mut!(PIPELINE)).as_ref() {
        Some(pipeline) => {
            info!("{} frames", xvideo_frames());
            pipeline.report();
        }
        None => info!("Pipeline not running"),
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    error!("{info}");
    loop {}
}
