//! Control block shared by the HLS generated cores (mixer, TPG, demosaic).

use crate::mmio::RegisterIo;
use bitflags::bitflags;
use core::fmt::{Display, Formatter};

/// `ap_ctrl` handshake register.
pub(crate) const ADDR_AP_CTRL: usize = 0x00;
/// Global interrupt enable.
pub(crate) const ADDR_GIE: usize = 0x04;
/// Interrupt enable.
pub(crate) const ADDR_IER: usize = 0x08;
/// Interrupt status, toggle on write.
pub(crate) const ADDR_ISR: usize = 0x0C;

bitflags! {
    /// Bits of the `ap_ctrl` register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ApCtrl: u32 {
        /// Start processing of the next frame.
        const START        = 1 << 0;
        /// Frame has been processed.
        const DONE         = 1 << 1;
        /// Core is idle.
        const IDLE         = 1 << 2;
        /// Core is ready to accept new input.
        const READY        = 1 << 3;
        /// Restart automatically after each frame.
        const AUTO_RESTART = 1 << 7;
    }
}

bitflags! {
    /// Interrupt sources of an HLS core.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HlsIrq: u32 {
        /// `ap_done`
        const DONE  = 1 << 0;
        /// `ap_ready`
        const READY = 1 << 1;
    }
}

/// Error of the HLS control handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HlsError {
    /// The core did not become idle in time.
    Timeout,
}

impl HlsError {
    /// Status code of this error.
    pub fn code(&self) -> u32 {
        crate::error::XST_FAILURE
    }
}

impl Display for HlsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "Core did not become idle"),
        }
    }
}

/// The `ap_ctrl` block of an HLS core.
#[derive(Debug, Clone)]
pub struct HlsCore<R: RegisterIo> {
    io: R,
}

impl<R: RegisterIo> HlsCore<R> {
    pub(crate) fn new(io: R) -> Self {
        Self { io }
    }

    pub(crate) fn io(&self) -> &R {
        &self.io
    }

    fn ctrl(&self) -> ApCtrl {
        ApCtrl::from_bits_retain(self.io.read(ADDR_AP_CTRL))
    }

    /// Starts the core, keeping the auto-restart setting.
    pub fn start(&self) {
        let restart = self.ctrl() & ApCtrl::AUTO_RESTART;
        self.io.write(ADDR_AP_CTRL, (restart | ApCtrl::START).bits());
    }

    /// Whether the last frame has been processed.
    pub fn is_done(&self) -> bool {
        self.ctrl().contains(ApCtrl::DONE)
    }

    /// Whether the core is idle.
    pub fn is_idle(&self) -> bool {
        self.ctrl().contains(ApCtrl::IDLE)
    }

    /// Whether the core accepts a new start.
    pub fn is_ready(&self) -> bool {
        !self.ctrl().contains(ApCtrl::START)
    }

    /// Lets the core restart after every frame.
    pub fn enable_auto_restart(&self) {
        self.io.write(ADDR_AP_CTRL, ApCtrl::AUTO_RESTART.bits());
    }

    /// Lets the core stop after the current frame.
    pub fn disable_auto_restart(&self) {
        self.io.write(ADDR_AP_CTRL, 0);
    }

    /// Disables auto-restart and waits for at most `max_polls` reads of the
    /// control register for the core to become idle.
    pub fn stop(&self, max_polls: u32) -> Result<(), HlsError> {
        self.disable_auto_restart();
        for _ in 0..max_polls {
            if self.is_idle() {
                return Ok(());
            }
        }
        xv_warn!("HLS core did not become idle after {} polls", max_polls);
        Err(HlsError::Timeout)
    }

    /// Enables the interrupt output of the core.
    pub fn global_interrupt_enable(&self) {
        self.io.write(ADDR_GIE, 1);
    }

    /// Disables the interrupt output of the core.
    pub fn global_interrupt_disable(&self) {
        self.io.write(ADDR_GIE, 0);
    }

    /// Enables the given interrupt sources.
    pub fn interrupt_enable(&self, mask: HlsIrq) {
        self.io.modify(ADDR_IER, |v| v | mask.bits());
    }

    /// Disables the given interrupt sources.
    pub fn interrupt_disable(&self, mask: HlsIrq) {
        self.io.modify(ADDR_IER, |v| v & !mask.bits());
    }

    /// Enabled interrupt sources.
    pub fn interrupts_enabled(&self) -> HlsIrq {
        HlsIrq::from_bits_truncate(self.io.read(ADDR_IER))
    }

    /// Pending interrupt sources.
    pub fn interrupt_status(&self) -> HlsIrq {
        HlsIrq::from_bits_truncate(self.io.read(ADDR_ISR))
    }

    /// Acknowledges the given interrupt sources.
    pub fn interrupt_clear(&self, mask: HlsIrq) {
        self.io.write(ADDR_ISR, mask.bits());
    }
}
