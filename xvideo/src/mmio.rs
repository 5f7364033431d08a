//! Register access for memory-mapped IP cores.
//!
//! All drivers in this crate talk to their hardware exclusively through
//! [RegisterIo]. On the target this is [Mmio], which performs volatile 32 bit
//! accesses relative to the base address of the IP core. Tests substitute a
//! register file in memory.

use volatile_register::RW;

/// Access to the 32 bit register file of one IP core.
///
/// Offsets are byte offsets relative to the base address of the core and are
/// always 4 byte aligned.
pub trait RegisterIo {
    /// Reads the register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Writes `value` to the register at `offset`.
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write of the register at `offset`.
    fn modify<F: FnOnce(u32) -> u32>(&self, offset: usize, f: F) {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Writes a 64 bit value as two consecutive registers, low word first.
    fn write_u64(&self, offset: usize, value: u64) {
        self.write(offset, value as u32);
        self.write(offset + 4, (value >> 32) as u32);
    }

    /// Reads a 64 bit value from two consecutive registers.
    fn read_u64(&self, offset: usize) -> u64 {
        let lo = self.read(offset) as u64;
        let hi = self.read(offset + 4) as u64;
        (hi << 32) | lo
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for &T {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// Volatile access to a memory-mapped register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Creates a register accessor for the core mapped at `base`.
    ///
    /// # Safety
    /// `base` must be the physical (or identity-mapped) address of the IP
    /// core's AXI4-Lite register window, and no other code may hold a
    /// conflicting mapping of the same window.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register window.
    pub const fn base(&self) -> usize {
        self.base
    }

    fn reg(&self, offset: usize) -> *const RW<u32> {
        (self.base + offset) as *const RW<u32>
    }
}

impl RegisterIo for Mmio {
    fn read(&self, offset: usize) -> u32 {
        unsafe { (*self.reg(offset)).read() }
    }

    fn write(&self, offset: usize, value: u32) {
        unsafe { (*self.reg(offset)).write(value) }
    }
}
