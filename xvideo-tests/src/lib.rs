pub mod test_data {
    /// A board with one mixer, two timing controllers, a TPG and a demosaic.
    pub const CFG: &str = r##"
mixers:
  - device_id: 0
    base_address: 0x43C00000
    ppc: 2
    max_width: 3840
    max_height: 2160
    max_data_width: 8
    color_format: rgb
    csc_coeffs_regs: true
    logo:
      max_width: 256
      max_height: 256
      color_key: true
      pixel_alpha: true
    layers:
      - interface: memory
        color_format: rgba8
        alpha: true
        scale: true
        max_width: 1920
      - interface: memory
        color_format: y_uv8
        max_width: 1920
      - interface: stream
        color_format: yuv422
        alpha: true
        scale: true
        max_width: 1920
vtcs:
  - device_id: 0
    base_address: 0x43C10000
    generator: true
    detector: true
  - device_id: 1
    base_address: 0x43C50000
    generator: true
    detector: false
tpgs:
  - device_id: 0
    base_address: 0x43C20000
    ppc: 2
    max_width: 3840
    max_height: 2160
    max_data_width: 8
    pass_through: true
demosaics:
  - device_id: 0
    base_address: 0x43C30000
    ppc: 2
    max_width: 3840
    max_height: 2160
    max_data_width: 10
"##;

    /// The camera of the board.
    pub const SENSOR: &str = r##"
model: Ox08b40
address: 0x36
mode: 1
"##;
}

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};
use xvideo::prelude::{HardwareConfig, RegisterIo};

/// Capacities used by the tests.
pub type TestConfig = HardwareConfig<4, 4, 4, 4>;

/// Parses [test_data::CFG].
pub fn test_config() -> TestConfig {
    serde_yaml::from_str(test_data::CFG).expect("Failed to parse test configuration")
}

/// Register file of a simulated IP core.
///
/// Every write is logged. Bits forced with [SimRegisters::force_bits] are
/// set on every read, which models status bits driven by the hardware.
#[derive(Debug, Default)]
pub struct SimRegisters {
    regs: RefCell<BTreeMap<usize, u32>>,
    forced: RefCell<BTreeMap<usize, u32>>,
    log: RefCell<Vec<(usize, u32)>>,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `bits` in every read of `offset`.
    pub fn force_bits(&self, offset: usize, bits: u32) {
        *self.forced.borrow_mut().entry(offset).or_default() |= bits;
    }

    /// Stops forcing bits at `offset`.
    pub fn release_bits(&self, offset: usize) {
        _ = self.forced.borrow_mut().remove(&offset);
    }

    /// Sets a register the way the hardware would, without logging a write.
    pub fn preset(&self, offset: usize, value: u32) {
        _ = self.regs.borrow_mut().insert(offset, value);
    }

    /// Stored value of a register, without forced bits.
    pub fn peek(&self, offset: usize) -> u32 {
        self.regs.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// All writes as offset and value, oldest first.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.log.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Values written to `offset`, oldest first.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.log
            .borrow()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

impl RegisterIo for SimRegisters {
    fn read(&self, offset: usize) -> u32 {
        let forced = self.forced.borrow().get(&offset).copied().unwrap_or(0);
        self.peek(offset) | forced
    }

    fn write(&self, offset: usize, value: u32) {
        self.log.borrow_mut().push((offset, value));
        self.preset(offset, value);
    }
}

/// A camera sensor on an I2C bus.
///
/// Registers have 16 bit addresses and an auto-incrementing address pointer,
/// as on OmniVision sensors. Unwritten registers read as zero.
#[derive(Debug, Default)]
pub struct FakeSccb {
    address: u8,
    regs: HashMap<u16, u8>,
    written: Vec<(u16, u8)>,
    transactions: usize,
    fail_after: Option<usize>,
}

impl FakeSccb {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// A sensor reporting `chip_id` at 0x300A.
    pub fn with_chip_id(address: u8, chip_id: u16) -> Self {
        let mut bus = Self::new(address);
        let [hi, lo] = chip_id.to_be_bytes();
        _ = bus.regs.insert(0x300A, hi);
        _ = bus.regs.insert(0x300B, lo);
        bus
    }

    /// Lets every transaction after the next `n` fail.
    pub fn fail_after(&mut self, n: usize) {
        self.fail_after = Some(self.transactions + n);
    }

    pub fn recover(&mut self) {
        self.fail_after = None;
    }

    pub fn reg(&self, reg: u16) -> u8 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    pub fn reg16(&self, reg: u16) -> u16 {
        u16::from_be_bytes([self.reg(reg), self.reg(reg + 1)])
    }

    /// Register writes as address and value, oldest first.
    pub fn written(&self) -> &[(u16, u8)] {
        &self.written
    }

    pub fn clear_log(&mut self) {
        self.written.clear();
    }
}

impl ErrorType for FakeSccb {
    type Error = ErrorKind;
}

impl I2c for FakeSccb {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ));
        }
        if self.fail_after.is_some_and(|n| self.transactions >= n) {
            return Err(ErrorKind::ArbitrationLoss);
        }
        self.transactions += 1;
        let mut pointer = None;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if bytes.len() < 2 {
                        return Err(ErrorKind::Other);
                    }
                    let (addr, data) = bytes.split_at(2);
                    let mut reg = u16::from_be_bytes([addr[0], addr[1]]);
                    for b in data {
                        _ = self.regs.insert(reg, *b);
                        self.written.push((reg, *b));
                        reg = reg.wrapping_add(1);
                    }
                    pointer = Some(reg);
                }
                Operation::Read(buf) => {
                    let mut reg = pointer.ok_or(ErrorKind::Other)?;
                    for b in buf.iter_mut() {
                        *b = self.reg(reg);
                        reg = reg.wrapping_add(1);
                    }
                    pointer = Some(reg);
                }
            }
        }
        Ok(())
    }
}
