use core::{fmt::Write, num::NonZeroUsize};
use heapless::String;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::race::OnceNonZeroUsize;
use uart_xilinx::MmioUartAxi16550;

/// Longest log line. Longer lines are cut.
const LINE_LENGTH: usize = 256;

/// 8 data bits, no parity, one stop bit
const LCR_8N1: u8 = 0b0000_0011;
/// Enable the FIFOs and clear the transmit FIFO
const FCR_ENABLE_CLEAR_TX: u8 = 0b0000_0101;

static UART_BASE: OnceNonZeroUsize = OnceNonZeroUsize::new();
static LOGGER: UartLogger = UartLogger;

/// Logs to an AXI UART 16550.
///
/// The UART is only written to. Lines are sent by polling the transmitter.
#[derive(Debug)]
pub struct UartLogger;

impl UartLogger {
    /// Sets up the UART at `base` for transmitting and installs the logger.
    ///
    /// Only the first call with a non-zero `base` touches the UART.
    pub fn init(
        base: usize,
        clock_rate: usize,
        baud_rate: usize,
        level: LevelFilter,
    ) -> Result<(), SetLoggerError> {
        if let Some(base) = NonZeroUsize::new(base) {
            if UART_BASE.set(base).is_ok() {
                let uart = MmioUartAxi16550::new(base.get());
                uart.init(clock_rate, baud_rate);
                uart.write_ier(0);
                uart.write_lcr(LCR_8N1);
                uart.write_fcr(FCR_ENABLE_CLEAR_TX);
            }
        }
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }
}

/// A log line that drops what does not fit.
struct Line(String<LINE_LENGTH>);

impl Write for Line {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            self.0.push(c).map_err(|_| core::fmt::Error)?;
        }
        Ok(())
    }
}

fn format_line(record: &Record) -> Line {
    let mut line = Line(String::new());
    // A full line is sent as far as it got.
    _ = write!(line, "[{}] {}", record.level(), record.args());
    line
}

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(base) = UART_BASE.get() else {
            return;
        };
        let line = format_line(record);
        let uart = MmioUartAxi16550::new(base.get());
        for b in line.0.bytes().chain(*b"\r\n") {
            while !uart.is_transmitter_holding_register_empty() {}
            uart.write_byte(b);
        }
    }

    fn flush(&self) {}
}
