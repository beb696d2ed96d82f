//! MAX72xx Chain Driver Implementation
//!
//! This module contains the main driver for a daisy chain of MAX7219/MAX7221
//! LED matrix controllers. It owns the framebuffer of the whole chain and
//! talks to the chips through a [`ChainInterface`].
//!
//! ## Architecture
//!
//! ### Initialization Functions
//! - `new()` / `bitbang()` / `hardware()` - Create the driver, no hardware access
//! - `begin()` - Set up the transport and bring every chip to a known state
//!
//! ### Buffer Functions
//! - `set_led()`, `set_col()`, `set_row()` - Change the buffer, mark devices dirty
//! - `led()`, `col()`, `is_dirty()` - Read the buffer back
//!
//! ### Display Update Functions
//! - `show()` / `show_device()` - Flush dirty devices, the only way buffered
//!   content reaches the chips
//! - `clear()` / `clear_device()` - Blank buffer and chips at once
//!
//! ### Chip Configuration
//! - `set_shutdown()`, `set_scan_limit()`, `set_brightness()`
//! - `test_mode()` / `test_mode_all()` - Display test, bypasses the buffer
//!
//! ## Critical Implementation Details
//!
//! ### Column-major buffer
//!
//! Each chip column (DIG0..DIG7) is one byte, row 0 in bit 7. A buffer column
//! is written unchanged to its digit register.
//!
//! ### Begin order
//!
//! Chips may power up in display test mode with random digit registers, so
//! `begin()` disables test mode and blanks the digits before setting the
//! brightness.

pub use crate::max72xx::error::{Error, Result};

use embedded_hal::digital::OutputPin;

use crate::max72xx::bitbang::BitBang;
use crate::max72xx::buffer::FrameBuffer;
use crate::max72xx::hardware::{HardwareSpi, SpiPeripheral};
use crate::max72xx::interface::{ByteLink, ChainInterface};
use crate::max72xx::{cmd::Cmd, flag::Flag, COLUMNS, DEFAULT_BRIGHTNESS, MAX_DEVICES, ROWS};

/// MAX7219/MAX7221 daisy chain driver
///
/// ## Type Parameters
///
/// - `L` - Byte link to the chain, [`BitBang`] or [`HardwareSpi`]
pub struct Max72xx<L> {
    /// The register interface of the chain
    interface: ChainInterface<L>,
    /// Buffered LED state, one record per device
    buffer: FrameBuffer,
}

/// Driver over three GPIO pins
pub type Max72xxSoft<DIN, CLK, CS> = Max72xx<BitBang<DIN, CLK, CS>>;

/// Driver over a hardware SPI peripheral and a chip select pin
pub type Max72xxHard<P, CS> = Max72xx<HardwareSpi<P, CS>>;

impl<L> Max72xx<L> {
    /// Create the driver for `devices` chips, clamped to 1..=8.
    ///
    /// Nothing is sent until [`Max72xx::begin`].
    pub fn new(link: L, devices: usize) -> Self {
        let count = devices.clamp(1, MAX_DEVICES);
        if count != devices {
            log::warn!(
                "Requested {} devices, chain supports 1..={}; using {}",
                devices,
                MAX_DEVICES,
                count
            );
        }
        Max72xx {
            interface: ChainInterface::new(link, count),
            buffer: FrameBuffer::new(count),
        }
    }

    /// Number of chips in the chain
    pub fn device_count(&self) -> usize {
        self.buffer.device_count()
    }

    /// Row (segment) lines of a device, always 8
    pub fn max_rows(&self, _device: usize) -> usize {
        ROWS
    }

    /// Column (digit) lines per device, always 8
    pub fn max_columns(&self) -> usize {
        COLUMNS
    }

    /// Addressable LEDs of a device, always 64
    pub fn max_segments(&self, device: usize) -> usize {
        self.max_rows(device) * self.max_columns()
    }

    /// Set or clear one LED in the buffer; call [`Max72xx::show`] to display it.
    pub fn set_led(&mut self, device: usize, row: usize, col: usize, state: bool) -> Result<()> {
        self.buffer.set_led(device, row, col, state)
    }

    /// Buffered LED state, not read from the chip. False when out of range.
    pub fn led(&self, device: usize, row: usize, col: usize) -> bool {
        self.buffer.led(device, row, col)
    }

    /// Replace one column in the buffer, bit 7 is row 0
    pub fn set_col(&mut self, device: usize, col: usize, value: u8) -> Result<()> {
        self.buffer.set_col(device, col, value)
    }

    /// Buffered column byte
    pub fn col(&self, device: usize, col: usize) -> Option<u8> {
        self.buffer.col(device, col)
    }

    /// Replace one row in the buffer, bit 7 is column 0
    pub fn set_row(&mut self, device: usize, row: usize, value: u8) -> Result<()> {
        self.buffer.set_row(device, row, value)
    }

    /// Device has buffered changes not yet shown
    pub fn is_dirty(&self, device: usize) -> bool {
        self.buffer.is_dirty(device)
    }

    /// The chain framebuffer
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Borrow the transport
    pub fn link(&self) -> &L {
        self.interface.link()
    }

    /// Give the transport back
    pub fn release(self) -> L {
        self.interface.release()
    }

    fn check_device(&self, device: usize) -> Result<()> {
        if device < self.device_count() {
            Ok(())
        } else {
            Err(Error::OutOfRange)
        }
    }
}

impl<L: ByteLink> Max72xx<L> {
    /// Set up the transport, then bring every chip to a known state:
    /// awake, all digits scanned, no decode, no display test, blank, medium brightness.
    pub fn begin(&mut self) -> Result<()> {
        log::info!("Initializing chain of {} MAX72xx devices", self.device_count());
        self.interface.setup()?;

        for device in 0..self.device_count() {
            self.set_shutdown(device, false)?;
            self.set_scan_limit(device, Flag::SCAN_LIMIT_ALL_DIGITS)?;
            self.write(device, Cmd::DECODE_MODE, Flag::NO_DECODE)?;
            self.test_mode(device, false)?;
            self.clear_device(device)?;
            self.set_brightness(device, DEFAULT_BRIGHTNESS)?;
        }
        Ok(())
    }

    /// Enter (`true`) or leave (`false`) shutdown mode.
    ///
    /// The register holds the inverse: 0 shuts the chip down, 1 is normal operation.
    /// The value written follows the datasheet, so `begin` wakes chips with `false`.
    pub fn set_shutdown(&mut self, device: usize, shutdown: bool) -> Result<()> {
        let data = if shutdown {
            Flag::SHUTDOWN_MODE
        } else {
            Flag::NORMAL_OPERATION
        };
        self.write(device, Cmd::SHUTDOWN, data)
    }

    /// Highest scanned digit, masked to 0..=7
    pub fn set_scan_limit(&mut self, device: usize, limit: u8) -> Result<()> {
        self.write(device, Cmd::SCAN_LIMIT, limit & Flag::SCAN_LIMIT_MASK)
    }

    /// Brightness, masked to 0..=15
    pub fn set_brightness(&mut self, device: usize, brightness: u8) -> Result<()> {
        self.write(device, Cmd::INTENSITY, brightness & Flag::INTENSITY_MASK)
    }

    /// Light every LED of a device regardless of its digit registers
    pub fn test_mode(&mut self, device: usize, enable: bool) -> Result<()> {
        let data = if enable {
            Flag::DISPLAY_TEST_ON
        } else {
            Flag::DISPLAY_TEST_OFF
        };
        self.write(device, Cmd::DISPLAY_TEST, data)
    }

    /// Display test on every device
    pub fn test_mode_all(&mut self, enable: bool) -> Result<()> {
        for device in 0..self.device_count() {
            self.test_mode(device, enable)?;
        }
        Ok(())
    }

    /// Blank one device in the buffer and on the chip right away.
    ///
    /// The device stays marked dirty.
    pub fn clear_device(&mut self, device: usize) -> Result<()> {
        self.buffer.clear_device(device)?;
        self.interface.blank(device)?;
        Ok(())
    }

    /// Blank every device in the buffer and on the chips
    pub fn clear(&mut self) -> Result<()> {
        for device in 0..self.device_count() {
            self.clear_device(device)?;
        }
        Ok(())
    }

    /// Push every dirty device to its chip
    pub fn show(&mut self) -> Result<()> {
        for device in 0..self.device_count() {
            if self.buffer.is_dirty(device) {
                self.flush(device)?;
            }
        }
        Ok(())
    }

    /// Push one device to its chip; `Error::NotDirty` when there is nothing to send
    pub fn show_device(&mut self, device: usize) -> Result<()> {
        self.check_device(device)?;
        if !self.buffer.is_dirty(device) {
            return Err(Error::NotDirty);
        }
        self.flush(device)
    }

    fn flush(&mut self, device: usize) -> Result<()> {
        let columns = self.buffer.columns(device).ok_or(Error::OutOfRange)?;
        log::debug!("Showing device {}: {:02X?}", device, columns);
        self.interface.write_columns(device, &columns)?;
        self.buffer.mark_clean(device);
        Ok(())
    }

    fn write(&mut self, device: usize, opcode: u8, data: u8) -> Result<()> {
        self.check_device(device)?;
        self.interface.write_register(device, opcode, data)?;
        Ok(())
    }
}

impl<DIN, CLK, CS> Max72xxSoft<DIN, CLK, CS>
where
    DIN: OutputPin,
    CLK: OutputPin,
    CS: OutputPin,
{
    /// Driver bit-banging DIN, CLK and CS
    pub fn bitbang(din: DIN, clk: CLK, cs: CS, devices: usize) -> Self {
        Self::new(BitBang::new(din, clk, cs), devices)
    }
}

impl<P, CS> Max72xxHard<P, CS>
where
    P: SpiPeripheral,
    CS: OutputPin,
{
    /// Driver on a hardware SPI peripheral at the default 1 MHz
    pub fn hardware(spi: P, cs: CS, devices: usize) -> Self {
        Self::new(HardwareSpi::new(spi, cs), devices)
    }

    /// Clock rate for the following transactions
    pub fn set_spi_clock(&mut self, frequency: u32) {
        log::debug!("SPI clock set to {} Hz", frequency);
        self.interface.link_mut().set_clock(frequency);
    }

    /// Clock rate used for transactions
    pub fn spi_clock(&self) -> u32 {
        self.interface.link().settings().frequency
    }

    /// Release the SPI peripheral for other uses
    pub fn end(&mut self) {
        log::info!("Ending SPI use of the MAX72xx chain");
        self.interface.link_mut().end();
    }
}
