//! Bit-banged chain link
//!
//! Three GPIO outputs: DIN, CLK and LOAD/CS. Each bit is put on DIN and
//! clocked in with a CLK pulse; the clock rate is whatever the pin writes
//! manage.
use crate::max72xx::interface::ByteLink;
use display_interface::DisplayError;
use embedded_hal::digital::{OutputPin, PinState};

/// Software timed serial link to the first chip of the chain
pub struct BitBang<DIN, CLK, CS> {
    /// Serial data into the first chip
    din: DIN,
    /// Serial clock, data is sampled on the rising edge
    clk: CLK,
    /// LOAD (MAX7219) or CS (MAX7221), data is latched on the rising edge
    cs: CS,
}

impl<DIN, CLK, CS> BitBang<DIN, CLK, CS> {
    /// Bundle the pins, nothing is driven yet
    pub fn new(din: DIN, clk: CLK, cs: CS) -> Self {
        BitBang { din, clk, cs }
    }

    /// Give the pins back
    pub fn release(self) -> (DIN, CLK, CS) {
        (self.din, self.clk, self.cs)
    }
}

impl<DIN, CLK, CS> ByteLink for BitBang<DIN, CLK, CS>
where
    DIN: OutputPin,
    CLK: OutputPin,
    CS: OutputPin,
{
    fn setup(&mut self) -> Result<(), DisplayError> {
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        self.clk.set_low().map_err(|_| DisplayError::BusWriteError)?;
        self.din.set_low().map_err(|_| DisplayError::BusWriteError)
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)
    }

    fn shift_out(&mut self, byte: u8) -> Result<(), DisplayError> {
        for bit in (0..8).rev() {
            let level = PinState::from(byte & (1 << bit) != 0);
            self.din
                .set_state(level)
                .map_err(|_| DisplayError::BusWriteError)?;
            self.clk.set_high().map_err(|_| DisplayError::BusWriteError)?;
            self.clk.set_low().map_err(|_| DisplayError::BusWriteError)?;
        }
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        self.cs.set_high().map_err(|_| DisplayError::CSError)
    }
}
