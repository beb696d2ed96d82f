//! Hardware SPI chain link
//!
//! The SPI peripheral is shared with other users of the bus, so every frame
//! is wrapped in `begin_transaction` / `end_transaction` with this driver's
//! settings, and chip select is driven by a dedicated pin.
use crate::max72xx::interface::ByteLink;
use crate::max72xx::DEFAULT_SPI_CLOCK_HZ;
use display_interface::DisplayError;
use embedded_hal::{
    digital::OutputPin,
    spi::{Mode, SpiBus, MODE_0},
};

/// Bus settings applied for the duration of one transaction.
///
/// Data always goes out most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase, the chips expect mode 0
    pub mode: Mode,
}

impl Default for SpiSettings {
    fn default() -> Self {
        SpiSettings {
            frequency: DEFAULT_SPI_CLOCK_HZ,
            mode: MODE_0,
        }
    }
}

/// Process-wide SPI peripheral with explicit, exclusive transactions
pub trait SpiPeripheral {
    /// Power up and configure the peripheral pins
    fn begin(&mut self) -> Result<(), DisplayError>;

    /// Claim the bus with `settings`; fails while another transaction is open
    fn begin_transaction(&mut self, settings: &SpiSettings) -> Result<(), DisplayError>;

    /// Send one byte inside the open transaction
    fn transfer(&mut self, byte: u8) -> Result<(), DisplayError>;

    /// Wait for the bus to drain and release it
    fn end_transaction(&mut self) -> Result<(), DisplayError>;

    /// Shut the peripheral down
    fn end(&mut self);
}

/// [`SpiPeripheral`] over any `embedded-hal` [`SpiBus`].
///
/// The bus itself carries no clock configuration, so the requested frequency
/// is only recorded; configure the HAL bus to match.
pub struct BusPeripheral<B> {
    bus: B,
    claimed: bool,
    frequency: Option<u32>,
}

impl<B> BusPeripheral<B> {
    /// Wrap a bus, not claimed
    pub fn new(bus: B) -> Self {
        BusPeripheral {
            bus,
            claimed: false,
            frequency: None,
        }
    }

    /// Frequency requested by the last transaction
    pub fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    /// A transaction is currently open
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: SpiBus> SpiPeripheral for BusPeripheral<B> {
    fn begin(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn begin_transaction(&mut self, settings: &SpiSettings) -> Result<(), DisplayError> {
        if self.claimed {
            log::error!("SPI bus already claimed by another transaction");
            return Err(DisplayError::BusWriteError);
        }
        if self.frequency != Some(settings.frequency) {
            log::debug!("SPI transactions now request {} Hz", settings.frequency);
            self.frequency = Some(settings.frequency);
        }
        self.claimed = true;
        Ok(())
    }

    fn transfer(&mut self, byte: u8) -> Result<(), DisplayError> {
        if !self.claimed {
            return Err(DisplayError::BusWriteError);
        }
        self.bus
            .write(&[byte])
            .map_err(|_| DisplayError::BusWriteError)
    }

    fn end_transaction(&mut self) -> Result<(), DisplayError> {
        self.claimed = false;
        self.bus.flush().map_err(|_| DisplayError::BusWriteError)
    }

    fn end(&mut self) {
        self.claimed = false;
        self.frequency = None;
    }
}

/// Peripheral driven serial link to the first chip of the chain
pub struct HardwareSpi<P, CS> {
    /// Shared SPI peripheral
    spi: P,
    /// LOAD (MAX7219) or CS (MAX7221)
    cs: CS,
    /// Settings for every transaction
    settings: SpiSettings,
}

impl<P, CS> HardwareSpi<P, CS> {
    /// Link using the default 1 MHz mode 0 settings
    pub fn new(spi: P, cs: CS) -> Self {
        HardwareSpi {
            spi,
            cs,
            settings: SpiSettings::default(),
        }
    }

    /// Clock rate for the following transactions
    pub fn set_clock(&mut self, frequency: u32) {
        self.settings.frequency = frequency;
    }

    /// Current transaction settings
    pub fn settings(&self) -> &SpiSettings {
        &self.settings
    }

    /// Borrow the peripheral
    pub fn peripheral(&self) -> &P {
        &self.spi
    }

    /// Give the peripheral and chip select pin back
    pub fn release(self) -> (P, CS) {
        (self.spi, self.cs)
    }
}

impl<P: SpiPeripheral, CS> HardwareSpi<P, CS> {
    /// Shut the peripheral down
    pub fn end(&mut self) {
        self.spi.end();
    }
}

impl<P, CS> ByteLink for HardwareSpi<P, CS>
where
    P: SpiPeripheral,
    CS: OutputPin,
{
    fn setup(&mut self) -> Result<(), DisplayError> {
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        self.spi.begin()
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        self.spi.begin_transaction(&self.settings)?;
        if self.cs.set_low().is_err() {
            // release the bus for the other users before reporting
            let _ = self.spi.end_transaction();
            return Err(DisplayError::CSError);
        }
        Ok(())
    }

    fn shift_out(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.spi.transfer(byte)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        let raised = self.cs.set_high().map_err(|_| DisplayError::CSError);
        let released = self.spi.end_transaction();
        raised.and(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::max72xx::capture::wiring::{shared_wire, Line, WirePeripheral, WirePin, SharedWire};
    use crate::max72xx::cmd::Cmd;
    use crate::max72xx::interface::ChainInterface;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction};

    /// Chip select that cannot be pulled low
    struct StuckHighPin;

    impl ErrorType for StuckHighPin {
        type Error = ErrorKind;
    }

    impl OutputPin for StuckHighPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn wired_link(wire: &SharedWire) -> HardwareSpi<WirePeripheral, WirePin> {
        HardwareSpi::new(
            WirePeripheral::new(wire),
            WirePin::new(wire, Line::ChipSelect),
        )
    }

    #[test]
    fn test_three_device_intensity_frame() {
        let wire = shared_wire();
        let mut chain = ChainInterface::new(wired_link(&wire), 3);
        chain.setup().unwrap();
        chain.write_register(1, Cmd::INTENSITY, 0x08).unwrap();

        assert_eq!(
            wire.borrow().capture.pairs(),
            vec![vec![(0x00, 0x00), (0x0A, 0x08), (0x00, 0x00)]]
        );
        assert!(wire.borrow().cs_high());

        let (peripheral, _cs) = chain.release().release();
        assert_eq!(peripheral.transactions, vec![SpiSettings::default()]);
        assert!(!peripheral.open);
    }

    #[test]
    fn test_clock_change_applies_to_next_transaction() {
        let wire = shared_wire();
        let mut link = wired_link(&wire);
        assert_eq!(link.settings().frequency, 1_000_000);
        assert_eq!(link.settings().mode, MODE_0);

        link.set_clock(8_000_000);
        let mut chain = ChainInterface::new(link, 1);
        chain.write_register(0, Cmd::SCAN_LIMIT, 0x07).unwrap();

        let peripheral = chain.release().release().0;
        assert_eq!(peripheral.transactions[0].frequency, 8_000_000);
    }

    #[test]
    fn test_bus_peripheral_writes_and_flushes() {
        let expectations = [
            Transaction::write_vec(vec![Cmd::SHUTDOWN]),
            Transaction::write_vec(vec![0x01]),
            Transaction::flush(),
        ];
        let mut bus = SpiMock::new(&expectations);
        let mut peripheral = BusPeripheral::new(bus.clone());

        peripheral.begin().unwrap();
        peripheral.begin_transaction(&SpiSettings::default()).unwrap();
        assert!(peripheral.is_claimed());
        peripheral.transfer(Cmd::SHUTDOWN).unwrap();
        peripheral.transfer(0x01).unwrap();
        peripheral.end_transaction().unwrap();

        assert!(!peripheral.is_claimed());
        assert_eq!(peripheral.frequency(), Some(1_000_000));
        bus.done();
    }

    #[test]
    fn test_bus_peripheral_is_exclusive() {
        let mut bus = SpiMock::new(&[]);
        let mut peripheral = BusPeripheral::new(bus.clone());

        peripheral.begin_transaction(&SpiSettings::default()).unwrap();
        assert!(matches!(
            peripheral.begin_transaction(&SpiSettings::default()),
            Err(DisplayError::BusWriteError)
        ));

        peripheral.end();
        assert!(!peripheral.is_claimed());
        assert!(matches!(
            peripheral.transfer(0x00),
            Err(DisplayError::BusWriteError)
        ));
        bus.done();
    }

    #[test]
    fn test_failed_transfer_releases_bus_and_chip_select() {
        let wire = shared_wire();
        let mut link = wired_link(&wire);
        link.spi.fail_after = Some(3);
        let mut chain = ChainInterface::new(link, 2);

        let result = chain.write_register(0, Cmd::INTENSITY, 0x0F);
        assert!(matches!(result, Err(DisplayError::BusWriteError)));
        assert!(wire.borrow().cs_high());
        assert_eq!(wire.borrow().capture.frames(), &[vec![0x00, 0x00, 0x0A]]);

        let (peripheral, _cs) = chain.release().release();
        assert!(!peripheral.open);
        assert_eq!(peripheral.transactions.len(), 1);
    }

    #[test]
    fn test_failed_chip_select_releases_bus() {
        let wire = shared_wire();
        let link = HardwareSpi::new(WirePeripheral::new(&wire), StuckHighPin);
        let mut chain = ChainInterface::new(link, 1);

        let result = chain.write_register(0, Cmd::SHUTDOWN, 0x01);
        assert!(matches!(result, Err(DisplayError::CSError)));

        let (peripheral, _cs) = chain.release().release();
        assert!(!peripheral.open);
        assert_eq!(peripheral.transactions.len(), 1);
        assert!(wire.borrow().capture.frames().is_empty());
    }
}
