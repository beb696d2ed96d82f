//! Daisy-chain register protocol over a byte-shifting link
//!
//! The chips of a chain form one long shift register. A register write to a
//! single device is therefore a frame carrying one (opcode, data) pair for
//! every position: the target gets the real pair, every other device a no-op.
//! Pairs are shifted starting with the last position so that each pair ends
//! up latched by the device it was meant for.
use crate::max72xx::{cmd::Cmd, flag::Flag, COLUMNS};
use display_interface::DisplayError;

/// Capability to shift bytes into the chain.
///
/// Implemented by [`crate::max72xx::bitbang::BitBang`] and
/// [`crate::max72xx::hardware::HardwareSpi`]; the chain framing is written
/// once on top of it.
pub trait ByteLink {
    /// Prepare pins or peripheral, leaving the chain deselected
    fn setup(&mut self) -> Result<(), DisplayError>;

    /// Start a frame: acquire the bus and pull chip select low
    fn select(&mut self) -> Result<(), DisplayError>;

    /// Shift one byte, most significant bit first
    fn shift_out(&mut self, byte: u8) -> Result<(), DisplayError>;

    /// End a frame: raise chip select (latching the data) and release the bus
    fn deselect(&mut self) -> Result<(), DisplayError>;
}

impl<L: ByteLink + ?Sized> ByteLink for &mut L {
    fn setup(&mut self) -> Result<(), DisplayError> {
        (**self).setup()
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        (**self).select()
    }

    fn shift_out(&mut self, byte: u8) -> Result<(), DisplayError> {
        (**self).shift_out(byte)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        (**self).deselect()
    }
}

/// One chip-select framed transaction.
///
/// The link is deselected when the frame is closed or dropped, so an error in
/// the middle of a frame still releases the bus.
pub(crate) struct Frame<'a, L: ByteLink + ?Sized> {
    link: &'a mut L,
    open: bool,
}

impl<'a, L: ByteLink + ?Sized> Frame<'a, L> {
    pub(crate) fn open(link: &'a mut L) -> Result<Self, DisplayError> {
        link.select()?;
        Ok(Frame { link, open: true })
    }

    pub(crate) fn shift(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.link.shift_out(byte)
    }

    pub(crate) fn close(mut self) -> Result<(), DisplayError> {
        self.open = false;
        self.link.deselect()
    }
}

impl<L: ByteLink + ?Sized> Drop for Frame<'_, L> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.link.deselect() {
                log::error!("Failed to release chain after aborted frame: {:?}", e);
            }
        }
    }
}

/// Register interface of a whole chain
pub struct ChainInterface<L> {
    /// Byte link to the first chip of the chain
    link: L,
    /// Number of chips, fixed at construction
    devices: usize,
}

impl<L> ChainInterface<L> {
    /// Create the interface, nothing is sent
    pub fn new(link: L, devices: usize) -> Self {
        ChainInterface { link, devices }
    }

    /// Number of chips in the chain
    pub fn devices(&self) -> usize {
        self.devices
    }

    /// Borrow the link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the link
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Give the link back
    pub fn release(self) -> L {
        self.link
    }
}

impl<L: ByteLink> ChainInterface<L> {
    /// Prepare the link for the first frame
    pub(crate) fn setup(&mut self) -> Result<(), DisplayError> {
        self.link.setup()
    }

    /// Write `data` to register `opcode` of device `target`, no-op for all others.
    ///
    /// `target` is not checked here; a target outside the chain produces a
    /// frame of no-ops only.
    pub fn write_register(
        &mut self,
        target: usize,
        opcode: u8,
        data: u8,
    ) -> Result<(), DisplayError> {
        let mut frame = Frame::open(&mut self.link)?;
        for position in (0..self.devices).rev() {
            let (op, value) = if position == target {
                (opcode, data)
            } else {
                (Cmd::NOOP, 0x00)
            };
            if let Err(e) = frame.shift(op).and_then(|_| frame.shift(value)) {
                log::error!(
                    "Shift error writing register 0x{:02X} of device {}: {:?}",
                    opcode,
                    target,
                    e
                );
                return Err(e);
            }
        }
        frame.close()
    }

    /// Write one column byte to device `target`
    pub(crate) fn write_column(
        &mut self,
        target: usize,
        col: usize,
        data: u8,
    ) -> Result<(), DisplayError> {
        self.write_register(target, Cmd::digit(col), data)
    }

    /// Write all eight column bytes of device `target`, one frame each
    pub(crate) fn write_columns(
        &mut self,
        target: usize,
        columns: &[u8; COLUMNS],
    ) -> Result<(), DisplayError> {
        for (col, &data) in columns.iter().enumerate() {
            self.write_column(target, col, data)?;
        }
        Ok(())
    }

    /// Blank all eight digit registers of device `target`
    pub(crate) fn blank(&mut self, target: usize) -> Result<(), DisplayError> {
        self.write_columns(target, &[Flag::COLUMN_BLANK; COLUMNS])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::max72xx::capture::WireCapture;

    #[test]
    fn test_three_device_intensity_frame() {
        let mut chain = ChainInterface::new(WireCapture::new(), 3);
        chain.write_register(1, Cmd::INTENSITY, 0x08).unwrap();

        let wire = chain.release();
        assert_eq!(wire.frames(), &[vec![0x00, 0x00, 0x0A, 0x08, 0x00, 0x00]]);
        assert!(!wire.is_selected());
    }

    #[test]
    fn test_last_position_is_shifted_first() {
        let mut chain = ChainInterface::new(WireCapture::new(), 4);
        chain.write_register(3, Cmd::SHUTDOWN, 0x01).unwrap();
        chain.write_register(0, Cmd::SHUTDOWN, 0x01).unwrap();

        let wire = chain.release();
        assert_eq!(wire.frames()[0], vec![0x0C, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(wire.frames()[1], vec![0, 0, 0, 0, 0, 0, 0x0C, 0x01]);
    }

    #[test]
    fn test_write_columns_sends_one_frame_per_digit() {
        let mut chain = ChainInterface::new(WireCapture::new(), 1);
        let columns = [1, 2, 3, 4, 5, 6, 7, 8];
        chain.write_columns(0, &columns).unwrap();

        let wire = chain.release();
        assert_eq!(wire.frames().len(), COLUMNS);
        for (col, frame) in wire.frames().iter().enumerate() {
            assert_eq!(frame, &vec![Cmd::digit(col), columns[col]]);
        }
    }

    #[test]
    fn test_failed_shift_still_deselects() {
        let mut wire = WireCapture::new();
        wire.fail_after(3);
        let mut chain = ChainInterface::new(wire, 2);

        let result = chain.write_register(0, Cmd::INTENSITY, 0x0F);
        assert!(matches!(result, Err(DisplayError::BusWriteError)));

        // chip select is raised on the partial frame
        let wire = chain.release();
        assert!(!wire.is_selected());
        assert_eq!(wire.frames(), &[vec![0x00, 0x00, 0x0A]]);
    }
}
