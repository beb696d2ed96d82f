//! Chain framebuffer
//!
//! One [`DeviceFrame`] per chip in the chain, holding the eight column bytes
//! and the dirty flag together so they cannot drift apart.

use crate::max72xx::addressing::{locate, row_mask};
use crate::max72xx::error::{Error, Result};
use crate::max72xx::{COLUMNS, ROWS};

/// Buffered content of one chip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceFrame {
    /// One byte per digit line, bit 7 is row 0
    pub columns: [u8; COLUMNS],
    /// Buffer differs from what the chip last received
    pub dirty: bool,
}

impl DeviceFrame {
    /// Store `value` in column `col`, marking the frame dirty when it changes.
    fn store(&mut self, col: usize, value: u8) {
        if self.columns[col] != value {
            self.columns[col] = value;
            self.dirty = true;
        }
    }
}

/// Buffer for every device of a chain, indexed by chain position.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    devices: Vec<DeviceFrame>,
}

impl FrameBuffer {
    /// Zeroed buffer for `device_count` chips, nothing marked dirty.
    pub fn new(device_count: usize) -> Self {
        FrameBuffer {
            devices: vec![DeviceFrame::default(); device_count],
        }
    }

    /// Number of devices covered by this buffer
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Flat length in bytes, always `device_count * 8`
    pub fn len(&self) -> usize {
        self.devices.len() * COLUMNS
    }

    /// True when the buffer covers no device (never the case for a driver)
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Frame of one device
    pub fn device(&self, device: usize) -> Option<&DeviceFrame> {
        self.devices.get(device)
    }

    fn device_mut(&mut self, device: usize) -> Result<&mut DeviceFrame> {
        self.devices.get_mut(device).ok_or(Error::OutOfRange)
    }

    /// Byte at a flat buffer offset
    pub fn byte(&self, offset: usize) -> Option<u8> {
        let (device, col) = locate(offset);
        self.devices.get(device).map(|frame| frame.columns[col])
    }

    /// Set or clear a single LED.
    pub fn set_led(&mut self, device: usize, row: usize, col: usize, state: bool) -> Result<()> {
        if row >= ROWS || col >= COLUMNS {
            return Err(Error::OutOfRange);
        }
        let frame = self.device_mut(device)?;
        let mask = row_mask(row);
        let value = if state {
            frame.columns[col] | mask
        } else {
            frame.columns[col] & !mask
        };
        frame.store(col, value);
        Ok(())
    }

    /// Buffered state of a single LED, false when out of range.
    pub fn led(&self, device: usize, row: usize, col: usize) -> bool {
        if row >= ROWS || col >= COLUMNS {
            return false;
        }
        self.devices
            .get(device)
            .map_or(false, |frame| frame.columns[col] & row_mask(row) != 0)
    }

    /// Replace a whole column.
    pub fn set_col(&mut self, device: usize, col: usize, value: u8) -> Result<()> {
        if col >= COLUMNS {
            return Err(Error::OutOfRange);
        }
        self.device_mut(device)?.store(col, value);
        Ok(())
    }

    /// Buffered column byte
    pub fn col(&self, device: usize, col: usize) -> Option<u8> {
        if col >= COLUMNS {
            return None;
        }
        self.devices.get(device).map(|frame| frame.columns[col])
    }

    /// Replace a whole row across the eight columns, bit 7 of `value` is column 0.
    pub fn set_row(&mut self, device: usize, row: usize, value: u8) -> Result<()> {
        if row >= ROWS {
            return Err(Error::OutOfRange);
        }
        let frame = self.device_mut(device)?;
        let mask = row_mask(row);
        for col in 0..COLUMNS {
            let lit = value & (0x80 >> col) != 0;
            let byte = if lit {
                frame.columns[col] | mask
            } else {
                frame.columns[col] & !mask
            };
            frame.store(col, byte);
        }
        Ok(())
    }

    /// Zero all columns of a device and mark it dirty.
    pub fn clear_device(&mut self, device: usize) -> Result<()> {
        let frame = self.device_mut(device)?;
        frame.columns = [0; COLUMNS];
        frame.dirty = true;
        Ok(())
    }

    /// Dirty flag of a device, false when out of range
    pub fn is_dirty(&self, device: usize) -> bool {
        self.devices.get(device).map_or(false, |frame| frame.dirty)
    }

    /// Forget pending changes after the device was flushed.
    pub fn mark_clean(&mut self, device: usize) {
        if let Some(frame) = self.devices.get_mut(device) {
            frame.dirty = false;
        }
    }

    /// Copy of the column bytes of a device
    pub fn columns(&self, device: usize) -> Option<[u8; COLUMNS]> {
        self.devices.get(device).map(|frame| frame.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_zeroed_and_clean() {
        let buffer = FrameBuffer::new(3);
        assert_eq!(buffer.len(), 24);
        assert_eq!(buffer.device_count(), 3);
        for offset in 0..buffer.len() {
            assert_eq!(buffer.byte(offset), Some(0));
        }
        assert!((0..3).all(|d| !buffer.is_dirty(d)));
        assert_eq!(buffer.byte(24), None);
    }

    #[test]
    fn test_set_led_round_trip_every_cell() {
        let mut buffer = FrameBuffer::new(2);
        for device in 0..2 {
            for row in 0..ROWS {
                for col in 0..COLUMNS {
                    buffer.set_led(device, row, col, true).unwrap();
                    assert!(buffer.led(device, row, col));
                    buffer.set_led(device, row, col, false).unwrap();
                    assert!(!buffer.led(device, row, col));
                }
            }
        }
    }

    #[test]
    fn test_row_zero_sets_most_significant_bit() {
        let mut buffer = FrameBuffer::new(1);
        buffer.set_led(0, 0, 0, true).unwrap();
        assert_eq!(buffer.col(0, 0), Some(0x80));
        assert_eq!(buffer.byte(0), Some(0x80));
    }

    #[test]
    fn test_out_of_range_is_rejected_without_mutation() {
        let mut buffer = FrameBuffer::new(2);
        assert_eq!(buffer.set_led(2, 0, 0, true), Err(Error::OutOfRange));
        assert_eq!(buffer.set_led(0, 8, 0, true), Err(Error::OutOfRange));
        assert_eq!(buffer.set_led(0, 0, 8, true), Err(Error::OutOfRange));
        assert_eq!(buffer.set_col(0, 8, 0xFF), Err(Error::OutOfRange));
        assert_eq!(buffer.set_row(5, 0, 0xFF), Err(Error::OutOfRange));

        assert!((0..buffer.len()).all(|o| buffer.byte(o) == Some(0)));
        assert!(!buffer.is_dirty(0));
        assert!(!buffer.is_dirty(1));
        assert!(!buffer.led(2, 0, 0));
        assert!(!buffer.led(0, 8, 0));
        assert!(!buffer.led(0, 0, 8));
    }

    #[test]
    fn test_idempotent_write_does_not_dirty() {
        let mut buffer = FrameBuffer::new(1);
        buffer.set_led(0, 4, 2, true).unwrap();
        assert!(buffer.is_dirty(0));

        buffer.mark_clean(0);
        buffer.set_led(0, 4, 2, true).unwrap();
        assert!(!buffer.is_dirty(0));

        buffer.set_col(0, 2, 0b0000_1000).unwrap();
        assert!(!buffer.is_dirty(0));

        buffer.set_led(0, 0, 0, false).unwrap();
        assert!(!buffer.is_dirty(0));
    }

    #[test]
    fn test_set_row_spreads_over_columns() {
        let mut buffer = FrameBuffer::new(1);
        buffer.set_row(0, 1, 0b1000_0001).unwrap();
        assert_eq!(buffer.col(0, 0), Some(0b0100_0000));
        assert_eq!(buffer.col(0, 7), Some(0b0100_0000));
        assert!((1..7).all(|c| buffer.col(0, c) == Some(0)));
        assert!(buffer.led(0, 1, 0));
        assert!(!buffer.led(0, 1, 1));
    }

    #[test]
    fn test_clear_device_leaves_neighbours() {
        let mut buffer = FrameBuffer::new(3);
        for device in 0..3 {
            for col in 0..COLUMNS {
                buffer.set_col(device, col, 0xA5).unwrap();
            }
            buffer.mark_clean(device);
        }

        buffer.clear_device(1).unwrap();

        assert_eq!(buffer.columns(1), Some([0; COLUMNS]));
        assert_eq!(buffer.columns(0), Some([0xA5; COLUMNS]));
        assert_eq!(buffer.columns(2), Some([0xA5; COLUMNS]));
        assert!(buffer.is_dirty(1));
        assert!(!buffer.is_dirty(0));
        assert!(!buffer.is_dirty(2));
    }
}
