//! Host-side chain links
//!
//! [`WireCapture`] records every framed transaction byte by byte.
//! [`VirtualChain`] additionally replays those frames into simulated chip
//! registers, the way a real chain latches them when chip select rises.

use crate::max72xx::addressing::row_mask;
use crate::max72xx::interface::ByteLink;
use crate::max72xx::{cmd::Cmd, flag::Flag, COLUMNS, ROWS};
use display_interface::DisplayError;

/// Records the bytes of every frame sent over the link.
#[derive(Debug, Default, Clone)]
pub struct WireCapture {
    frames: Vec<Vec<u8>>,
    current: Option<Vec<u8>>,
    setups: usize,
    shifts_left: Option<usize>,
}

impl WireCapture {
    /// Empty capture, deselected
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed frames in the order they were sent
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Completed frames split into (opcode, data) pairs
    pub fn pairs(&self) -> Vec<Vec<(u8, u8)>> {
        self.frames
            .iter()
            .map(|frame| frame.chunks(2).map(|p| (p[0], *p.get(1).unwrap_or(&0))).collect())
            .collect()
    }

    /// Drain the completed frames
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.frames)
    }

    /// Chip select is currently held low
    pub fn is_selected(&self) -> bool {
        self.current.is_some()
    }

    /// How many times the link was set up
    pub fn setup_count(&self) -> usize {
        self.setups
    }

    /// Fail every shift after `shifts` more bytes were accepted
    pub fn fail_after(&mut self, shifts: usize) {
        self.shifts_left = Some(shifts);
    }
}

impl ByteLink for WireCapture {
    fn setup(&mut self) -> Result<(), DisplayError> {
        self.setups += 1;
        Ok(())
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        if self.current.is_some() {
            return Err(DisplayError::CSError);
        }
        self.current = Some(Vec::new());
        Ok(())
    }

    fn shift_out(&mut self, byte: u8) -> Result<(), DisplayError> {
        if let Some(left) = self.shifts_left.as_mut() {
            if *left == 0 {
                return Err(DisplayError::BusWriteError);
            }
            *left -= 1;
        }
        match self.current.as_mut() {
            Some(frame) => {
                frame.push(byte);
                Ok(())
            }
            None => Err(DisplayError::BusWriteError),
        }
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        let frame = self.current.take().ok_or(DisplayError::CSError)?;
        self.frames.push(frame);
        Ok(())
    }
}

/// Register state of one simulated chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipState {
    /// Digit registers, one per column
    pub digits: [u8; COLUMNS],
    /// Decode mode register
    pub decode_mode: u8,
    /// Intensity, 0..=15
    pub intensity: u8,
    /// Highest scanned digit, 0..=7
    pub scan_limit: u8,
    /// Chip is in shutdown mode
    pub shutdown: bool,
    /// Display test lights every LED
    pub display_test: bool,
}

impl Default for ChipState {
    /// Power-on state: shut down, first digit scanned only, minimum intensity.
    fn default() -> Self {
        ChipState {
            digits: [0; COLUMNS],
            decode_mode: Flag::NO_DECODE,
            intensity: 0,
            scan_limit: 0,
            shutdown: true,
            display_test: false,
        }
    }
}

impl ChipState {
    /// Latch one register write
    pub fn latch(&mut self, opcode: u8, data: u8) {
        if let Some(col) = Cmd::column_of(opcode) {
            self.digits[col] = data;
            return;
        }
        match opcode {
            Cmd::NOOP => {}
            Cmd::DECODE_MODE => self.decode_mode = data,
            Cmd::INTENSITY => self.intensity = data & Flag::INTENSITY_MASK,
            Cmd::SCAN_LIMIT => self.scan_limit = data & Flag::SCAN_LIMIT_MASK,
            Cmd::SHUTDOWN => self.shutdown = data & 0x01 == Flag::SHUTDOWN_MODE,
            Cmd::DISPLAY_TEST => self.display_test = data & 0x01 == Flag::DISPLAY_TEST_ON,
            _ => log::debug!("Ignoring write to unknown register 0x{:02X}", opcode),
        }
    }

    /// LED visibly lit, taking shutdown, scan limit and display test into account
    pub fn lit(&self, row: usize, col: usize) -> bool {
        if row >= ROWS || col >= COLUMNS {
            return false;
        }
        if self.display_test {
            return true;
        }
        !self.shutdown && col <= self.scan_limit as usize && self.digits[col] & row_mask(row) != 0
    }
}

/// Simulated chain of chips fed by a [`WireCapture`].
#[derive(Debug, Clone)]
pub struct VirtualChain {
    wire: WireCapture,
    chips: Vec<ChipState>,
}

impl VirtualChain {
    /// Chain of `devices` chips in their power-on state
    pub fn new(devices: usize) -> Self {
        VirtualChain {
            wire: WireCapture::new(),
            chips: vec![ChipState::default(); devices],
        }
    }

    /// Recorded traffic
    pub fn wire(&self) -> &WireCapture {
        &self.wire
    }

    /// Mutable access to the recorded traffic
    pub fn wire_mut(&mut self) -> &mut WireCapture {
        &mut self.wire
    }

    /// All chips, indexed by chain position
    pub fn chips(&self) -> &[ChipState] {
        &self.chips
    }

    /// One chip
    pub fn chip(&self, device: usize) -> Option<&ChipState> {
        self.chips.get(device)
    }

    /// Text picture of the visible LEDs, devices side by side, position 0 left
    pub fn render(&self, on: char, off: char) -> Vec<String> {
        (0..ROWS)
            .map(|row| {
                self.chips
                    .iter()
                    .flat_map(|chip| (0..COLUMNS).map(move |col| chip.lit(row, col)))
                    .map(|lit| if lit { on } else { off })
                    .collect()
            })
            .collect()
    }

    /// The last pair shifted in ends in position 0, the one before in 1, ...
    fn apply(&mut self, frame: &[u8]) {
        if frame.len() != self.chips.len() * 2 {
            log::warn!(
                "Frame of {} bytes on a chain of {} devices",
                frame.len(),
                self.chips.len()
            );
        }
        for (chip, pair) in self.chips.iter_mut().zip(frame.chunks_exact(2).rev()) {
            chip.latch(pair[0], pair[1]);
        }
    }
}

impl ByteLink for VirtualChain {
    fn setup(&mut self) -> Result<(), DisplayError> {
        self.wire.setup()
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        self.wire.select()
    }

    fn shift_out(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.wire.shift_out(byte)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        self.wire.deselect()?;
        if let Some(frame) = self.wire.frames().last().cloned() {
            self.apply(&frame);
        }
        Ok(())
    }
}
