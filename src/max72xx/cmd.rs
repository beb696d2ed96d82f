//! Register addresses of the MAX7219/MAX7221

/// Register addresses of the MAX7219/MAX7221.
///
/// Every transfer to a chip is one address byte followed by one data byte.
pub struct Cmd;

#[allow(missing_docs)]
impl Cmd {
    pub const NOOP: u8 = 0x00;

    // Digit registers, one per matrix column
    pub const DIGIT0: u8 = 0x01;
    pub const DIGIT1: u8 = 0x02;
    pub const DIGIT2: u8 = 0x03;
    pub const DIGIT3: u8 = 0x04;
    pub const DIGIT4: u8 = 0x05;
    pub const DIGIT5: u8 = 0x06;
    pub const DIGIT6: u8 = 0x07;
    pub const DIGIT7: u8 = 0x08;

    // Control
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;

    /// Digit register for column `col`. Caller keeps `col` below 8.
    pub const fn digit(col: usize) -> u8 {
        Self::DIGIT0 + col as u8
    }

    /// Column addressed by a digit register, `None` for control registers.
    pub const fn column_of(opcode: u8) -> Option<usize> {
        if opcode >= Self::DIGIT0 && opcode <= Self::DIGIT7 {
            Some((opcode - Self::DIGIT0) as usize)
        } else {
            None
        }
    }
}

/*
Datasheet register map (Table 2):
0x00 - No-Op
0x01..0x08 - Digit 0..7
0x09 - Decode Mode
0x0A - Intensity
0x0B - Scan Limit
0x0C - Shutdown
0x0F - Display Test
*/
