//! Register values and masks

/// Register values and masks used by the MAX7219/MAX7221 driver.
///
/// All constants are documented inline with their respective values.
pub struct Flag;

#[allow(missing_docs)]
impl Flag {
    // Shutdown (0x0C)
    pub const SHUTDOWN_MODE: u8 = 0x00;
    pub const NORMAL_OPERATION: u8 = 0x01;

    // Decode Mode (0x09), only raw matrix data is supported
    pub const NO_DECODE: u8 = 0x00;

    // Display Test (0x0F)
    pub const DISPLAY_TEST_OFF: u8 = 0x00;
    pub const DISPLAY_TEST_ON: u8 = 0x01;

    // Intensity (0x0A) uses D3..D0, 1/32 .. 31/32 duty cycle
    pub const INTENSITY_MASK: u8 = 0x0F;
    pub const INTENSITY_MAX: u8 = 0x0F;

    // Scan Limit (0x0B) uses D2..D0, value 7 scans all 8 digits
    pub const SCAN_LIMIT_MASK: u8 = 0x07;
    pub const SCAN_LIMIT_ALL_DIGITS: u8 = 0x07;

    // Digit registers
    pub const COLUMN_BLANK: u8 = 0x00;
}
