//! Mapping between logical LED coordinates and the chip's column-major layout
//!
//! Each chip stores one byte per column (digit line). Row 0 is the most
//! significant bit of that byte, row 7 the least significant.
//!
//! These are pure helpers without bounds checks, callers validate indexes.

use crate::max72xx::COLUMNS;

/// Single bit mask selecting `row` inside a column byte.
#[inline]
pub const fn row_mask(row: usize) -> u8 {
    1 << (7 - row)
}

/// Row encoded by bit `bit` (0 = least significant) of a column byte.
#[inline]
pub const fn row_of_bit(bit: usize) -> usize {
    7 - bit
}

/// Offset of (`device`, `col`) in the flat chain buffer.
#[inline]
pub const fn offset(device: usize, col: usize) -> usize {
    device * COLUMNS + col
}

/// Inverse of [`offset`]: the (device, column) pair stored at `offset`.
#[inline]
pub const fn locate(offset: usize) -> (usize, usize) {
    (offset / COLUMNS, offset % COLUMNS)
}
