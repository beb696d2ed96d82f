//! MAX7219 / MAX7221 LED Matrix Driver
//!
//! Drives a daisy chain of up to eight 8x8 LED matrix controllers. Each chip
//! owns eight digit registers (one per column) and every bit of a digit
//! register lights one row of that column.
//!
//! ### Usage
//! This driver keeps one buffer for the whole chain. To display something you:
//!
//! 1. create the driver over a transport, either [`bitbang::BitBang`] pins or
//!    a [`hardware::HardwareSpi`] peripheral, and call [`driver::Max72xx::begin`]
//! 1. change LEDs in the buffer with [`driver::Max72xx::set_led`],
//!    [`driver::Max72xx::set_col`] or by drawing with
//!    [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. push the changed devices to the chips with [`driver::Max72xx::show`]
//!
//! Only devices with buffered changes are sent on a flush.
//!
#![deny(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod addressing;
pub mod bitbang;
pub mod buffer;
pub mod capture;
pub mod cmd;
pub mod driver;
pub mod error;
pub mod flag;
pub mod graphics;
pub mod hardware;
pub mod interface;

/// Maximum number of chips in one daisy chain
pub const MAX_DEVICES: usize = 8;

/// Row (segment) lines per chip
pub const ROWS: usize = 8;

/// Column (digit) lines per chip
pub const COLUMNS: usize = 8;

/// Brightness written to every chip by `begin`
pub const DEFAULT_BRIGHTNESS: u8 = 8;

/// Clock rate used by the hardware SPI transport unless changed
pub const DEFAULT_SPI_CLOCK_HZ: u32 = 1_000_000;
