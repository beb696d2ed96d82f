//! Buffered driver for daisy-chained MAX7219/MAX7221 8x8 LED matrices.
//!
//! See [`max72xx`] for usage.

pub mod max72xx;

pub use crate::max72xx::bitbang::BitBang;
pub use crate::max72xx::capture::{VirtualChain, WireCapture};
pub use crate::max72xx::cmd::Cmd;
pub use crate::max72xx::driver::{Max72xx, Max72xxHard, Max72xxSoft};
pub use crate::max72xx::error::{DisplayError, Error, Result};
pub use crate::max72xx::flag::Flag;
pub use crate::max72xx::hardware::{BusPeripheral, HardwareSpi, SpiPeripheral, SpiSettings};
pub use crate::max72xx::interface::{ByteLink, ChainInterface};
