//! `embedded-graphics` support
//!
//! The chain is one strip of `devices * 8` by 8 pixels. Device 0 is on the
//! left, x runs along the columns and y along the rows. Drawing only changes
//! the buffer; call [`Max72xx::show`](crate::max72xx::driver::Max72xx::show)
//! afterwards.
use core::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::max72xx::driver::Max72xx;
use crate::max72xx::{COLUMNS, ROWS};

impl<L> DrawTarget for Max72xx<L> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            // outside the strip is clipped
            let _ = self.set_led(x / COLUMNS, y, x % COLUMNS, color.is_on());
        }
        Ok(())
    }
}

impl<L> OriginDimensions for Max72xx<L> {
    fn size(&self) -> Size {
        Size::new((self.device_count() * COLUMNS) as u32, ROWS as u32)
    }
}
