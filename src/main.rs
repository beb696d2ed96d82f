use embedded_graphics::mono_font::{iso_8859_15::FONT_5X8, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use max72xx_matrix::{Max72xx, VirtualChain};

/// Matrices in the simulated chain
const DEVICES: usize = 4;

/// Log what the simulated chips currently light up
fn log_matrix(matrix: &Max72xx<VirtualChain>, title: &str) {
    log::info!("--- {} ---", title);
    for line in matrix.link().render('#', '.') {
        log::info!("{}", line);
    }
}

/// Bar heights as column bytes, bottom row is bit 0
fn bar(height: usize) -> u8 {
    match height {
        0 => 0x00,
        h if h >= 8 => 0xFF,
        h => (1u8 << h) - 1,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Creating driver for {} devices on a virtual chain", DEVICES);
    let mut matrix = Max72xx::new(VirtualChain::new(DEVICES), DEVICES);
    matrix.begin()?;
    log_matrix(&matrix, "after begin");

    // Text drawn into the buffer, nothing is sent until show()
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    Text::with_baseline("Rust", Point::new(3, 0), style, Baseline::Top).draw(&mut matrix)?;
    log::info!(
        "Dirty devices before show: {:?}",
        (0..DEVICES).filter(|&d| matrix.is_dirty(d)).collect::<Vec<_>>()
    );
    matrix.show()?;
    log_matrix(&matrix, "text");

    // Bar meter, one bar per column
    DrawTarget::clear(&mut matrix, BinaryColor::Off)?;
    for x in 0..DEVICES * matrix.max_columns() {
        let height = (x * 3) % 9;
        matrix.set_col(x / 8, x % 8, bar(height))?;
    }
    matrix.show()?;
    log_matrix(&matrix, "bar meter");

    // Frame around the last device only, the others are not resent
    Rectangle::new(Point::new(24, 0), Size::new(8, 8))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(&mut matrix)?;
    let before = matrix.link().wire().frames().len();
    matrix.show()?;
    log::info!(
        "Flush of one device took {} frames",
        matrix.link().wire().frames().len() - before
    );
    log_matrix(&matrix, "frame on last device");

    matrix.test_mode_all(true)?;
    log_matrix(&matrix, "display test");
    matrix.test_mode_all(false)?;

    matrix.set_brightness(0, 255)?;
    let chip = matrix.link().chip(0).map(|c| c.intensity);
    log::info!("Brightness 255 was written as {:?}", chip);

    matrix.clear()?;
    log_matrix(&matrix, "cleared");

    let chain = matrix.release();
    log::info!("Sent {} frames in total", chain.wire().frames().len());
    Ok(())
}
