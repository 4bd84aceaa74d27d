use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use u8g2_fonts::U8g2TextStyle;

use crate::app::ConnectionCounters;

pub type ColorFormat = BinaryColor;

const CURRENT_LINE: Point = Point::new(0, 0);
const TOTAL_LINE: Point = Point::new(0, 12);
const SCROLL_LINE_Y: i32 = 24;

pub trait DisplayTargetDrive: DrawTarget<Color = ColorFormat> {
    fn flush(&mut self) -> anyhow::Result<()>;

    fn width(&self) -> i32 {
        self.bounding_box().size.width as i32
    }
}

fn text_style() -> U8g2TextStyle<ColorFormat> {
    // 6 px advance, the marquee bound assumes it
    U8g2TextStyle::new(u8g2_fonts::fonts::u8g2_font_6x10_tf, ColorFormat::On)
}

fn draw_line<D: DisplayTargetDrive>(
    display: &mut D,
    text: &str,
    position: Point,
    style: &U8g2TextStyle<ColorFormat>,
) -> anyhow::Result<()> {
    Text::with_baseline(text, position, style.clone(), Baseline::Top)
        .draw(display)
        .map_err(|_| anyhow::anyhow!("Failed to draw text at {:?}", position))?;
    Ok(())
}

/// Draws one frame: both counters and the marquee at `cursor_x`, then flushes.
pub fn render<D: DisplayTargetDrive>(
    display: &mut D,
    counters: &ConnectionCounters,
    scroll_text: &str,
    cursor_x: i32,
) -> anyhow::Result<()> {
    display
        .clear(ColorFormat::Off)
        .map_err(|_| anyhow::anyhow!("Failed to clear display"))?;

    let style = text_style();
    draw_line(
        display,
        &format!("Current cons: {}", counters.current()),
        CURRENT_LINE,
        &style,
    )?;
    draw_line(
        display,
        &format!("Total cons: {}", counters.total()),
        TOTAL_LINE,
        &style,
    )?;

    if !scroll_text.is_empty() {
        draw_line(
            display,
            scroll_text,
            Point::new(cursor_x, SCROLL_LINE_Y),
            &style,
        )?;
    }

    display.flush()
}
