//! Status panel layout.
//!
//! Six left-aligned text rows on a 128×64 monochrome panel:
//!
//! ```text
//!  y=0   " Elap: 1.000h"
//!  y=11  "PmpON: 10.00 m"
//!  y=22  " Duty: 16.67 %"
//!  y=33  "Cycls: 4"
//!  y=44  "  Vol: 64.00 L"
//!  y=55  "Volts: 2.43 V"
//! ```
//!
//! Formatting is kept separate from drawing so the text can be checked
//! without a panel.  Drawing is generic over any embedded-graphics
//! `DrawTarget` with binary colour.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use heapless::String;

use crate::app::events::MetricsSnapshot;

/// Number of text rows.
pub const ROW_COUNT: usize = 6;

/// Top edge of each row, in pixels.
pub const ROW_Y: [i32; ROW_COUNT] = [0, 11, 22, 33, 44, 55];

/// Longest row the layout can produce, with headroom.
pub const ROW_CAPACITY: usize = 24;

pub type Row = String<ROW_CAPACITY>;

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Seconds as hours with three decimals.
pub fn format_hours(secs: f32) -> String<16> {
    let mut s = String::new();
    let _ = write!(s, "{:.3}", secs / 3600.0);
    s
}

/// Seconds as minutes with two decimals.
pub fn format_minutes(secs: f32) -> String<16> {
    let mut s = String::new();
    let _ = write!(s, "{:.2}", secs / 60.0);
    s
}

/// Duty cycle percentage with two decimals and a unit.
pub fn format_duty(percent: f32) -> String<16> {
    let mut s = String::new();
    let _ = write!(s, "{:.2} %", percent);
    s
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// The six status rows for `snap`, top to bottom.
pub fn status_rows(snap: &MetricsSnapshot) -> [Row; ROW_COUNT] {
    let mut rows: [Row; ROW_COUNT] = Default::default();
    let _ = write!(rows[0], " Elap: {}h", format_hours(snap.elapsed_secs));
    let _ = write!(rows[1], "PmpON: {} m", format_minutes(snap.active_secs));
    let _ = write!(rows[2], " Duty: {}", format_duty(snap.duty_cycle_percent));
    let _ = write!(rows[3], "Cycls: {}", snap.pump_cycles);
    let _ = write!(rows[4], "  Vol: {:.2} L", snap.litres);
    let _ = write!(rows[5], "Volts: {:.2} V", snap.voltage);
    rows
}

/// Clear `target` and draw `rows` at [`ROW_Y`].
pub fn draw_status<D>(target: &mut D, rows: &[Row; ROW_COUNT]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    target.clear(BinaryColor::Off)?;
    for (row, y) in rows.iter().zip(ROW_Y) {
        Text::with_baseline(row, Point::new(0, y), style, Baseline::Top).draw(target)?;
    }
    Ok(())
}
