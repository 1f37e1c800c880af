//! OLED display adapter.
//!
//! Implements [`DisplayPort`] for any buffered monochrome panel: each
//! render redraws the full layout into the frame buffer and then pushes
//! the buffer to the panel once.
//!
//! - **`target_os = "espidf"`** — an SSD1306 over I2C in buffered
//!   graphics mode (see [`init_ssd1306`]).
//! - **`not(target_os = "espidf")`** — any in-memory `DrawTarget` used
//!   by tests.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::DrawTarget};

use crate::app::events::MetricsSnapshot;
use crate::app::ports::DisplayPort;
use crate::display::{draw_status, status_rows};
use crate::error::DisplayError;

/// A frame buffer that must be explicitly pushed to the panel.
pub trait FramePresent {
    fn present(&mut self) -> Result<(), DisplayError>;
}

/// Adapter that renders [`MetricsSnapshot`]s onto a buffered panel.
pub struct OledDisplay<D> {
    panel: D,
    frames: u32,
}

impl<D> OledDisplay<D>
where
    D: DrawTarget<Color = BinaryColor> + FramePresent,
{
    pub fn new(panel: D) -> Self {
        Self { panel, frames: 0 }
    }

    /// Frames pushed since construction.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn panel(&self) -> &D {
        &self.panel
    }
}

impl<D> DisplayPort for OledDisplay<D>
where
    D: DrawTarget<Color = BinaryColor> + FramePresent,
{
    fn render(&mut self, snapshot: &MetricsSnapshot) -> Result<(), DisplayError> {
        let rows = status_rows(snapshot);
        draw_status(&mut self.panel, &rows).map_err(|_| DisplayError::BusError)?;
        self.panel.present()?;
        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }
}

// ── SSD1306 (ESP-IDF only) ────────────────────────────────────

#[cfg(target_os = "espidf")]
mod ssd1306_panel {
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use super::FramePresent;
    use crate::error::DisplayError;

    pub type Ssd1306Panel<I2C> = Ssd1306<
        I2CInterface<I2C>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    impl<DI, SIZE> FramePresent for Ssd1306<DI, SIZE, BufferedGraphicsMode<SIZE>>
    where
        DI: WriteOnlyDataCommand,
        SIZE: DisplaySize,
    {
        fn present(&mut self) -> Result<(), DisplayError> {
            self.flush().map_err(|_| DisplayError::BusError)
        }
    }

    /// Bring up a 128×64 SSD1306 at `address` in buffered graphics mode.
    pub fn init_ssd1306<I2C>(i2c: I2C, address: u8) -> Result<Ssd1306Panel<I2C>, DisplayError>
    where
        I2C: embedded_hal::i2c::I2c,
    {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().map_err(|_| DisplayError::NotInitialised)?;
        log::info!("OLED: SSD1306 128x64 ready at 0x{:02X}", address);
        Ok(panel)
    }
}

#[cfg(target_os = "espidf")]
pub use ssd1306_panel::{Ssd1306Panel, init_ssd1306};
