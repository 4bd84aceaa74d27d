//! Board bring-up for the SSD1306 panel

use esp_idf_svc::hal::{
    gpio::{InputPin, OutputPin},
    i2c::{I2c, I2cDriver},
    peripheral::Peripheral,
    units::Hertz,
};
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

use crate::{config::DisplayConfig, ui::DisplayTargetDrive};

pub type Oled = Ssd1306<
    I2CInterface<I2cDriver<'static>>,
    DisplaySize128x32,
    BufferedGraphicsMode<DisplaySize128x32>,
>;

impl DisplayTargetDrive for Oled {
    fn flush(&mut self) -> anyhow::Result<()> {
        Ssd1306::flush(self).map_err(|e| anyhow::anyhow!("Failed to flush display: {:?}", e))
    }
}

pub fn init_oled<I2C: I2c>(
    i2c: impl Peripheral<P = I2C> + 'static,
    sda: impl Peripheral<P = impl InputPin + OutputPin> + 'static,
    scl: impl Peripheral<P = impl InputPin + OutputPin> + 'static,
    config: &DisplayConfig,
) -> anyhow::Result<Oled> {
    let i2c_config =
        esp_idf_svc::hal::i2c::config::Config::default().baudrate(Hertz(config.i2c_baudrate));
    let i2c_d = I2cDriver::new(i2c, sda, scl, &i2c_config)?;

    let interface = I2CDisplayInterface::new_custom_address(i2c_d, config.i2c_address);
    let mut display = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();

    display
        .init()
        .map_err(|e| anyhow::anyhow!("SSD1306 init failed: {:?}", e))?;
    log::info!(
        "SSD1306 {}x{} ready at {:#04x}",
        config.width,
        config.height,
        config.i2c_address
    );

    Ok(display)
}
