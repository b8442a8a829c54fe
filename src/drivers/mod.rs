use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

pub mod ad8232;
pub mod ssd1306;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;
