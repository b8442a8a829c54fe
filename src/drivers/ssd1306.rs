// ECGWatch — SSD1306 OLED Driver
//
// Register-level driver over the shared I2C bus: init sequence, full-frame
// GDDRAM writes in horizontal addressing mode, and an address probe.

use anyhow::anyhow;

use ecgwatch::config::*;
use ecgwatch::screen::PanelBus;

use super::SharedBus;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
const DATA_CHUNK: usize = 16;

const INIT_SEQUENCE: [u8; 25] = [
    0xAE,       // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4,       // resume from RAM
    0xA6,       // normal (not inverted)
    0xAF,       // display on
];

pub struct Ssd1306 {
    bus: SharedBus,
    addr: u8,
}

impl Ssd1306 {
    pub fn new(bus: SharedBus, addr: u8) -> Self {
        Self { bus, addr }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(&INIT_SEQUENCE)?;
        log::info!("SSD1306 initialised at 0x{:02X}", self.addr);
        Ok(())
    }

    fn command(&mut self, cmds: &[u8]) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus poisoned"))?;
        for &cmd in cmds {
            bus.write(self.addr, &[CONTROL_COMMAND, cmd], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

impl PanelBus for Ssd1306 {
    fn write_frame(&mut self, frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()> {
        // columns 0..=127, pages 0..=7
        self.command(&[0x21, 0, (SCREEN_WIDTH - 1) as u8, 0x22, 0, (SCREEN_HEIGHT / 8 - 1) as u8])?;

        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus poisoned"))?;
        let mut packet = [0u8; DATA_CHUNK + 1];
        packet[0] = CONTROL_DATA;
        for chunk in frame.chunks(DATA_CHUNK) {
            packet[1..=chunk.len()].copy_from_slice(chunk);
            bus.write(self.addr, &packet[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

/// Find the panel on the bus. The usual SSD1306 addresses win; otherwise the
/// first device that ACKs; otherwise the configured default.
pub fn scan_for_display(bus: SharedBus) -> u8 {
    let Ok(mut bus) = bus.lock() else {
        return I2C_ADDR_OLED;
    };
    let mut probe = |addr: u8| bus.write(addr, &[CONTROL_COMMAND], I2C_TIMEOUT_TICKS).is_ok();

    for addr in [I2C_ADDR_OLED, I2C_ADDR_OLED_ALT] {
        if probe(addr) {
            return addr;
        }
    }
    match (0x08..0x78).find(|&addr| probe(addr)) {
        Some(addr) => {
            log::warn!(
                "No SSD1306 at 0x{:02X}/0x{:02X}, using device at 0x{:02X}",
                I2C_ADDR_OLED,
                I2C_ADDR_OLED_ALT,
                addr
            );
            addr
        }
        None => {
            log::warn!("No I2C device answered, assuming 0x{:02X}", I2C_ADDR_OLED);
            I2C_ADDR_OLED
        }
    }
}
