// ECGWatch — Status screen renderer
//
// Four text rows on the 128x64 OLED, drawn with embedded-graphics into a
// page-ordered frame buffer (the SSD1306 GDDRAM layout) and pushed to the
// panel in one transfer per flush.
//
//   ECG Monitor
//   BPM: 72         ♥
//   Status: Connected
//   Signal: [=====.....]

use embedded_graphics::{
    image::{Image, ImageRaw},
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::config::*;
use crate::display::{bpm_text, signal_segments, Display};
use crate::events::Status;

const CHAR_W: i32 = 6;
const ROW_H: i32 = 16;
const ROW_PAD: i32 = 3;

const COL_VALUE_BPM: i32 = 5;
const COL_HEART: i32 = 16;
const COL_VALUE_STATUS: i32 = 8;
const COL_VALUE_SIGNAL: i32 = 8;
const STATUS_FIELD_CHARS: u32 = 13;

const HEART: [u8; 8] = [
    0b0000_0000,
    0b0110_0110,
    0b1111_1111,
    0b1111_1111,
    0b0111_1110,
    0b0011_1100,
    0b0001_1000,
    0b0000_0000,
];

/// Transport for a full frame.
pub trait PanelBus {
    fn write_frame(&mut self, frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Frame buffer
// ---------------------------------------------------------------------------

pub struct FrameBuffer {
    bytes: [u8; DISPLAY_BUFFER_SIZE],
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn bytes(&self) -> &[u8; DISPLAY_BUFFER_SIZE] {
        &self.bytes
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        self.bytes[idx] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, point: Point, on: bool) {
        let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
            return;
        };
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        let mask = 1 << (y % 8);
        if on {
            self.bytes[idx] |= mask;
        } else {
            self.bytes[idx] &= !mask;
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color.is_on());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

pub struct Screen<B: PanelBus> {
    bus: B,
    frame: FrameBuffer,
    dirty: bool,
    bar_min: f32,
    bar_max: f32,
    bar_segments: u8,
    // What is currently drawn, to skip identical redraws.
    shown_status: Option<Status>,
    shown_bpm: Option<heapless::String<8>>,
    shown_segments: Option<u8>,
    beat_lit: bool,
}

impl<B: PanelBus> Screen<B> {
    pub fn new(bus: B, config: &EcgConfig) -> Self {
        Self {
            bus,
            frame: FrameBuffer::new(),
            dirty: false,
            bar_min: config.signal_bar_min,
            bar_max: config.signal_bar_max,
            bar_segments: config.signal_bar_segments,
            shown_status: None,
            shown_bpm: None,
            shown_segments: None,
            beat_lit: false,
        }
    }

    /// Title, placeholders and `Starting...`, flushed immediately.
    pub fn show_boot_screen(&mut self) -> anyhow::Result<()> {
        self.clear_rect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);
        self.draw_text(0, 0, "ECG Monitor");
        self.draw_text(0, 1, "BPM:");
        self.draw_text(0, 2, "Status:");
        self.draw_text(0, 3, "Signal:");
        self.shown_status = None;
        self.shown_bpm = None;
        self.shown_segments = None;
        self.beat_lit = false;

        self.update_bpm(0.0)?;
        self.update_status(Status::Starting)?;
        self.update_signal_bar(self.bar_min)?;
        self.flush()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn is_beat_lit(&self) -> bool {
        self.beat_lit
    }

    fn draw_text(&mut self, col: i32, row: i32, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let origin = Point::new(col * CHAR_W, row * ROW_H + ROW_PAD);
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.frame);
        self.dirty = true;
    }

    fn clear_cells(&mut self, col: i32, row: i32, chars: u32) {
        self.clear_rect(col * CHAR_W, row * ROW_H, chars * CHAR_W as u32, ROW_H as u32);
    }

    fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.frame);
        self.dirty = true;
    }

    fn heart_origin() -> Point {
        Point::new(COL_HEART * CHAR_W, ROW_H + ROW_PAD)
    }
}

impl<B: PanelBus> Display for Screen<B> {
    fn update_status(&mut self, status: Status) -> anyhow::Result<()> {
        if self.shown_status == Some(status) {
            return Ok(());
        }
        self.clear_cells(COL_VALUE_STATUS, 2, STATUS_FIELD_CHARS);
        self.draw_text(COL_VALUE_STATUS, 2, status.text());
        self.shown_status = Some(status);
        Ok(())
    }

    fn update_bpm(&mut self, bpm: f32) -> anyhow::Result<()> {
        let text = bpm_text(bpm);
        if self.shown_bpm.as_ref() == Some(&text) {
            return Ok(());
        }
        self.clear_cells(COL_VALUE_BPM, 1, 3);
        self.draw_text(COL_VALUE_BPM, 1, &text);
        self.shown_bpm = Some(text);
        Ok(())
    }

    fn update_signal_bar(&mut self, filtered: f32) -> anyhow::Result<()> {
        let lit = signal_segments(filtered, self.bar_min, self.bar_max, self.bar_segments);
        if self.shown_segments == Some(lit) {
            return Ok(());
        }

        let mut bar: heapless::String<32> = heapless::String::new();
        let _ = bar.push('[');
        for i in 0..self.bar_segments {
            let _ = bar.push(if i < lit { '=' } else { '.' });
        }
        let _ = bar.push(']');

        self.clear_cells(COL_VALUE_SIGNAL, 3, u32::from(self.bar_segments) + 2);
        self.draw_text(COL_VALUE_SIGNAL, 3, &bar);
        self.shown_segments = Some(lit);
        Ok(())
    }

    fn show_beat(&mut self) -> anyhow::Result<()> {
        let raw = ImageRaw::<BinaryColor>::new(&HEART, 8);
        let _ = Image::new(&raw, Self::heart_origin()).draw(&mut self.frame);
        self.beat_lit = true;
        self.dirty = true;
        Ok(())
    }

    fn clear_beat(&mut self) -> anyhow::Result<()> {
        let origin = Self::heart_origin();
        self.clear_rect(origin.x, origin.y, 8, 8);
        self.beat_lit = false;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.bus.write_frame(self.frame.bytes())?;
        self.dirty = false;
        Ok(())
    }
}
