// ECGWatch — Hardware & System Configuration
// Target: ESP32 DevKit + AD8232 single-lead ECG front end + SSD1306 OLED

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_ECG_OUTPUT: i32 = 34;  // ADC1_CH6 — AD8232 OUTPUT (analog)
pub const PIN_LEAD_OFF_PLUS: i32 = 13;  // LO+ — HIGH when the + electrode is off
pub const PIN_LEAD_OFF_MINUS: i32 = 12; // LO- — HIGH when the - electrode is off
pub const PIN_I2C_SDA: i32 = 21;
pub const PIN_I2C_SCL: i32 = 22;

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_ADDR_OLED_ALT: u8 = 0x3D;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_UI: usize = 8192;

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------
pub const SAMPLE_RATE_HZ: u32 = 250;
pub const SAMPLE_INTERVAL_US: u32 = 1_000_000 / SAMPLE_RATE_HZ; // 4000 µs
pub const SAMPLE_INTERVAL_MS: u32 = SAMPLE_INTERVAL_US / 1000;
pub const ADC_FULL_SCALE: i32 = 4095; // 12-bit
pub const ADC_ECG_CHANNEL: u32 = 6;   // ADC1_CH6 = GPIO34

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------
pub const DC_ALPHA: f32 = 0.995;
pub const MA_WINDOW: usize = 5;
pub const HISTORY_CAPACITY: usize = SAMPLE_RATE_HZ as usize; // 1 second

// ---------------------------------------------------------------------------
// Beat Detection
// ---------------------------------------------------------------------------
pub const BEAT_THRESHOLD: f32 = 40.0;  // ADC counts above baseline
pub const REFRACTORY_MS: u32 = 250;

// ---------------------------------------------------------------------------
// Presentation (milliseconds)
// ---------------------------------------------------------------------------
pub const DISPLAY_UPDATE_INTERVAL_MS: u32 = 100;
pub const BEAT_PULSE_MS: u32 = 100;
pub const SIGNAL_BAR_MIN: f32 = -400.0;
pub const SIGNAL_BAR_MAX: f32 = 400.0;
pub const SIGNAL_BAR_SEGMENTS: u8 = 10;

// ---------------------------------------------------------------------------
// Runtime-tunable parameters
// ---------------------------------------------------------------------------

/// When a telemetry line is written to the serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TelemetryCadence {
    /// Once per presentation tick.
    #[default]
    PerTick,
    /// Once per accepted sample (full-rate stream for a plotter).
    PerSample,
}

/// Numeric parameters of the pipeline. `Default` mirrors the constants above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcgConfig {
    pub dc_alpha: f32,
    pub beat_threshold: f32,
    pub refractory_ms: u32,
    pub display_interval_ms: u32,
    pub beat_pulse_ms: u32,
    pub signal_bar_min: f32,
    pub signal_bar_max: f32,
    pub signal_bar_segments: u8,
    pub telemetry: TelemetryCadence,
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            dc_alpha: DC_ALPHA,
            beat_threshold: BEAT_THRESHOLD,
            refractory_ms: REFRACTORY_MS,
            display_interval_ms: DISPLAY_UPDATE_INTERVAL_MS,
            beat_pulse_ms: BEAT_PULSE_MS,
            signal_bar_min: SIGNAL_BAR_MIN,
            signal_bar_max: SIGNAL_BAR_MAX,
            signal_bar_segments: SIGNAL_BAR_SEGMENTS,
            telemetry: TelemetryCadence::default(),
        }
    }
}
