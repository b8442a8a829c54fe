// ECGWatch — Serial telemetry
//
// One CSV line per report: `<filtered:.2>,<bpm:int>,<leads:0|1>`, the format
// the desktop plotter reads from the serial port.

use core::fmt;
use core::str::FromStr;
use std::io::Write;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryLine {
    pub filtered: f32,
    pub bpm: i32,
    pub leads_connected: bool,
}

impl TelemetryLine {
    /// BPM is truncated, not rounded.
    pub fn new(filtered: f32, bpm: f32, leads_connected: bool) -> Self {
        Self {
            filtered,
            bpm: bpm as i32,
            leads_connected,
        }
    }
}

impl fmt::Display for TelemetryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2},{},{}",
            self.filtered,
            self.bpm,
            u8::from(self.leads_connected)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryParseError {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid filtered value {0:?}")]
    Filtered(String),
    #[error("invalid BPM {0:?}")]
    Bpm(String),
    #[error("invalid lead flag {0:?}")]
    LeadFlag(String),
}

impl FromStr for TelemetryLine {
    type Err = TelemetryParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        let [filtered, bpm, leads] = fields.as_slice() else {
            return Err(TelemetryParseError::FieldCount(fields.len()));
        };

        let filtered = filtered
            .parse::<f32>()
            .map_err(|_| TelemetryParseError::Filtered(filtered.to_string()))?;
        let bpm = bpm
            .parse::<i32>()
            .map_err(|_| TelemetryParseError::Bpm(bpm.to_string()))?;
        let leads_connected = match *leads {
            "1" => true,
            "0" => false,
            other => return Err(TelemetryParseError::LeadFlag(other.to_string())),
        };

        Ok(Self {
            filtered,
            bpm,
            leads_connected,
        })
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

pub trait TelemetrySink {
    fn emit(&mut self, line: &TelemetryLine) -> anyhow::Result<()>;
}

/// Writes newline-terminated lines to any byte stream (UART0 via stdout on
/// the device).
pub struct SerialTelemetry<W: Write> {
    out: W,
}

impl<W: Write> SerialTelemetry<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TelemetrySink for SerialTelemetry<W> {
    fn emit(&mut self, line: &TelemetryLine) -> anyhow::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}
