// ECGWatch — Presentation throttle
//
// The display and telemetry run at their own cadence, decoupled from the
// 250 Hz sample rate. Only the beat pulse bypasses the throttle: it lights
// as soon as a beat is reported and goes dark after a fixed time, checked on
// every main-cycle iteration.

use crate::config::{EcgConfig, TelemetryCadence};
use crate::display::Display;
use crate::events::{SampleOutcome, Status};
use crate::monitor::EcgMonitor;
use crate::telemetry::{TelemetryLine, TelemetrySink};

/// Fires at most once per interval; the first poll always fires.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl Throttle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    pub fn ready(&mut self, now_ms: u32) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}

/// Tracks how long the beat pulse has been lit.
#[derive(Debug, Clone, Copy)]
pub struct BeatIndicator {
    duration_ms: u32,
    shown_at: Option<u32>,
}

impl BeatIndicator {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            shown_at: None,
        }
    }

    pub fn show(&mut self, now_ms: u32) {
        self.shown_at = Some(now_ms);
    }

    /// True exactly once, on the first poll past the pulse duration.
    pub fn expire(&mut self, now_ms: u32) -> bool {
        match self.shown_at {
            Some(at) if now_ms.wrapping_sub(at) > self.duration_ms => {
                self.shown_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.shown_at.is_some()
    }
}

pub struct Presenter<D: Display, T: TelemetrySink> {
    display: D,
    telemetry: T,
    throttle: Throttle,
    indicator: BeatIndicator,
    cadence: TelemetryCadence,
    // Bar level drawn while the leads are off.
    bar_floor: f32,
}

impl<D: Display, T: TelemetrySink> Presenter<D, T> {
    pub fn new(display: D, telemetry: T, config: &EcgConfig) -> Self {
        Self {
            display,
            telemetry,
            throttle: Throttle::new(config.display_interval_ms),
            indicator: BeatIndicator::new(config.beat_pulse_ms),
            cadence: config.telemetry,
            bar_floor: config.signal_bar_min,
        }
    }

    /// Status outside the steady state (boot progress).
    pub fn set_status(&mut self, status: Status) {
        report(self.display.update_status(status));
        report(self.display.flush());
    }

    /// Call after every main-cycle sample.
    pub fn on_sample<const W: usize, const H: usize>(
        &mut self,
        monitor: &EcgMonitor<W, H>,
        outcome: &SampleOutcome,
        now_ms: u32,
    ) {
        let connected = monitor.is_connected();
        let mut drawn = false;

        if self.indicator.expire(now_ms) {
            report(self.display.clear_beat());
            drawn = true;
        }

        if let (Some(_), true) = (outcome.beat(), connected) {
            report(self.display.show_beat());
            self.indicator.show(now_ms);
            drawn = true;
        }

        if let (SampleOutcome::Processed { sample, .. }, TelemetryCadence::PerSample) =
            (outcome, self.cadence)
        {
            self.emit(TelemetryLine::new(sample.filtered, monitor.bpm(), connected));
        }

        if self.throttle.ready(now_ms) {
            self.tick(monitor);
            drawn = true;
        }

        if drawn {
            report(self.display.flush());
        }
    }

    /// Blank the beat pulse once its time is up. Safe to call between samples.
    pub fn expire_beat(&mut self, now_ms: u32) {
        if self.indicator.expire(now_ms) {
            report(self.display.clear_beat());
            report(self.display.flush());
        }
    }

    fn tick<const W: usize, const H: usize>(&mut self, monitor: &EcgMonitor<W, H>) {
        let connected = monitor.is_connected();
        let filtered = monitor.latest_filtered();

        if connected {
            report(self.display.update_signal_bar(filtered));
            report(self.display.update_status(Status::Connected));
            report(self.display.update_bpm(monitor.bpm()));
        } else {
            report(self.display.update_signal_bar(self.bar_floor));
            report(self.display.update_status(Status::NoLeads));
            report(self.display.update_bpm(0.0));
        }

        if connected && self.cadence == TelemetryCadence::PerTick {
            self.emit(TelemetryLine::new(filtered, monitor.bpm(), connected));
        }
    }

    fn emit(&mut self, line: TelemetryLine) {
        if let Err(e) = self.telemetry.emit(&line) {
            log::warn!("Telemetry write failed: {}", e);
        }
    }

    pub fn indicator(&self) -> &BeatIndicator {
        &self.indicator
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }
}

fn report(result: anyhow::Result<()>) {
    if let Err(e) = result {
        log::error!("Display error: {}", e);
    }
}
