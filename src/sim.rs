// ECGWatch — Synthetic front end
//
// Flat baseline plus a triangular R wave once per beat period, with optional
// pseudo-random noise and scheduled lead-off windows. Drives the host replay
// and the scenario tests; time is set by the caller.

use core::ops::Range;

use crate::config::ADC_FULL_SCALE;
use crate::frontend::FrontEnd;
use crate::leads::LeadLines;

#[derive(Debug, Clone)]
pub struct SyntheticEcg {
    baseline: i32,
    amplitude: i32,
    period_ms: u32,
    pulse_ms: u32,
    noise: i32,
    rng: u32,
    lead_off: Vec<Range<u32>>,
    now_ms: u32,
}

impl SyntheticEcg {
    /// Mid-scale baseline, 300-count R waves 40 ms wide.
    pub fn new(bpm: f32) -> Self {
        Self {
            baseline: ADC_FULL_SCALE / 2,
            amplitude: 300,
            period_ms: (60_000.0 / bpm.max(1.0)) as u32,
            pulse_ms: 40,
            noise: 0,
            rng: 0x2545_F491,
            lead_off: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn with_baseline(mut self, baseline: i32) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_amplitude(mut self, amplitude: i32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_pulse_ms(mut self, pulse_ms: u32) -> Self {
        self.pulse_ms = pulse_ms.max(1);
        self
    }

    /// Uniform noise in `-noise..=noise` counts.
    pub fn with_noise(mut self, noise: i32) -> Self {
        self.noise = noise.abs();
        self
    }

    /// Report both leads off while `now_ms` is inside `window`.
    pub fn with_lead_off(mut self, window: Range<u32>) -> Self {
        self.lead_off.push(window);
        self
    }

    pub fn set_time(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Noise-free signal at `t_ms`.
    pub fn clean_value(&self, t_ms: u32) -> i32 {
        let phase = t_ms % self.period_ms.max(1);
        if phase >= self.pulse_ms {
            return self.baseline;
        }
        let half = self.pulse_ms as f32 / 2.0;
        let rise = 1.0 - ((phase as f32 - half).abs() / half);
        self.baseline + (self.amplitude as f32 * rise) as i32
    }

    fn next_noise(&mut self) -> i32 {
        if self.noise == 0 {
            return 0;
        }
        // xorshift32
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 17;
        self.rng ^= self.rng << 5;
        let span = (2 * self.noise + 1) as u32;
        (self.rng % span) as i32 - self.noise
    }
}

impl FrontEnd for SyntheticEcg {
    fn lead_lines(&mut self) -> LeadLines {
        if self.lead_off.iter().any(|w| w.contains(&self.now_ms)) {
            LeadLines::OFF
        } else {
            LeadLines::SEATED
        }
    }

    fn read_ecg(&mut self) -> anyhow::Result<i32> {
        let value = self.clean_value(self.now_ms) + self.next_noise();
        Ok(value.clamp(0, ADC_FULL_SCALE))
    }
}
