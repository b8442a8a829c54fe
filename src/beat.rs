// ECGWatch — Beat Detector
//
// Threshold with hysteresis and a refractory gate:
//
//   lp > T, refractory elapsed, not in beat  → enter beat (maybe report BPM)
//   lp < T/2                                 → leave beat
//   otherwise                                → unchanged

use crate::config::{BEAT_THRESHOLD, REFRACTORY_MS};
use crate::events::{BeatEvent, BeatState};

#[derive(Debug, Clone)]
pub struct BeatDetector {
    threshold: f32,
    refractory_ms: u32,
    state: BeatState,
}

impl BeatDetector {
    pub fn new(threshold: f32, refractory_ms: u32) -> Self {
        Self {
            threshold,
            refractory_ms,
            state: BeatState::default(),
        }
    }

    /// Feed one filtered value. Returns an event only for crossings that have
    /// a previous beat to measure the interval against.
    pub fn detect(&mut self, lp: f32, now_ms: u32) -> Option<BeatEvent> {
        let since_last = now_ms.wrapping_sub(self.state.last_beat_ms);

        if lp > self.threshold && since_last > self.refractory_ms && !self.state.in_beat {
            self.state.in_beat = true;
            let event = if self.state.last_beat_ms != 0 {
                self.state.bpm = 60_000.0 / since_last as f32;
                log::debug!("Beat: {:.1} BPM ({} ms)", self.state.bpm, since_last);
                Some(BeatEvent {
                    bpm: self.state.bpm,
                    at_ms: now_ms,
                })
            } else {
                None
            };
            self.state.last_beat_ms = now_ms;
            event
        } else {
            if lp < self.threshold / 2.0 {
                self.state.in_beat = false;
            }
            None
        }
    }

    pub fn state(&self) -> &BeatState {
        &self.state
    }

    pub fn bpm(&self) -> f32 {
        self.state.bpm
    }

    pub fn reset(&mut self) {
        self.state = BeatState::default();
    }
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BEAT_THRESHOLD, REFRACTORY_MS)
    }
}
