// ECGWatch — Sample Clock hand-off
//
// The hardware timer ISR and the main cycle share exactly one word: a
// pending-sample flag. The ISR only raises it; the main cycle takes it once
// per iteration. Ticks that arrive while the flag is still raised collapse
// into one pending sample.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SAMPLE_RATE_HZ;

pub struct SampleFlag {
    pending: AtomicBool,
}

impl SampleFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// ISR side. Never blocks, never allocates.
    #[inline(always)]
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Main-cycle side: returns whether a sample was pending and clears the
    /// flag in the same atomic step.
    #[inline]
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl Default for SampleFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Alarm value for a timer counting at `tick_hz` to fire at `rate_hz`.
pub fn alarm_ticks(tick_hz: u64, rate_hz: u32) -> u64 {
    tick_hz / u64::from(rate_hz.max(1))
}

/// Alarm value for the nominal sampling rate.
pub fn sample_alarm_ticks(tick_hz: u64) -> u64 {
    alarm_ticks(tick_hz, SAMPLE_RATE_HZ)
}
