// ECGWatch — Filter Chain
//
// raw ─► DC tracker (single-pole baseline) ─► hp = raw − dc ─► moving average ─► lp
//
// Both stages are fixed-size and allocation-free. The moving-average ring
// keeps an integer running sum, so it never drifts.

use crate::config::{DC_ALPHA, MA_WINDOW};

// ---------------------------------------------------------------------------
// DC removal
// ---------------------------------------------------------------------------

/// Slow exponential baseline tracker. Unset after a reset; the next reading
/// seeds it directly instead of ramping up from zero.
#[derive(Debug, Clone, Copy)]
pub struct DcTracker {
    alpha: f32,
    estimate: Option<f32>,
}

impl DcTracker {
    pub fn new(alpha: f32) -> Self {
        Self { alpha, estimate: None }
    }

    /// Feed one reading and return the high-pass value `raw − dc`.
    pub fn update(&mut self, raw: i32) -> f32 {
        let raw = raw as f32;
        let prev = self.estimate.unwrap_or(raw);
        let dc = self.alpha * prev + (1.0 - self.alpha) * raw;
        self.estimate = Some(dc);
        raw - dc
    }

    pub fn estimate(&self) -> Option<f32> {
        self.estimate
    }

    pub fn reset(&mut self) {
        self.estimate = None;
    }
}

impl Default for DcTracker {
    fn default() -> Self {
        Self::new(DC_ALPHA)
    }
}

// ---------------------------------------------------------------------------
// Moving average
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize> {
    ring: [i32; N],
    index: usize,
    sum: i32,
}

impl<const N: usize> MovingAverage<N> {
    pub fn new() -> Self {
        assert!(N > 0, "moving average window must be non-empty");
        Self {
            ring: [0; N],
            index: 0,
            sum: 0,
        }
    }

    /// Replace the oldest slot with `value` (truncated toward zero) and return
    /// the window mean. Empty slots count as zero.
    pub fn push(&mut self, value: f32) -> f32 {
        let value = value as i32;
        self.sum -= self.ring[self.index];
        self.ring[self.index] = value;
        self.sum += value;
        self.index = (self.index + 1) % N;
        self.sum as f32 / N as f32
    }

    pub fn sum(&self) -> i32 {
        self.sum
    }

    pub fn is_zeroed(&self) -> bool {
        self.sum == 0 && self.index == 0 && self.ring.iter().all(|&v| v == 0)
    }

    pub fn reset(&mut self) {
        self.ring = [0; N];
        self.index = 0;
        self.sum = 0;
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filtered {
    pub high_pass: f32,
    pub low_pass: f32,
}

#[derive(Debug, Clone)]
pub struct FilterChain<const N: usize = MA_WINDOW> {
    dc: DcTracker,
    average: MovingAverage<N>,
}

impl<const N: usize> FilterChain<N> {
    pub fn new(dc_alpha: f32) -> Self {
        Self {
            dc: DcTracker::new(dc_alpha),
            average: MovingAverage::new(),
        }
    }

    pub fn process(&mut self, raw: i32) -> Filtered {
        let high_pass = self.dc.update(raw);
        let low_pass = self.average.push(high_pass);
        Filtered { high_pass, low_pass }
    }

    /// Back to the power-on state: unset baseline, zeroed window.
    pub fn reset(&mut self) {
        self.dc.reset();
        self.average.reset();
    }

    pub fn dc_estimate(&self) -> Option<f32> {
        self.dc.estimate()
    }

    pub fn is_reset(&self) -> bool {
        self.dc.estimate().is_none() && self.average.is_zeroed()
    }
}

impl<const N: usize> Default for FilterChain<N> {
    fn default() -> Self {
        Self::new(DC_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn first_reading_seeds_the_baseline() {
        let mut dc = DcTracker::new(0.995);
        assert_eq!(dc.estimate(), None);

        let hp = dc.update(2048);
        assert_eq!(hp, 0.0);
        assert_eq!(dc.estimate(), Some(2048.0));
    }

    #[test]
    fn baseline_tracks_slowly() {
        let mut dc = DcTracker::new(0.995);
        dc.update(1000);
        let hp = dc.update(1100);
        // dc = 0.995·1000 + 0.005·1100 = 1000.5
        assert_abs_diff_eq!(hp, 99.5, epsilon = 1e-3);
        assert_abs_diff_eq!(dc.estimate().unwrap(), 1000.5, epsilon = 1e-3);
    }

    #[test]
    fn reset_forces_a_reseed() {
        let mut dc = DcTracker::new(0.995);
        dc.update(500);
        dc.reset();
        assert_eq!(dc.update(3000), 0.0);
        assert_eq!(dc.estimate(), Some(3000.0));
    }

    #[test]
    fn moving_average_converges_to_constant_offset() {
        let mut ma = MovingAverage::<5>::new();
        let outputs: Vec<f32> = (0..7).map(|_| ma.push(30.0)).collect();

        assert_eq!(outputs[0], 6.0);
        assert_eq!(outputs[3], 24.0);
        assert_eq!(outputs[4], 30.0);
        assert_eq!(outputs[6], 30.0);
        assert_eq!(ma.sum(), 150);
    }

    #[test]
    fn moving_average_truncates_toward_zero() {
        let mut ma = MovingAverage::<1>::new();
        assert_eq!(ma.push(12.9), 12.0);
        assert_eq!(ma.push(-12.9), -12.0);
    }

    #[test]
    fn ring_index_wraps() {
        let mut ma = MovingAverage::<3>::new();
        for v in [1.0, 2.0, 3.0, 4.0] {
            ma.push(v);
        }
        // window now holds 4, 2, 3
        assert_eq!(ma.sum(), 9);
    }

    #[test]
    fn chain_reset_restores_power_on_state() {
        let mut chain = FilterChain::<5>::new(0.995);
        assert!(chain.is_reset());

        chain.process(2000);
        chain.process(2400);
        assert!(!chain.is_reset());

        chain.reset();
        assert!(chain.is_reset());
        assert_eq!(chain.process(1800).low_pass, 0.0);
    }

    #[test]
    fn constant_input_settles_at_zero() {
        let mut chain = FilterChain::<5>::default();
        for _ in 0..1000 {
            let out = chain.process(2048);
            assert_abs_diff_eq!(out.low_pass, 0.0);
        }
    }
}
