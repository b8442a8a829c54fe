// ECGWatch — ECG pipeline
//
// Owns every stage's state. One call per sample tick:
//
//   lead-off check ─► (connected?) ADC read ─► filter chain ─► beat detector ─► history
//
// A lead-off edge resets the filter chain and the beat state before anything
// else runs, so nothing measured before the disconnect survives it.

use crate::beat::BeatDetector;
use crate::config::{EcgConfig, HISTORY_CAPACITY, MA_WINDOW};
use crate::events::{BeatState, Sample, SampleOutcome};
use crate::filter::FilterChain;
use crate::frontend::FrontEnd;
use crate::history::SampleHistory;
use crate::leads::{LeadOffMonitor, LeadTransition};

pub struct EcgMonitor<const W: usize = MA_WINDOW, const H: usize = HISTORY_CAPACITY> {
    leads: LeadOffMonitor,
    filter: FilterChain<W>,
    detector: BeatDetector,
    history: SampleHistory<H>,
}

impl<const W: usize, const H: usize> EcgMonitor<W, H> {
    pub fn new(config: &EcgConfig) -> Self {
        Self {
            leads: LeadOffMonitor::new(),
            filter: FilterChain::new(config.dc_alpha),
            detector: BeatDetector::new(config.beat_threshold, config.refractory_ms),
            history: SampleHistory::new(),
        }
    }

    /// Run one sample tick against the front end.
    pub fn process_sample<F: FrontEnd>(&mut self, front_end: &mut F, now_ms: u32) -> SampleOutcome {
        if !self.check_connection(front_end) {
            return SampleOutcome::LeadsOff;
        }

        let raw = match front_end.read_ecg() {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("ECG read error: {}", e);
                return SampleOutcome::Skipped;
            }
        };

        let filtered = self.filter.process(raw);
        let beat = self.detector.detect(filtered.low_pass, now_ms);

        log::trace!(
            "raw:{} hp:{:.0} lp:{:.0} bpm:{:.0}",
            raw,
            filtered.high_pass,
            filtered.low_pass,
            self.detector.bpm()
        );

        let sample = Sample {
            raw,
            filtered: filtered.low_pass,
            timestamp_ms: now_ms,
        };
        self.history.push(sample);

        SampleOutcome::Processed { sample, beat }
    }

    /// Poll the lead-off lines, applying the reset on a disconnect edge.
    pub fn check_connection<F: FrontEnd>(&mut self, front_end: &mut F) -> bool {
        let (connected, edge) = self.leads.check(front_end.lead_lines());
        if edge == Some(LeadTransition::Disconnected) {
            self.detector.reset();
            self.filter.reset();
        }
        connected
    }

    pub fn is_connected(&self) -> bool {
        self.leads.is_connected()
    }

    pub fn beat_state(&self) -> &BeatState {
        self.detector.state()
    }

    pub fn bpm(&self) -> f32 {
        self.detector.bpm()
    }

    pub fn filter(&self) -> &FilterChain<W> {
        &self.filter
    }

    pub fn history(&self) -> &SampleHistory<H> {
        &self.history
    }

    /// Filtered value of the newest sample, 0.0 before the first one.
    pub fn latest_filtered(&self) -> f32 {
        self.history.latest_filtered().unwrap_or(0.0)
    }
}

impl Default for EcgMonitor {
    fn default() -> Self {
        Self::new(&EcgConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::leads::LeadLines;

    /// Replays (lines, reading) pairs; a `None` reading is a failed conversion.
    struct Script {
        steps: VecDeque<(LeadLines, Option<i32>)>,
        current: Option<i32>,
        reads: usize,
    }

    impl Script {
        fn new(steps: impl IntoIterator<Item = (LeadLines, Option<i32>)>) -> Self {
            Self {
                steps: steps.into_iter().collect(),
                current: None,
                reads: 0,
            }
        }
    }

    impl FrontEnd for Script {
        fn lead_lines(&mut self) -> LeadLines {
            let (lines, reading) = self.steps.pop_front().expect("script exhausted");
            self.current = reading;
            lines
        }

        fn read_ecg(&mut self) -> anyhow::Result<i32> {
            self.reads += 1;
            self.current.ok_or_else(|| anyhow::anyhow!("ADC timeout"))
        }
    }

    #[test]
    fn disconnected_samples_are_not_read() {
        let mut monitor = EcgMonitor::default();
        let mut script = Script::new((0..10).map(|i| (LeadLines::OFF, Some(1000 + i * 300))));

        for i in 0..10 {
            assert_eq!(monitor.process_sample(&mut script, 1000 + i * 4), SampleOutcome::LeadsOff);
        }
        assert_eq!(script.reads, 0);
        assert!(monitor.filter().is_reset());
        assert_eq!(*monitor.beat_state(), BeatState::default());
        assert!(monitor.history().is_empty());
    }

    #[test]
    fn failed_read_skips_the_tick() {
        let mut monitor = EcgMonitor::default();
        let mut script = Script::new([(LeadLines::SEATED, None), (LeadLines::SEATED, Some(2048))]);

        assert_eq!(monitor.process_sample(&mut script, 1000), SampleOutcome::Skipped);
        assert!(monitor.filter().is_reset());
        assert!(matches!(
            monitor.process_sample(&mut script, 1004),
            SampleOutcome::Processed { .. }
        ));
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn lead_off_resets_filter_and_beat_state() {
        let mut monitor = EcgMonitor::default();
        let mut steps = Vec::new();
        for i in 0..200 {
            let raw = if (40..50).contains(&(i % 75)) { 2148 } else { 2048 };
            steps.push((LeadLines::SEATED, Some(raw)));
        }
        steps.push((LeadLines { lo_plus: true, lo_minus: false }, Some(9999)));
        let mut script = Script::new(steps);

        for i in 0..200 {
            monitor.process_sample(&mut script, 1000 + i * 4);
        }
        assert!(monitor.bpm() > 0.0);
        assert!(monitor.filter().dc_estimate().is_some());

        assert_eq!(monitor.process_sample(&mut script, 1800), SampleOutcome::LeadsOff);
        assert_eq!(monitor.bpm(), 0.0);
        assert_eq!(*monitor.beat_state(), BeatState::default());
        assert!(monitor.filter().is_reset());
    }

    #[test]
    fn reconnect_reseeds_the_baseline() {
        let mut monitor = EcgMonitor::default();
        let mut script = Script::new([
            (LeadLines::SEATED, Some(1000)),
            (LeadLines::OFF, None),
            (LeadLines::SEATED, Some(3000)),
        ]);

        monitor.process_sample(&mut script, 1000);
        monitor.process_sample(&mut script, 1004);
        let outcome = monitor.process_sample(&mut script, 1008);

        match outcome {
            SampleOutcome::Processed { sample, beat } => {
                assert_eq!(sample.raw, 3000);
                assert_eq!(sample.filtered, 0.0);
                assert_eq!(beat, None);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(monitor.filter().dc_estimate(), Some(3000.0));
    }

    #[test]
    fn latest_filtered_defaults_to_zero() {
        let monitor = EcgMonitor::default();
        assert_eq!(monitor.latest_filtered(), 0.0);
    }
}
