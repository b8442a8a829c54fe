// ECGWatch — Display collaborator
//
// The pipeline calls these; how they render is up to the implementation.
// `Screen` draws directly, `ChannelDisplay` forwards to the UI task.

use std::sync::mpsc::Sender;

use crate::events::{Status, UiEvent};

pub trait Display {
    fn update_status(&mut self, status: Status) -> anyhow::Result<()>;
    fn update_bpm(&mut self, bpm: f32) -> anyhow::Result<()>;
    fn update_signal_bar(&mut self, filtered: f32) -> anyhow::Result<()>;
    fn show_beat(&mut self) -> anyhow::Result<()>;
    fn clear_beat(&mut self) -> anyhow::Result<()>;

    /// Push any buffered drawing to the panel.
    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn apply(&mut self, event: UiEvent) -> anyhow::Result<()> {
        match event {
            UiEvent::Status(status) => self.update_status(status),
            UiEvent::Bpm(bpm) => self.update_bpm(bpm),
            UiEvent::SignalBar(filtered) => self.update_signal_bar(filtered),
            UiEvent::ShowBeat => self.show_beat(),
            UiEvent::ClearBeat => self.clear_beat(),
        }
    }
}

// ---------------------------------------------------------------------------
// Value formatting shared by the renderers
// ---------------------------------------------------------------------------

/// Linear map of `value` clamped to `[min, max]` onto `0..=segments` lit
/// segments.
pub fn signal_segments(value: f32, min: f32, max: f32, segments: u8) -> u8 {
    if !(max > min) || value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(min, max);
    let lit = (clamped - min) / (max - min) * f32::from(segments);
    (lit as u8).min(segments)
}

/// Three-column BPM field, `---` while no rate is known.
pub fn bpm_text(bpm: f32) -> heapless::String<8> {
    use core::fmt::Write;

    let mut text = heapless::String::new();
    if bpm > 0.0 && bpm.is_finite() {
        let _ = write!(text, "{:>3}", bpm.round().min(999.0) as u32);
    } else {
        let _ = text.push_str("---");
    }
    text
}

// ---------------------------------------------------------------------------
// Channel-backed display (device: sampler → UI task)
// ---------------------------------------------------------------------------

pub struct ChannelDisplay {
    ui_tx: Sender<UiEvent>,
}

impl ChannelDisplay {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }

    fn send(&self, event: UiEvent) -> anyhow::Result<()> {
        self.ui_tx
            .send(event)
            .map_err(|_| anyhow::anyhow!("UI task is gone"))
    }
}

impl Display for ChannelDisplay {
    fn update_status(&mut self, status: Status) -> anyhow::Result<()> {
        self.send(UiEvent::Status(status))
    }

    fn update_bpm(&mut self, bpm: f32) -> anyhow::Result<()> {
        self.send(UiEvent::Bpm(bpm))
    }

    fn update_signal_bar(&mut self, filtered: f32) -> anyhow::Result<()> {
        self.send(UiEvent::SignalBar(filtered))
    }

    fn show_beat(&mut self) -> anyhow::Result<()> {
        self.send(UiEvent::ShowBeat)
    }

    fn clear_beat(&mut self) -> anyhow::Result<()> {
        self.send(UiEvent::ClearBeat)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn signal_bar_is_clamped_at_the_range_edges() {
        assert_eq!(signal_segments(-1000.0, -400.0, 400.0, 10), 0);
        assert_eq!(signal_segments(-400.0, -400.0, 400.0, 10), 0);
        assert_eq!(signal_segments(0.0, -400.0, 400.0, 10), 5);
        assert_eq!(signal_segments(399.0, -400.0, 400.0, 10), 9);
        assert_eq!(signal_segments(400.0, -400.0, 400.0, 10), 10);
        assert_eq!(signal_segments(5000.0, -400.0, 400.0, 10), 10);
    }

    #[test]
    fn signal_bar_rejects_degenerate_input() {
        assert_eq!(signal_segments(f32::NAN, -400.0, 400.0, 10), 0);
        assert_eq!(signal_segments(10.0, 400.0, -400.0, 10), 0);
    }

    #[test]
    fn bpm_placeholder_when_unknown() {
        assert_eq!(bpm_text(0.0).as_str(), "---");
        assert_eq!(bpm_text(-3.0).as_str(), "---");
        assert_eq!(bpm_text(f32::INFINITY).as_str(), "---");
        assert_eq!(bpm_text(72.4).as_str(), " 72");
        assert_eq!(bpm_text(199.6).as_str(), "200");
    }

    #[test]
    fn channel_display_forwards_events_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut display = ChannelDisplay::new(tx);

        display.update_status(Status::Connected).unwrap();
        display.update_bpm(60.0).unwrap();
        display.show_beat().unwrap();

        let events: Vec<UiEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![UiEvent::Status(Status::Connected), UiEvent::Bpm(60.0), UiEvent::ShowBeat]
        );
    }

    #[test]
    fn channel_display_reports_a_closed_ui_task() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut display = ChannelDisplay::new(tx);
        assert!(display.clear_beat().is_err());
    }
}
