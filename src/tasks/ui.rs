// ECGWatch — UI Task
//
// Owns the display. Blocks until the sampler sends something, applies every
// pending event, then flushes once so a burst of updates costs one panel
// transfer.

use std::sync::mpsc::Receiver;

use crate::display::Display;
use crate::events::UiEvent;

/// Runs until every sender is dropped, then hands the display back.
pub fn ui_task<D: Display>(mut display: D, ui_rx: Receiver<UiEvent>) -> D {
    log::info!("UI task started");

    loop {
        let first = match ui_rx.recv() {
            Ok(event) => event,
            Err(_) => {
                log::warn!("UI channel closed — exiting UI task");
                return display;
            }
        };

        apply(&mut display, first);
        while let Ok(event) = ui_rx.try_recv() {
            apply(&mut display, event);
        }

        if let Err(e) = display.flush() {
            log::error!("Display error: {}", e);
        }
    }
}

fn apply<D: Display>(display: &mut D, event: UiEvent) {
    if let Err(e) = display.apply(event) {
        log::error!("Display error ({:?}): {}", event, e);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::config::{EcgConfig, DISPLAY_BUFFER_SIZE};
    use crate::display::ChannelDisplay;
    use crate::events::Status;
    use crate::screen::{PanelBus, Screen};

    #[derive(Default)]
    struct CountingBus {
        frames: usize,
    }

    impl PanelBus for CountingBus {
        fn write_frame(&mut self, _frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()> {
            self.frames += 1;
            Ok(())
        }
    }

    #[test]
    fn queued_burst_is_flushed_once() {
        let (tx, rx) = mpsc::channel();
        let mut display = ChannelDisplay::new(tx);
        display.update_status(Status::Connected).unwrap();
        display.update_bpm(72.0).unwrap();
        display.update_signal_bar(35.0).unwrap();
        display.show_beat().unwrap();
        drop(display);

        let screen = ui_task(Screen::new(CountingBus::default(), &EcgConfig::default()), rx);
        assert_eq!(screen.bus().frames, 1);
        assert!(screen.is_beat_lit());
    }

    #[test]
    fn runs_on_its_own_thread() {
        let (tx, rx) = mpsc::channel();
        let ui = thread::Builder::new()
            .name("ui".into())
            .spawn(move || ui_task(Screen::new(CountingBus::default(), &EcgConfig::default()), rx))
            .unwrap();

        let mut display = ChannelDisplay::new(tx);
        display.show_beat().unwrap();
        display.clear_beat().unwrap();
        drop(display);

        let screen = ui.join().unwrap();
        assert!(!screen.is_beat_lit());
        assert!(screen.bus().frames >= 1);
    }
}
