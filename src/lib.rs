// ECGWatch — ECG acquisition & beat-detection pipeline
//
// Hardware-independent core of the firmware. The binary wires it to the
// ESP32 (hardware timer, AD8232 pins, SSD1306 over I2C, UART telemetry); the
// host build replays a synthetic trace through the same code.
//
//   timer ISR ─► SampleFlag ─► EcgMonitor::process_sample ─► Presenter::on_sample
//                               (lead-off, filter, beat,       (throttled display,
//                                history)                       beat pulse, telemetry)

pub mod beat;
pub mod clock;
pub mod config;
pub mod display;
pub mod events;
pub mod filter;
pub mod frontend;
pub mod history;
pub mod leads;
pub mod monitor;
pub mod presenter;
pub mod screen;
pub mod sim;
pub mod tasks;
pub mod telemetry;

pub use config::EcgConfig;
pub use events::{BeatEvent, BeatState, Sample, SampleOutcome, Status, UiEvent};
pub use monitor::EcgMonitor;
pub use presenter::Presenter;
