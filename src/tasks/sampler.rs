// ECGWatch — Sampler (main cycle)
//
// Woken by the sample timer; each wake-up takes the pending-sample flag,
// runs the pipeline once and hands the outcome to the presenter. Never blocks
// on I/O: display work is forwarded to the UI task.

use crate::clock::SampleFlag;
use crate::display::Display;
use crate::events::SampleOutcome;
use crate::frontend::FrontEnd;
use crate::monitor::EcgMonitor;
use crate::presenter::Presenter;
use crate::telemetry::TelemetrySink;

pub struct MainCycle<F, D, T>
where
    F: FrontEnd,
    D: Display,
    T: TelemetrySink,
{
    monitor: EcgMonitor,
    presenter: Presenter<D, T>,
    front_end: F,
}

impl<F, D, T> MainCycle<F, D, T>
where
    F: FrontEnd,
    D: Display,
    T: TelemetrySink,
{
    pub fn new(monitor: EcgMonitor, presenter: Presenter<D, T>, front_end: F) -> Self {
        Self {
            monitor,
            presenter,
            front_end,
        }
    }

    /// One iteration. Processes a sample only if the flag was raised; the
    /// beat pulse timeout is serviced either way.
    pub fn poll(&mut self, flag: &SampleFlag, now_ms: u32) -> Option<SampleOutcome> {
        if !flag.take() {
            self.presenter.expire_beat(now_ms);
            return None;
        }

        let outcome = self.monitor.process_sample(&mut self.front_end, now_ms);
        self.presenter.on_sample(&self.monitor, &outcome, now_ms);
        Some(outcome)
    }

    pub fn monitor(&self) -> &EcgMonitor {
        &self.monitor
    }

    pub fn presenter(&self) -> &Presenter<D, T> {
        &self.presenter
    }

    pub fn front_end_mut(&mut self) -> &mut F {
        &mut self.front_end
    }
}

/// Device main loop: `wait` blocks until the timer ISR signals.
pub fn sampler_task<F, D, T>(
    mut cycle: MainCycle<F, D, T>,
    flag: &SampleFlag,
    mut wait: impl FnMut(),
    mut now_ms: impl FnMut() -> u32,
) -> !
where
    F: FrontEnd,
    D: Display,
    T: TelemetrySink,
{
    log::info!("Sampler task started");

    loop {
        wait();
        cycle.poll(flag, now_ms());
    }
}
