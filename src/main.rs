// ECGWatch — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up I2C, locate the OLED and draw the boot screen.
//   2. Hand the display to the UI task.
//   3. Configure the AD8232 front end ("Waiting...").
//   4. Arm the 250 Hz hardware sample timer ("Ready").
//   5. Run the sampler on the main task forever.
//
// On the host the same pipeline replays a synthetic ECG trace and prints the
// telemetry lines to stdout.

#[cfg(target_os = "espidf")]
mod drivers;

#[cfg(target_os = "espidf")]
mod firmware {
    use std::num::NonZeroU32;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::thread;

    use esp_idf_hal::delay::BLOCK;
    use esp_idf_hal::gpio::{InputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::task::notification::Notification;
    use esp_idf_hal::timer::{config::Config as TimerConfig, TimerDriver};

    use ecgwatch::clock::{sample_alarm_ticks, SampleFlag};
    use ecgwatch::config::*;
    use ecgwatch::display::ChannelDisplay;
    use ecgwatch::screen::Screen;
    use ecgwatch::tasks::sampler::{sampler_task, MainCycle};
    use ecgwatch::tasks::ui::ui_task;
    use ecgwatch::telemetry::SerialTelemetry;
    use ecgwatch::{EcgConfig, EcgMonitor, Presenter, Status};

    use crate::drivers::ad8232::Ad8232;
    use crate::drivers::ssd1306::{scan_for_display, Ssd1306};
    use crate::drivers::SharedBus;

    /// Raised by the timer ISR, taken by the sampler.
    static SAMPLE_FLAG: SampleFlag = SampleFlag::new();

    // -----------------------------------------------------------------------
    // Utility: milliseconds since boot (wraps at ~49 days — all deltas use
    // wrapping arithmetic)
    // -----------------------------------------------------------------------
    pub fn now_ms() -> u32 {
        unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
    }

    pub fn run() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("ECGWatch firmware starting…");

        let peripherals = Peripherals::take()?;
        let config = EcgConfig::default();

        // ---- I2C bus + OLED ---------------------------------------------------
        let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21, // PIN_I2C_SDA
            peripherals.pins.gpio22, // PIN_I2C_SCL
            &i2c_config,
        )?;
        let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));
        log::info!(
            "I2C up: SDA=GPIO{} SCL=GPIO{} @ {} kHz",
            PIN_I2C_SDA,
            PIN_I2C_SCL,
            I2C_BAUDRATE_KHZ
        );

        let addr = scan_for_display(i2c_bus);
        log::info!("OLED I2C address: 0x{:02X}", addr);

        let mut panel = Ssd1306::new(i2c_bus, addr);
        panel.init()?;
        let mut screen = Screen::new(panel, &config);
        screen.show_boot_screen()?;

        // ---- UI task ------------------------------------------------------------
        let (ui_tx, ui_rx) = mpsc::channel();
        thread::Builder::new()
            .name("ui".into())
            .stack_size(STACK_UI)
            .spawn(move || {
                ui_task(screen, ui_rx);
            })?;

        let mut presenter = Presenter::new(
            ChannelDisplay::new(ui_tx),
            SerialTelemetry::new(std::io::stdout()),
            &config,
        );
        presenter.set_status(Status::Waiting);

        // ---- AD8232 front end -------------------------------------------------
        let lo_plus = PinDriver::input(peripherals.pins.gpio13.downgrade_input())?;
        let lo_minus = PinDriver::input(peripherals.pins.gpio12.downgrade_input())?;
        let front_end = Ad8232::new(lo_plus, lo_minus)?;

        // ---- Sample timer -----------------------------------------------------
        let notification = Notification::new();
        let notifier = notification.notifier();

        let mut timer = TimerDriver::new(peripherals.timer00, &TimerConfig::new().auto_reload(true))?;
        timer.set_alarm(sample_alarm_ticks(timer.tick_hz()))?;
        // SAFETY: the ISR only touches the atomic flag and the task
        // notification; neither blocks nor allocates.
        unsafe {
            timer.subscribe(move || {
                SAMPLE_FLAG.raise();
                notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
        }
        timer.enable_interrupt()?;
        timer.enable_alarm(true)?;
        timer.enable(true)?;
        log::info!("Sample timer armed at {} Hz", SAMPLE_RATE_HZ);

        presenter.set_status(Status::Ready);

        // ---- Main cycle -------------------------------------------------------
        // `timer` stays alive: `sampler_task` never returns.
        let cycle = MainCycle::new(EcgMonitor::new(&config), presenter, front_end);
        sampler_task(
            cycle,
            &SAMPLE_FLAG,
            || {
                notification.wait(BLOCK);
            },
            now_ms,
        )
    }
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

// ---------------------------------------------------------------------------
// Host: synthetic trace replay
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::sync::mpsc;
    use std::thread;

    use ecgwatch::clock::SampleFlag;
    use ecgwatch::config::{DISPLAY_BUFFER_SIZE, SAMPLE_INTERVAL_MS};
    use ecgwatch::display::ChannelDisplay;
    use ecgwatch::screen::{PanelBus, Screen};
    use ecgwatch::sim::SyntheticEcg;
    use ecgwatch::tasks::sampler::MainCycle;
    use ecgwatch::tasks::ui::ui_task;
    use ecgwatch::telemetry::SerialTelemetry;
    use ecgwatch::{EcgConfig, EcgMonitor, Presenter};

    struct NullPanel;

    impl PanelBus for NullPanel {
        fn write_frame(&mut self, _frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    // usage: ecgwatch [bpm] [seconds]
    let mut args = std::env::args().skip(1);
    let bpm: f32 = args.next().map(|a| a.parse()).transpose()?.unwrap_or(72.0);
    let seconds: u32 = args.next().map(|a| a.parse()).transpose()?.unwrap_or(20);

    let config = EcgConfig::default();
    let (ui_tx, ui_rx) = mpsc::channel();
    let ui = thread::Builder::new()
        .name("ui".into())
        .spawn(move || ui_task(Screen::new(NullPanel, &config), ui_rx))?;

    let presenter = Presenter::new(
        ChannelDisplay::new(ui_tx),
        SerialTelemetry::new(std::io::stdout()),
        &config,
    );
    // leads come off for two seconds in the middle of the run
    let middle = 1000 + seconds * 500;
    let front_end = SyntheticEcg::new(bpm)
        .with_noise(4)
        .with_lead_off(middle..middle + 2000);
    let mut cycle = MainCycle::new(EcgMonitor::new(&config), presenter, front_end);

    let flag = SampleFlag::new();
    let end = 1000 + seconds * 1000;
    let mut now = 1000;
    while now < end {
        cycle.front_end_mut().set_time(now);
        flag.raise();
        cycle.poll(&flag, now);
        now += SAMPLE_INTERVAL_MS;
    }

    eprintln!("final BPM: {:.1}", cycle.monitor().bpm());
    drop(cycle);
    ui.join().map_err(|_| anyhow::anyhow!("UI thread panicked"))?;
    Ok(())
}
