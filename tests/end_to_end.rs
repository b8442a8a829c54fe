use ecgwatch::clock::SampleFlag;
use ecgwatch::config::{DISPLAY_BUFFER_SIZE, SAMPLE_INTERVAL_MS};
use ecgwatch::screen::{PanelBus, Screen};
use ecgwatch::sim::SyntheticEcg;
use ecgwatch::tasks::sampler::MainCycle;
use ecgwatch::telemetry::{SerialTelemetry, TelemetryLine};
use ecgwatch::{EcgConfig, EcgMonitor, Presenter, Status};

#[derive(Default)]
struct FrameCounter {
    frames: usize,
}

impl PanelBus for FrameCounter {
    fn write_frame(&mut self, _frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()> {
        self.frames += 1;
        Ok(())
    }
}

type Cycle = MainCycle<SyntheticEcg, Screen<FrameCounter>, SerialTelemetry<Vec<u8>>>;

fn boot(config: &EcgConfig, ecg: SyntheticEcg) -> Cycle {
    let mut screen = Screen::new(FrameCounter::default(), config);
    screen.show_boot_screen().unwrap();

    let mut presenter = Presenter::new(screen, SerialTelemetry::new(Vec::new()), config);
    presenter.set_status(Status::Waiting);
    presenter.set_status(Status::Ready);
    MainCycle::new(EcgMonitor::new(config), presenter, ecg)
}

fn run(cycle: &mut Cycle, from_ms: u32, to_ms: u32) {
    let flag = SampleFlag::new();
    let mut now = from_ms;
    while now < to_ms {
        cycle.front_end_mut().set_time(now);
        flag.raise();
        cycle.poll(&flag, now);
        // a few idle wake-ups between samples
        cycle.poll(&flag, now + 1);
        cycle.poll(&flag, now + 2);
        now += SAMPLE_INTERVAL_MS;
    }
}

fn telemetry(cycle: &Cycle) -> Vec<TelemetryLine> {
    let text = std::str::from_utf8(cycle.presenter().telemetry().get_ref()).unwrap();
    text.lines().map(|line| line.parse().unwrap()).collect()
}

#[test]
fn steady_72_bpm_trace() {
    let config = EcgConfig::default();
    let mut cycle = boot(&config, SyntheticEcg::new(72.0).with_noise(4));
    run(&mut cycle, 1000, 11_000);

    let lines = telemetry(&cycle);
    // one line per 100 ms tick over 10 s
    assert_eq!(lines.len(), 100);
    assert!(lines.iter().all(|l| l.leads_connected));

    let last = lines.last().unwrap();
    assert!((70..=73).contains(&last.bpm), "bpm {}", last.bpm);
    assert!((71.0..=73.0).contains(&cycle.monitor().bpm()));

    // boot frames, two per beat pulse, at most one per tick otherwise
    let frames = cycle.presenter().display().bus().frames;
    assert!((25..=150).contains(&frames), "frames {}", frames);
}

#[test]
fn lead_off_window_stops_telemetry_and_blanks_bpm() {
    let config = EcgConfig::default();
    let ecg = SyntheticEcg::new(60.0).with_lead_off(4000..6000);
    let mut cycle = boot(&config, ecg);

    run(&mut cycle, 1000, 4000);
    let before = telemetry(&cycle).len();
    assert_eq!(before, 30);
    assert!(telemetry(&cycle).last().unwrap().bpm >= 59);

    run(&mut cycle, 4000, 6000);
    assert_eq!(telemetry(&cycle).len(), before);
    assert_eq!(cycle.monitor().bpm(), 0.0);
    assert!(!cycle.presenter().indicator().is_lit());
    assert!(!cycle.presenter().display().is_beat_lit());

    run(&mut cycle, 6000, 8000);
    let after = telemetry(&cycle);
    assert_eq!(after.len(), before + 20);
    // one crossing since reconnect only arms the detector
    assert!(after[before..].iter().any(|l| l.bpm == 0));
}

#[test]
fn full_rate_telemetry_stream() {
    let config = EcgConfig {
        telemetry: ecgwatch::config::TelemetryCadence::PerSample,
        ..EcgConfig::default()
    };
    let mut cycle = boot(&config, SyntheticEcg::new(60.0).with_lead_off(2000..2400));
    run(&mut cycle, 1000, 3000);

    // 500 samples, 100 of them with the leads off
    let lines = telemetry(&cycle);
    assert_eq!(lines.len(), 400);
    let peak = lines.iter().map(|l| l.filtered).fold(f32::MIN, f32::max);
    assert!(peak > 200.0, "peak {}", peak);
}
