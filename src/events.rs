// ECGWatch — System Events & Data Types

// ---------------------------------------------------------------------------
// Sample (one accepted ADC reading and its filtered value)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub raw: i32,
    pub filtered: f32,
    pub timestamp_ms: u32,
}

// ---------------------------------------------------------------------------
// Beat state, owned by the beat detector
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BeatState {
    pub bpm: f32,
    /// 0 means "no beat seen since the last reset".
    pub last_beat_ms: u32,
    pub in_beat: bool,
}

/// A detected beat with a measurable interval to the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatEvent {
    pub bpm: f32,
    pub at_ms: u32,
}

/// Result of one main-cycle sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Leads are off; nothing was read or filtered.
    LeadsOff,
    /// The ADC read failed; the tick is dropped.
    Skipped,
    Processed {
        sample: Sample,
        beat: Option<BeatEvent>,
    },
}

impl SampleOutcome {
    pub fn beat(&self) -> Option<BeatEvent> {
        match self {
            Self::Processed { beat, .. } => *beat,
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Status line shown on the display
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Starting,
    Waiting,
    Ready,
    Connected,
    NoLeads,
}

impl Status {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Starting  => "Starting...",
            Self::Waiting   => "Waiting...",
            Self::Ready     => "Ready",
            Self::Connected => "Connected",
            Self::NoLeads   => "No leads",
        }
    }
}

// ---------------------------------------------------------------------------
// UI Events — sent to the UI task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Status(Status),
    /// 0.0 renders as the "---" placeholder.
    Bpm(f32),
    /// Latest filtered amplitude, quantised into the signal bar.
    SignalBar(f32),
    /// Light the beat indicator.
    ShowBeat,
    /// Blank the beat indicator.
    ClearBeat,
}
