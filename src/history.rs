// ECGWatch — Sample History
//
// Last second of accepted samples. Writes overwrite the oldest entry once the
// ring is full; readers only borrow.

use heapless::HistoryBuffer;

use crate::config::HISTORY_CAPACITY;
use crate::events::Sample;

pub struct SampleHistory<const N: usize = HISTORY_CAPACITY> {
    samples: HistoryBuffer<Sample, N>,
}

impl<const N: usize> SampleHistory<N> {
    pub const fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.write(sample);
    }

    /// Most recently pushed sample, `None` before the first push.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.recent()
    }

    pub fn latest_filtered(&self) -> Option<f32> {
        self.latest().map(|s| s.filtered)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }
}

impl<const N: usize> Default for SampleHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}
