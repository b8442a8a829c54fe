// ECGWatch — Analog front-end seam
//
// The pipeline polls these once per sample tick. The device implementation
// wraps the AD8232 pins (`drivers::ad8232`); tests and the host replay use
// scripted or synthetic sources.

use crate::leads::LeadLines;

pub trait FrontEnd {
    /// Current level of LO+ / LO-.
    fn lead_lines(&mut self) -> LeadLines;

    /// One ADC conversion of the ECG output, in raw counts.
    fn read_ecg(&mut self) -> anyhow::Result<i32>;
}

impl<F: FrontEnd + ?Sized> FrontEnd for &mut F {
    fn lead_lines(&mut self) -> LeadLines {
        (**self).lead_lines()
    }

    fn read_ecg(&mut self) -> anyhow::Result<i32> {
        (**self).read_ecg()
    }
}
