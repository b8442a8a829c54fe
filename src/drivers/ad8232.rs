// ECGWatch — AD8232 front-end driver
//
// LO+ / LO- are plain digital inputs; the ECG output is sampled with the
// ESP-IDF one-shot ADC driver through raw esp-idf-sys calls.

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};
use esp_idf_sys::esp;

use ecgwatch::config::*;
use ecgwatch::frontend::FrontEnd;
use ecgwatch::leads::LeadLines;

pub struct Ad8232<'d> {
    lo_plus: PinDriver<'d, AnyInputPin, Input>,
    lo_minus: PinDriver<'d, AnyInputPin, Input>,
    adc: OneshotAdc,
}

impl<'d> Ad8232<'d> {
    pub fn new(
        lo_plus: PinDriver<'d, AnyInputPin, Input>,
        lo_minus: PinDriver<'d, AnyInputPin, Input>,
    ) -> anyhow::Result<Self> {
        let adc = OneshotAdc::new(esp_idf_sys::adc_channel_t_ADC_CHANNEL_6)?;
        log::info!(
            "AD8232 ready (OUT GPIO{} / ADC1_CH{}, LO+ GPIO{}, LO- GPIO{})",
            PIN_ECG_OUTPUT,
            ADC_ECG_CHANNEL,
            PIN_LEAD_OFF_PLUS,
            PIN_LEAD_OFF_MINUS
        );
        Ok(Self { lo_plus, lo_minus, adc })
    }
}

impl FrontEnd for Ad8232<'_> {
    fn lead_lines(&mut self) -> LeadLines {
        LeadLines {
            lo_plus: self.lo_plus.is_high(),
            lo_minus: self.lo_minus.is_high(),
        }
    }

    fn read_ecg(&mut self) -> anyhow::Result<i32> {
        self.adc.read()
    }
}

// ---------------------------------------------------------------------------
// ADC1 one-shot unit, 12-bit, 11 dB attenuation (0–3.3 V)
// ---------------------------------------------------------------------------

struct OneshotAdc {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
    channel: esp_idf_sys::adc_channel_t,
}

impl OneshotAdc {
    fn new(channel: esp_idf_sys::adc_channel_t) -> anyhow::Result<Self> {
        let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();

        // SAFETY: plain FFI calls with stack-owned config structs; the handle
        // is owned by `Self` and released in `Drop`.
        unsafe {
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp!(esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle))?;

            let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            if let Err(e) = esp!(esp_idf_sys::adc_oneshot_config_channel(handle, channel, &chan_cfg)) {
                esp_idf_sys::adc_oneshot_del_unit(handle);
                return Err(e.into());
            }
        }

        Ok(Self { handle, channel })
    }

    fn read(&mut self) -> anyhow::Result<i32> {
        let mut raw: i32 = 0;
        // SAFETY: `handle` was created by `adc_oneshot_new_unit` and is live.
        esp!(unsafe { esp_idf_sys::adc_oneshot_read(self.handle, self.channel, &mut raw) })?;
        Ok(raw)
    }
}

impl Drop for OneshotAdc {
    fn drop(&mut self) {
        // SAFETY: the handle is only deleted here, once.
        unsafe {
            esp_idf_sys::adc_oneshot_del_unit(self.handle);
        }
    }
}
