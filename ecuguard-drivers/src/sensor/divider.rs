//! Supply voltage through a resistor divider
//!
//! Circuit: VBAT -- r_top -- ADC_PIN -- r_bottom -- GND

use ecuguard_hal::{SensorError, VoltageSensor};

use crate::adc::{AdcReader, ADC_12BIT_MAX};

/// Battery voltage sensor on a 12-bit ADC channel
pub struct DividerVoltageSensor<ADC> {
    adc: ADC,
    /// ADC reference voltage in mV
    vref_mv: u32,
    r_top_ohms: u32,
    r_bottom_ohms: u32,
}

impl<ADC> DividerVoltageSensor<ADC> {
    pub fn new(adc: ADC, vref_mv: u16, r_top_ohms: u32, r_bottom_ohms: u32) -> Self {
        Self {
            adc,
            vref_mv: vref_mv as u32,
            r_top_ohms,
            r_bottom_ohms,
        }
    }

    /// Convert a raw ADC count to supply millivolts
    ///
    /// A saturated converter means the supply is above the measurable range.
    pub fn adc_to_millivolts(&self, adc_value: u16) -> Result<u16, SensorError> {
        if adc_value >= ADC_12BIT_MAX - 1 {
            return Err(SensorError::OutOfRange);
        }
        if self.r_bottom_ohms == 0 {
            return Err(SensorError::ShortCircuit);
        }

        let pin_mv = adc_value as u64 * self.vref_mv as u64 / ADC_12BIT_MAX as u64;
        let supply_mv =
            pin_mv * (self.r_top_ohms as u64 + self.r_bottom_ohms as u64) / self.r_bottom_ohms as u64;

        u16::try_from(supply_mv).map_err(|_| SensorError::OutOfRange)
    }
}

impl<ADC: AdcReader> VoltageSensor for DividerVoltageSensor<ADC> {
    fn read_millivolts(&mut self) -> Result<u16, SensorError> {
        let adc_value = self.adc.read().map_err(|_| SensorError::ConversionError)?;
        self.adc_to_millivolts(adc_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adc::{DummyAdc, FailingAdc};
    use proptest::prelude::*;

    // 100k / 15k divider: 3.3 V at the pin is about 25.3 V at the supply
    fn sensor(adc: u16) -> DividerVoltageSensor<DummyAdc> {
        DividerVoltageSensor::new(DummyAdc(adc), 3300, 100_000, 15_000)
    }

    #[test]
    fn test_nominal_supply() {
        // 13.8 V -> 1.8 V at the pin -> 2234 counts
        let mv = sensor(2234).read_millivolts().unwrap();
        assert!((13_700..=13_900).contains(&mv), "got {}", mv);
    }

    #[test]
    fn test_zero() {
        assert_eq!(sensor(0).read_millivolts(), Ok(0));
    }

    #[test]
    fn test_saturated() {
        assert_eq!(sensor(4095).read_millivolts(), Err(SensorError::OutOfRange));
    }

    #[test]
    fn test_conversion_error() {
        let mut sensor = DividerVoltageSensor::new(FailingAdc, 3300, 100_000, 15_000);
        assert_eq!(sensor.read_millivolts(), Err(SensorError::ConversionError));
    }

    proptest! {
        #[test]
        fn prop_monotonic(a in 0u16..4094, b in 0u16..4094) {
            let s = sensor(0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(s.adc_to_millivolts(lo).unwrap() <= s.adc_to_millivolts(hi).unwrap());
        }
    }
}
