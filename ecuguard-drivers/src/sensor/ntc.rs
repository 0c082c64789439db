//! NTC 10K thermistor sensor
//!
//! Board temperature thermistor in the ECU housing. Uses a lookup table for
//! integer-only temperature calculation.

use ecuguard_hal::{SensorError, TemperatureSensor};

use crate::adc::{AdcReader, ADC_12BIT_MAX};

/// NTC 10K thermistor temperature lookup table
///
/// Table format: (resistance_ohms, temperature_x10)
/// Generated using beta equation with:
/// - R0 = 10,000 ohms at T0 = 25°C
/// - Beta = 3435K (typical automotive 10K NTC)
///
/// Temperature range: -50°C to 150°C
const TEMP_TABLE: &[(u32, i16)] = &[
    (480_473, -500),
    (248_277, -400),
    (135_452, -300),
    (77_523, -200),
    (46_290, -100),
    (28_704, 0),
    (18_410, 100),
    (12_171, 200),
    (10_000, 250), // R0
    (8_269, 300),
    (5_759, 400),
    (4_101, 500),
    (2_981, 600),
    (2_207, 700),
    (1_662, 800),
    (1_272, 900),
    (987, 1000),
    (776, 1100),
    (554, 1250),
    (333, 1500),
];

/// ADC counts from either rail treated as a wiring fault
const RAIL_MARGIN: u16 = 10;

/// NTC 10K thermistor with B=3435
///
/// Circuit: VCC -- pullup -- ADC_PIN -- NTC -- GND
pub struct NtcSensor<ADC> {
    adc: ADC,
    /// Pull-up resistor value in ohms
    pullup_ohms: u32,
    /// ADC resolution (typically 4096 for 12-bit)
    adc_max: u16,
}

impl<ADC> NtcSensor<ADC> {
    /// Create a new NTC sensor on a 12-bit ADC channel
    ///
    /// `pullup_ohms` is typically 10k for a 10K NTC.
    pub fn new(adc: ADC, pullup_ohms: u32) -> Self {
        Self {
            adc,
            pullup_ohms,
            adc_max: ADC_12BIT_MAX,
        }
    }

    /// Convert ADC reading to resistance
    ///
    /// R_ntc = R_pullup * adc_value / (adc_max - adc_value)
    pub fn adc_to_resistance(&self, adc_value: u16) -> Result<u32, SensorError> {
        if adc_value >= self.adc_max - RAIL_MARGIN {
            return Err(SensorError::OpenCircuit);
        }

        if adc_value < RAIL_MARGIN {
            return Err(SensorError::ShortCircuit);
        }

        let numerator = self.pullup_ohms as u64 * adc_value as u64;
        let denominator = (self.adc_max - adc_value) as u64;

        Ok((numerator / denominator) as u32)
    }

    /// Calculate temperature from resistance using lookup table
    ///
    /// Returns temperature in 0.1°C units (e.g., 250 = 25.0°C), linearly
    /// interpolated between table entries.
    pub fn resistance_to_temp_x10(resistance: u32) -> Result<i16, SensorError> {
        let (r_coldest, _) = TEMP_TABLE[0];
        let (r_hottest, _) = TEMP_TABLE[TEMP_TABLE.len() - 1];
        if resistance > r_coldest || resistance < r_hottest {
            return Err(SensorError::OutOfRange);
        }

        // Sorted by decreasing resistance (increasing temperature)
        for pair in TEMP_TABLE.windows(2) {
            let (r_high, t_low) = pair[0];
            let (r_low, t_high) = pair[1];

            if resistance <= r_high && resistance >= r_low {
                let r_range = (r_high - r_low) as i32;
                let t_range = (t_high - t_low) as i32;
                let r_offset = (r_high - resistance) as i32;

                return Ok(t_low + (t_range * r_offset / r_range) as i16);
            }
        }

        Err(SensorError::OutOfRange)
    }
}

impl<ADC: AdcReader> TemperatureSensor for NtcSensor<ADC> {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        let adc_value = self.adc.read().map_err(|_| SensorError::ConversionError)?;
        let resistance = self.adc_to_resistance(adc_value)?;
        Self::resistance_to_temp_x10(resistance)
    }
}
