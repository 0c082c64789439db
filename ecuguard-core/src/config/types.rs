//! Health monitor configuration types
//!
//! The configuration is fixed once a monitor is constructed. It can be kept
//! in non-volatile memory as postcard binary data (see `persist`).

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default interval between health checks
pub const DEFAULT_CHECK_INTERVAL_MS: u32 = 10;

/// Default RAM test pattern
pub const DEFAULT_RAM_TEST_PATTERN: u8 = 0xA5;

/// Default allowed clock deviation from the reference
pub const DEFAULT_CLOCK_DRIFT_LIMIT_PPM: u32 = 20_000;

/// Supply voltage thresholds in millivolts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoltageThresholds {
    /// Below this the supply is undervoltage
    pub undervolt_mv: u16,
    /// Above this the supply is overvoltage
    pub overvolt_mv: u16,
    pub nominal_mv: u16,
    /// Half-width of the band around nominal that clears a latched warning
    pub hysteresis_mv: u16,
}

/// 12 V automotive supply
pub const DEFAULT_12V_THRESHOLDS: VoltageThresholds = VoltageThresholds {
    undervolt_mv: 9000,
    overvolt_mv: 16000,
    nominal_mv: 13800,
    hysteresis_mv: 500,
};

impl VoltageThresholds {
    fn is_consistent(&self) -> bool {
        self.undervolt_mv < self.nominal_mv
            && self.nominal_mv < self.overvolt_mv
            && self.hysteresis_mv > 0
            && self.nominal_mv.saturating_sub(self.hysteresis_mv) >= self.undervolt_mv
            && self.nominal_mv.saturating_add(self.hysteresis_mv) <= self.overvolt_mv
    }
}

impl Default for VoltageThresholds {
    fn default() -> Self {
        DEFAULT_12V_THRESHOLDS
    }
}

/// Temperature thresholds in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemperatureThresholds {
    pub warning_high_c: i16,
    pub shutdown_high_c: i16,
    pub warning_low_c: i16,
    pub shutdown_low_c: i16,
    /// A warning clears once the reading is this far back inside its threshold
    pub hysteresis_c: i16,
}

/// Automotive grade silicon (-40 to +125°C operating)
pub const DEFAULT_TEMP_THRESHOLDS: TemperatureThresholds = TemperatureThresholds {
    warning_high_c: 125,
    shutdown_high_c: 150,
    warning_low_c: -40,
    shutdown_low_c: -50,
    hysteresis_c: 5,
};

impl TemperatureThresholds {
    fn is_consistent(&self) -> bool {
        self.shutdown_low_c < self.warning_low_c
            && self.warning_low_c < self.warning_high_c
            && self.warning_high_c < self.shutdown_high_c
            && self.hysteresis_c >= 0
    }
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        DEFAULT_TEMP_THRESHOLDS
    }
}

bitflags! {
    /// Configuration fields replaced by defaults during [`MonitorConfig::sanitize`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConfigCorrections: u8 {
        const VOLTAGE_THRESHOLDS = 1 << 0;
        const TEMPERATURE_THRESHOLDS = 1 << 1;
        const CHECK_INTERVAL = 1 << 2;
        const CLOCK_DRIFT_LIMIT = 1 << 3;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigCorrections {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ConfigCorrections({=u8:#x})", self.bits());
    }
}

/// ECU health monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    pub voltage: VoltageThresholds,
    pub temperature: TemperatureThresholds,
    /// Minimum time between periodic checks
    pub check_interval_ms: u32,
    /// Byte pattern written by the RAM test
    pub ram_test_pattern: u8,
    pub enable_clock_monitor: bool,
    /// Absolute clock drift above which `ClockDrift` is raised
    pub clock_drift_limit_ppm: u32,
    /// Verify the flash image checksum alongside the RAM test
    pub enable_flash_check: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            voltage: DEFAULT_12V_THRESHOLDS,
            temperature: DEFAULT_TEMP_THRESHOLDS,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            ram_test_pattern: DEFAULT_RAM_TEST_PATTERN,
            enable_clock_monitor: true,
            clock_drift_limit_ppm: DEFAULT_CLOCK_DRIFT_LIMIT_PPM,
            enable_flash_check: false,
        }
    }
}

impl MonitorConfig {
    /// Replace inconsistent fields with their defaults
    ///
    /// Returns the set of fields that were corrected; empty when the
    /// configuration was already valid.
    pub fn sanitize(&mut self) -> ConfigCorrections {
        let mut corrected = ConfigCorrections::empty();

        if !self.voltage.is_consistent() {
            self.voltage = DEFAULT_12V_THRESHOLDS;
            corrected |= ConfigCorrections::VOLTAGE_THRESHOLDS;
        }

        if !self.temperature.is_consistent() {
            self.temperature = DEFAULT_TEMP_THRESHOLDS;
            corrected |= ConfigCorrections::TEMPERATURE_THRESHOLDS;
        }

        if self.check_interval_ms == 0 {
            self.check_interval_ms = DEFAULT_CHECK_INTERVAL_MS;
            corrected |= ConfigCorrections::CHECK_INTERVAL;
        }

        if self.enable_clock_monitor && self.clock_drift_limit_ppm == 0 {
            self.clock_drift_limit_ppm = DEFAULT_CLOCK_DRIFT_LIMIT_PPM;
            corrected |= ConfigCorrections::CLOCK_DRIFT_LIMIT;
        }

        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean() {
        let mut config = MonitorConfig::default();
        assert!(config.sanitize().is_empty());
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_inverted_voltage_restored() {
        let mut config = MonitorConfig::default();
        config.voltage.undervolt_mv = 17000;

        let corrected = config.sanitize();
        assert_eq!(corrected, ConfigCorrections::VOLTAGE_THRESHOLDS);
        assert_eq!(config.voltage, DEFAULT_12V_THRESHOLDS);
    }

    #[test]
    fn test_hysteresis_wider_than_band_restored() {
        let mut config = MonitorConfig::default();
        config.voltage.hysteresis_mv = 6000;
        assert!(config.sanitize().contains(ConfigCorrections::VOLTAGE_THRESHOLDS));
    }

    #[test]
    fn test_shutdown_inside_warning_band_restored() {
        let mut config = MonitorConfig::default();
        config.temperature.shutdown_high_c = 100;

        assert_eq!(config.sanitize(), ConfigCorrections::TEMPERATURE_THRESHOLDS);
        assert_eq!(config.temperature, DEFAULT_TEMP_THRESHOLDS);
    }

    #[test]
    fn test_zero_interval_and_drift_restored() {
        let mut config = MonitorConfig {
            check_interval_ms: 0,
            clock_drift_limit_ppm: 0,
            ..Default::default()
        };

        let corrected = config.sanitize();
        assert!(corrected.contains(ConfigCorrections::CHECK_INTERVAL));
        assert!(corrected.contains(ConfigCorrections::CLOCK_DRIFT_LIMIT));
        assert_eq!(config.check_interval_ms, DEFAULT_CHECK_INTERVAL_MS);
    }

    #[test]
    fn test_drift_limit_ignored_without_clock_monitor() {
        let mut config = MonitorConfig {
            enable_clock_monitor: false,
            clock_drift_limit_ppm: 0,
            ..Default::default()
        };
        assert!(config.sanitize().is_empty());
    }
}
