//! Voltage, temperature and clock measurement primitives

/// Errors that can occur while sampling a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Reading out of expected range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

/// Supply voltage measurement
pub trait VoltageSensor {
    /// Read the supply voltage in millivolts
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read_millivolts(&mut self) -> Result<u16, SensorError>;
}

/// Junction / board temperature measurement
///
/// Implementations should handle the specific sensor type (on-die diode,
/// NTC thermistor, etc.)
pub trait TemperatureSensor {
    /// Read the current temperature in 0.1°C units
    ///
    /// For example, 45.5°C is returned as 455.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Read the current temperature in whole degrees Celsius
    fn read_celsius(&mut self) -> Result<i16, SensorError> {
        self.read_celsius_x10().map(|t| t / 10)
    }
}

/// Result of a clock integrity measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockReading {
    /// Clock running; deviation from the reference in parts per million
    Running { drift_ppm: i32 },
    /// No edges seen from the monitored clock since the last measurement
    Lost,
    /// Not enough reference time has passed to produce a measurement
    Pending,
}

/// Clock integrity monitor
///
/// Compares the system clock against an independent reference
/// (e.g. a low-speed RC oscillator or an external crystal).
pub trait ClockMonitor {
    /// Measure the system clock against the reference
    fn measure(&mut self) -> ClockReading;
}
