//! Sensor bundle sampled by the health monitor

use ecuguard_hal::{
    ClockMonitor, ClockReading, MemoryError, MemoryTester, SensorError, TemperatureSensor,
    VoltageSensor,
};

/// Everything the health monitor samples on a check
///
/// Every method must return within the tick budget: no waiting on
/// conversions that are not already complete.
pub trait HealthProbes {
    /// Supply voltage in millivolts
    fn read_supply_mv(&mut self) -> Result<u16, SensorError>;

    /// Temperature in whole degrees Celsius
    fn read_temperature_c(&mut self) -> Result<i16, SensorError>;

    fn measure_clock(&mut self) -> ClockReading;

    fn test_ram(&mut self, pattern: u8) -> Result<(), MemoryError>;

    fn verify_flash(&mut self) -> Result<(), MemoryError>;
}

/// [`HealthProbes`] assembled from individual HAL sensors
pub struct Probes<V, T, K, M> {
    pub voltage: V,
    pub temperature: T,
    pub clock: K,
    pub memory: M,
}

impl<V, T, K, M> Probes<V, T, K, M> {
    pub fn new(voltage: V, temperature: T, clock: K, memory: M) -> Self {
        Self {
            voltage,
            temperature,
            clock,
            memory,
        }
    }
}

impl<V, T, K, M> HealthProbes for Probes<V, T, K, M>
where
    V: VoltageSensor,
    T: TemperatureSensor,
    K: ClockMonitor,
    M: MemoryTester,
{
    fn read_supply_mv(&mut self) -> Result<u16, SensorError> {
        self.voltage.read_millivolts()
    }

    fn read_temperature_c(&mut self) -> Result<i16, SensorError> {
        self.temperature.read_celsius()
    }

    fn measure_clock(&mut self) -> ClockReading {
        self.clock.measure()
    }

    fn test_ram(&mut self, pattern: u8) -> Result<(), MemoryError> {
        self.memory.test_ram(pattern)
    }

    fn verify_flash(&mut self) -> Result<(), MemoryError> {
        self.memory.verify_flash()
    }
}

/// Placeholder for boards without a clock reference
///
/// Pair it with `enable_clock_monitor = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClockMonitor;

impl ClockMonitor for NoClockMonitor {
    fn measure(&mut self) -> ClockReading {
        ClockReading::Pending
    }
}
