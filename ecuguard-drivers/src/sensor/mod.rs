//! Voltage and temperature sensors

pub mod divider;
pub mod ntc;

pub use divider::DividerVoltageSensor;
pub use ntc::NtcSensor;
