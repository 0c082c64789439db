//! Health fault codes, severities and records

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diag::DiagLevel;

/// Fault codes for the ECU health monitor
///
/// The high byte groups the code by subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum FaultCode {
    /// No fault; as an acknowledgment target it means "all faults"
    #[default]
    NoFault = 0x0000,

    // Voltage faults (0x01xx)
    Undervoltage = 0x0100,
    Overvoltage = 0x0101,
    /// Supply sample could not be taken
    VoltageUnstable = 0x0102,

    // Temperature faults (0x02xx)
    OvertemperatureWarn = 0x0200,
    OvertemperatureShut = 0x0201,
    UndertemperatureWarn = 0x0202,
    UndertemperatureShut = 0x0203,
    /// Temperature sample could not be taken
    TemperatureSensorFault = 0x0204,

    // Clock faults (0x03xx)
    ClockDrift = 0x0300,
    ClockLost = 0x0301,

    // Memory faults (0x04xx)
    RamError = 0x0400,
    FlashError = 0x0401,
    StackOverflow = 0x0402,

    // Watchdog faults (0x05xx)
    WatchdogReset = 0x0500,
    WatchdogTimeout = 0x0501,

    // Communication faults (0x06xx)
    CanBusOff = 0x0600,
    CanErrorPassive = 0x0601,
    LinNoResponse = 0x0602,
}

impl FaultCode {
    /// Every code that can be active, in bit order
    pub const ALL: [FaultCode; 19] = [
        FaultCode::Undervoltage,
        FaultCode::Overvoltage,
        FaultCode::VoltageUnstable,
        FaultCode::OvertemperatureWarn,
        FaultCode::OvertemperatureShut,
        FaultCode::UndertemperatureWarn,
        FaultCode::UndertemperatureShut,
        FaultCode::TemperatureSensorFault,
        FaultCode::ClockDrift,
        FaultCode::ClockLost,
        FaultCode::RamError,
        FaultCode::FlashError,
        FaultCode::StackOverflow,
        FaultCode::WatchdogReset,
        FaultCode::WatchdogTimeout,
        FaultCode::CanBusOff,
        FaultCode::CanErrorPassive,
        FaultCode::LinNoResponse,
        FaultCode::NoFault,
    ];

    /// Get the code as its numeric value
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Create a code from its numeric value
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_u16() == value)
    }

    /// Bit index in the active-fault bitmap (`None` for [`FaultCode::NoFault`])
    pub fn bit(self) -> Option<u32> {
        let index = match self {
            FaultCode::NoFault => return None,
            FaultCode::Undervoltage => 0,
            FaultCode::Overvoltage => 1,
            FaultCode::VoltageUnstable => 2,
            FaultCode::OvertemperatureWarn => 3,
            FaultCode::OvertemperatureShut => 4,
            FaultCode::UndertemperatureWarn => 5,
            FaultCode::UndertemperatureShut => 6,
            FaultCode::TemperatureSensorFault => 7,
            FaultCode::ClockDrift => 8,
            FaultCode::ClockLost => 9,
            FaultCode::RamError => 10,
            FaultCode::FlashError => 11,
            FaultCode::StackOverflow => 12,
            FaultCode::WatchdogReset => 13,
            FaultCode::WatchdogTimeout => 14,
            FaultCode::CanBusOff => 15,
            FaultCode::CanErrorPassive => 16,
            FaultCode::LinNoResponse => 17,
        };
        Some(index)
    }

    /// Severity used when a collaborator reports this code
    pub fn default_severity(self) -> Severity {
        match self {
            FaultCode::NoFault => Severity::Info,
            FaultCode::Undervoltage
            | FaultCode::Overvoltage
            | FaultCode::OvertemperatureWarn
            | FaultCode::UndertemperatureWarn
            | FaultCode::WatchdogReset
            | FaultCode::CanErrorPassive => Severity::Warning,
            FaultCode::VoltageUnstable
            | FaultCode::TemperatureSensorFault
            | FaultCode::ClockDrift
            | FaultCode::CanBusOff
            | FaultCode::LinNoResponse => Severity::Error,
            FaultCode::OvertemperatureShut
            | FaultCode::UndertemperatureShut
            | FaultCode::ClockLost
            | FaultCode::RamError
            | FaultCode::FlashError
            | FaultCode::StackOverflow
            | FaultCode::WatchdogTimeout => Severity::Critical,
        }
    }
}

/// Fault severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Severity {
    /// Informational only
    #[default]
    Info = 0,
    /// Continue with caution
    Warning = 1,
    /// Degraded operation
    Error = 2,
    /// Immediate safe state
    Critical = 3,
}

impl Severity {
    /// Diagnostic level a fault of this severity is reported at
    pub fn diag_level(self) -> DiagLevel {
        match self {
            Severity::Info => DiagLevel::Info,
            Severity::Warning => DiagLevel::Warn,
            Severity::Error => DiagLevel::Error,
            Severity::Critical => DiagLevel::Emergency,
        }
    }
}

/// Health fault log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HealthFaultRecord {
    /// Time of fault detection
    pub timestamp_ms: u32,
    pub code: FaultCode,
    pub severity: Severity,
    /// Fault-specific data (sampled value, failing offset, ...)
    pub data: u16,
}
