//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use ecuguard_core::health::{FaultCode, HealthFaultRecord};

/// Channel capacity for published health faults
const HEALTH_FAULT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for externally reported faults
const FAULT_REPORT_CHANNEL_SIZE: usize = 8;

/// Health faults logged by the monitor (notifier output)
///
/// Records are dropped when the consumer falls behind; the monitor's own
/// log keeps them.
pub static HEALTH_FAULTS: Channel<
    CriticalSectionRawMutex,
    HealthFaultRecord,
    HEALTH_FAULT_CHANNEL_SIZE,
> = Channel::new();

/// Faults detected outside the monitor (bus drivers, boot checks)
pub static FAULT_REPORTS: Channel<
    CriticalSectionRawMutex,
    (FaultCode, u16),
    FAULT_REPORT_CHANNEL_SIZE,
> = Channel::new();

/// Set by the health task after every monitor tick
pub static HEALTH_HEARTBEAT: Signal<CriticalSectionRawMutex, ()> = Signal::new();
