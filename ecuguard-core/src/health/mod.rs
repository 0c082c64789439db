//! ECU health monitoring
//!
//! Supply voltage, temperature, clock and memory checks feeding a fault log,
//! an active-fault registry and the severity escalation policy.

pub mod codes;
pub mod monitor;
pub mod probes;
pub mod registry;
pub mod state;

pub use codes::{FaultCode, HealthFaultRecord, Severity};
pub use monitor::{FaultNotifier, HealthMonitor, HEALTH_LOG_CAPACITY};
pub use probes::{HealthProbes, NoClockMonitor, Probes};
pub use registry::ActiveFaults;
pub use state::{MonitorEvent, MonitorState};
