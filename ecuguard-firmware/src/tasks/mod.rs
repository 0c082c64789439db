//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod health;
pub mod report;
pub mod watchdog;

pub use health::{health_task, EcuHealthMonitor, EcuProbes};
pub use report::report_task;
pub use watchdog::{watchdog_task, EcuWatchdog};
