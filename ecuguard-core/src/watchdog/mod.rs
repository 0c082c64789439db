//! Watchdog supervision
//!
//! Wraps the hardware countdown and checks the timing discipline of the
//! refresh calls. The hardware watchdog is the last line of defense against
//! a total software hang.

pub mod monitor;

pub use monitor::{
    Watchdog, WatchdogStats, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
    TIMING_TOLERANCE_PERCENT,
};
