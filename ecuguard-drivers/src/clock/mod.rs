//! Clock integrity measurement

pub mod drift;

pub use drift::{CycleCounter, DriftMonitor, DriftWindow};
