//! ECU Guard Hardware Abstraction Layer
//!
//! This crate defines the hardware primitives the safety core consumes.
//! Chip-specific adapters implement them, which keeps the watchdog, fault
//! classifier and health monitor platform-independent and testable on the
//! host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (ecuguard-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ecuguard-core (watchdog/fault/health)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ecuguard-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ ecuguard-hal- │       │  ecuguard-    │
//! │    stm32      │       │   drivers     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`clock::Clock`] - Monotonic millisecond timestamp
//! - [`watchdog::WatchdogTimer`] - Hardware countdown program/enable/refresh
//! - [`fault::FaultStatusRegisters`] - CPU fault-status read/clear
//! - [`sensor::VoltageSensor`], [`sensor::TemperatureSensor`] - Raw samples
//! - [`sensor::ClockMonitor`] - Clock integrity measurement
//! - [`memory::MemoryTester`] - RAM/flash integrity tests
//! - [`storage::PersistentStore`] - Reset-persistent storage flush

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod fault;
pub mod memory;
pub mod sensor;
pub mod storage;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use fault::{FaultStatus, FaultStatusRegisters};
pub use memory::{MemoryError, MemoryTester};
pub use sensor::{ClockMonitor, ClockReading, SensorError, TemperatureSensor, VoltageSensor};
pub use storage::PersistentStore;
pub use watchdog::WatchdogTimer;
