//! Sensor and self-test implementations
//!
//! This crate provides concrete implementations of the traits defined in
//! ecuguard-hal that need no direct chip access:
//!
//! - Supply voltage through a resistor divider
//! - NTC thermistor temperature sensing
//! - Pattern RAM test and incremental flash CRC check
//! - Clock drift measurement against a reference timebase

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adc;
pub mod clock;
pub mod memory;
pub mod sensor;

pub use adc::AdcReader;
