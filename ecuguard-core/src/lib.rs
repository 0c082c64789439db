//! Board-agnostic safety monitoring core for an automotive ECU
//!
//! This crate contains all decision logic that does not depend on a
//! specific microcontroller:
//!
//! - Watchdog supervision with refresh timing checks
//! - CPU fault classification and recovery policy
//! - Integrity-protected CPU fault log
//! - ECU health monitor (voltage, temperature, clock, memory)
//! - Configuration types
//!
//! Hardware access goes through the `ecuguard-hal` traits. Reporting and
//! escalation go through [`diag::DiagnosticSink`] and
//! [`safe_state::SafeStateController`], implemented by the firmware.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod diag;
pub mod fault;
pub mod health;
pub mod safe_state;
pub mod watchdog;

#[cfg(test)]
mod mock;

pub use diag::{DiagCode, DiagLevel, DiagnosticSink};
pub use safe_state::{DegradeReason, ResetRequired, SafeStateController, SafeStateReason};
