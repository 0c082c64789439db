//! STM32 adapter for the ECU Guard safety monitor
//!
//! Implements the `ecuguard-hal` traits on STM32F4 parts (Cortex-M4):
//!
//! - SCB fault-status registers and exception frame access
//! - IWDG countdown through embassy-stm32
//! - Blocking ADC inputs for the divider and NTC drivers
//! - DWT cycle counter for clock drift measurement
//! - Reset-persistent SRAM store and reset-cause flags
//!
//! # Features
//!
//! - `stm32f407vg`, `stm32f446re` - Chip selection
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod adc;
pub mod clock;
pub mod fault;
pub mod iwdg;
pub mod reset;
pub mod storage;

pub use clock::{DwtCycles, EmbassyClock};
pub use fault::{ExceptionFrameExt, RawFrame, ScbFaultRegisters};
pub use iwdg::Iwdg;
pub use storage::RetainedSram;
