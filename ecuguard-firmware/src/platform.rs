//! Board bindings for the safety core seams

use defmt::*;
use ecuguard_core::{
    DegradeReason, DiagCode, DiagLevel, DiagnosticSink, SafeStateController, SafeStateReason,
};
use embassy_stm32::pac;
use portable_atomic::{AtomicBool, Ordering};

/// Actuator supply enable on PE0, active high
pub const ACTUATOR_ENABLE_PIN: usize = 0;

static DEGRADED: AtomicBool = AtomicBool::new(false);

/// Whether the unit is running with reduced capability
pub fn is_degraded() -> bool {
    DEGRADED.load(Ordering::Acquire)
}

/// Diagnostics over defmt-rtt
#[derive(Debug, Clone, Copy, Default)]
pub struct DefmtSink;

impl DiagnosticSink for DefmtSink {
    fn log(&mut self, level: DiagLevel, code: DiagCode, payload: &[u32]) {
        match level {
            DiagLevel::Info => info!("{} {:#x}", code, payload),
            DiagLevel::Warn => warn!("{} {:#x}", code, payload),
            DiagLevel::Error => error!("{} {:#x}", code, payload),
            DiagLevel::Emergency => error!("EMERGENCY {} {:#x}", code, payload),
        }
    }
}

/// Drops the actuator supply and resets, or flags degraded operation
///
/// Usable from exception context: output control goes through the atomic
/// GPIO set/reset register rather than an owned pin driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcuSafeState;

impl EcuSafeState {
    fn cut_outputs() {
        pac::GPIOE
            .bsrr()
            .write(|w| w.set_br(ACTUATOR_ENABLE_PIN, true));
    }
}

impl SafeStateController for EcuSafeState {
    fn enter_safe_state(&mut self, reason: SafeStateReason) {
        Self::cut_outputs();
        error!("Safe state: {}", reason);
        cortex_m::peripheral::SCB::sys_reset();
    }

    fn enter_degraded_mode(&mut self, reason: DegradeReason) {
        if !DEGRADED.swap(true, Ordering::AcqRel) {
            warn!("Degraded mode: {}", reason);
        }
    }
}
