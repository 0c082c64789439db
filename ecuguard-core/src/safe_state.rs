//! Safe-state and degraded-mode controller seam
//!
//! The actuation itself (cutting outputs, forcing a reset) lives outside
//! the core. Both the fault classifier and the health monitor escalate
//! through [`SafeStateController`].

use crate::health::FaultCode;

/// Why the unit is entering the safe state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafeStateReason {
    /// Watchdog countdown expired
    WatchdogTimeout,
    /// Fatal CPU exception
    CpuFault,
    /// Critical health fault
    HealthCritical(FaultCode),
}

/// Why the unit is entering degraded mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DegradeReason {
    /// Precise or imprecise data bus error
    BusFault,
    /// Error-severity health fault
    HealthFault(FaultCode),
}

/// Safe-state / degraded-mode controller
pub trait SafeStateController {
    /// Enter the terminal safe state
    ///
    /// Implementations cut outputs and force a reset; callers treat control
    /// coming back as a failure that still requires a reset.
    fn enter_safe_state(&mut self, reason: SafeStateReason);

    /// Enter reduced-capability operation and return
    fn enter_degraded_mode(&mut self, reason: DegradeReason);
}

impl<S: SafeStateController + ?Sized> SafeStateController for &mut S {
    fn enter_safe_state(&mut self, reason: SafeStateReason) {
        (**self).enter_safe_state(reason);
    }

    fn enter_degraded_mode(&mut self, reason: DegradeReason) {
        (**self).enter_degraded_mode(reason);
    }
}

/// Marker returned by terminal paths after the safe state was requested
///
/// The platform adapter must force a hardware reset when it receives this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "a hardware reset must be forced if the safe-state controller returns"]
pub struct ResetRequired(pub SafeStateReason);
