//! Watchdog with kick-timing monitoring

use ecuguard_hal::{Clock, WatchdogTimer};

use crate::diag::{DiagCode, DiagnosticSink};
use crate::safe_state::{ResetRequired, SafeStateController, SafeStateReason};

/// Default timeout, used when the requested one is out of range
pub const DEFAULT_TIMEOUT_MS: u32 = 100;
/// Shortest accepted timeout
pub const MIN_TIMEOUT_MS: u32 = 10;
/// Longest accepted timeout
pub const MAX_TIMEOUT_MS: u32 = 1000;
/// Allowed lateness relative to the expected kick interval
pub const TIMING_TOLERANCE_PERCENT: u32 = 10;

/// Diagnostic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogStats {
    pub kick_count: u32,
    pub late_kick_count: u32,
    pub timeout_ms: u32,
    pub is_running: bool,
}

impl WatchdogStats {
    /// Late kicks per thousand kicks
    pub fn late_ratio_permille(&self) -> u32 {
        if self.kick_count == 0 {
            return 0;
        }
        ((self.late_kick_count as u64 * 1000) / self.kick_count as u64) as u32
    }
}

/// Hardware watchdog wrapper with timing monitoring
///
/// One instance per ECU, owned by the firmware and created once at boot.
/// The hardware is programmed only by [`start`](Self::start), which
/// succeeds once.
pub struct Watchdog<H, C, D> {
    hardware: H,
    clock: C,
    diag: D,
    timeout_ms: u32,
    started: bool,
    last_kick_ms: u32,
    kick_count: u32,
    late_kick_count: u32,
}

impl<H: WatchdogTimer, C: Clock, D: DiagnosticSink> Watchdog<H, C, D> {
    /// Create a watchdog with the given timeout
    ///
    /// An out-of-range timeout falls back to [`DEFAULT_TIMEOUT_MS`] and is
    /// reported as an error diagnostic. The hardware is not touched.
    pub fn new(hardware: H, clock: C, diag: D, timeout_ms: u32) -> Self {
        let mut watchdog = Self {
            hardware,
            clock,
            diag,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            started: false,
            last_kick_ms: 0,
            kick_count: 0,
            late_kick_count: 0,
        };
        watchdog.configure(timeout_ms);
        watchdog
    }

    /// Set the timeout period
    ///
    /// Returns `false` if the value was replaced by the default or if the
    /// watchdog is already running (the running timeout is kept).
    pub fn configure(&mut self, timeout_ms: u32) -> bool {
        if self.started {
            self.diag
                .warn(DiagCode::WdtReconfigureRejected, &[timeout_ms]);
            return false;
        }

        let accepted = (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms);
        if accepted {
            self.timeout_ms = timeout_ms;
        } else {
            self.diag.error(DiagCode::WdtInvalidTimeout, &[timeout_ms]);
            self.timeout_ms = DEFAULT_TIMEOUT_MS;
        }

        self.diag.info(DiagCode::WdtInit, &[self.timeout_ms]);
        accepted
    }

    /// Program and enable the hardware countdown
    ///
    /// A second call is rejected with a warning; the watchdog keeps running.
    pub fn start(&mut self) -> bool {
        if self.started {
            self.diag.warn(DiagCode::WdtAlreadyStarted, &[]);
            return false;
        }

        self.hardware.program(self.timeout_ms);
        self.hardware.enable();

        self.started = true;
        self.last_kick_ms = self.clock.now_ms();

        self.diag.info(DiagCode::WdtStarted, &[self.timeout_ms]);
        true
    }

    /// Refresh the watchdog
    ///
    /// The hardware is always refreshed once started, even when the kick is
    /// late. Returns `true` if the kick was within the timing window, `false`
    /// if it was late or the watchdog was never started.
    pub fn kick(&mut self) -> bool {
        if !self.started {
            return false;
        }

        let now = self.clock.now_ms();
        let elapsed = now.wrapping_sub(self.last_kick_ms);

        let expected = self.expected_interval_ms();
        let tolerance = self.tolerance_ms();

        let on_time = elapsed < expected + tolerance;
        if !on_time {
            self.late_kick_count = self.late_kick_count.wrapping_add(1);
            self.diag.warn(DiagCode::WdtLateKick, &[elapsed, expected]);
        }

        self.hardware.refresh();

        self.last_kick_ms = now;
        self.kick_count = self.kick_count.wrapping_add(1);

        on_time
    }

    /// Interval the application is expected to kick at (half the timeout)
    pub fn expected_interval_ms(&self) -> u32 {
        self.timeout_ms / 2
    }

    /// Allowed lateness on top of the expected interval
    pub fn tolerance_ms(&self) -> u32 {
        (self.expected_interval_ms() * TIMING_TOLERANCE_PERCENT) / 100
    }

    /// Snapshot of the diagnostic counters
    pub fn stats(&self) -> WatchdogStats {
        WatchdogStats {
            kick_count: self.kick_count,
            late_kick_count: self.late_kick_count,
            timeout_ms: self.timeout_ms,
            is_running: self.started,
        }
    }

    /// Watchdog interrupt body
    ///
    /// Runs only when the countdown expired because `kick` was not called in
    /// time. Logs an emergency diagnostic and requests the safe state; the
    /// caller must force a reset afterwards.
    ///
    /// Only timers with an early-warning interrupt can call this before the
    /// hardware reset. The STM32 IWDG has none; there the expiry shows up as
    /// the reset cause at the next boot.
    pub fn on_expiry<S: SafeStateController>(&mut self, safe_state: &mut S) -> ResetRequired {
        self.diag.emergency(DiagCode::WdtTimeout, &[self.timeout_ms]);

        let reason = SafeStateReason::WatchdogTimeout;
        safe_state.enter_safe_state(reason);
        ResetRequired(reason)
    }

    /// Get access to the underlying hardware
    pub fn hardware(&self) -> &H {
        &self.hardware
    }
}
