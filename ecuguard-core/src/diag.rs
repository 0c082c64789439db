//! Diagnostic log sink
//!
//! The core reports every notable event through [`DiagnosticSink`]. The sink
//! owns formatting and transport; the core calls it synchronously and never
//! depends on it succeeding.

/// Diagnostic message level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagLevel {
    Info,
    Warn,
    Error,
    /// Last message before a safe-state transition
    Emergency,
}

/// Diagnostic event codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum DiagCode {
    /// Watchdog configured (payload: timeout ms)
    WdtInit = 0x0010,
    /// Requested timeout outside 10..=1000 ms (payload: requested ms)
    WdtInvalidTimeout = 0x0011,
    /// Watchdog hardware enabled (payload: timeout ms)
    WdtStarted = 0x0012,
    /// Second start attempt
    WdtAlreadyStarted = 0x0013,
    /// Kick outside the timing window (payload: elapsed ms, expected ms)
    WdtLateKick = 0x0014,
    /// Watchdog interrupt fired
    WdtTimeout = 0x0015,
    /// Timeout change after start (payload: requested ms)
    WdtReconfigureRejected = 0x0016,

    /// CPU exception captured (payload: pc, cfsr)
    CpuFault = 0x0020,
    /// CPU fault log cleared by operator
    FaultLogCleared = 0x0021,
    /// Fault log region recovered after reset (payload: record count)
    FaultLogRestored = 0x0022,
    /// Fault log region unrecognised and reinitialised
    FaultLogInitialized = 0x0023,

    /// Health monitor started (payload: interval ms)
    MonitorStarted = 0x0030,
    /// Health monitor start rejected, already running
    MonitorAlreadyRunning = 0x0031,
    /// Health monitor stopped
    MonitorStopped = 0x0032,
    /// Health fault logged (payload: fault code, data)
    HealthFault = 0x0033,
    /// Latched health condition returned to normal (payload: fault code)
    HealthRecovered = 0x0034,
    /// Monitor configuration corrected to defaults (payload: corrected fields)
    ConfigCorrected = 0x0035,
}

impl DiagCode {
    /// Get the code as its numeric value
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Diagnostic log sink
///
/// Called from both foreground and exception context: implementations must
/// not block, allocate, or re-enter the component that is reporting.
pub trait DiagnosticSink {
    /// Emit a diagnostic message with up to a few numeric payload words
    fn log(&mut self, level: DiagLevel, code: DiagCode, payload: &[u32]);

    fn info(&mut self, code: DiagCode, payload: &[u32]) {
        self.log(DiagLevel::Info, code, payload);
    }

    fn warn(&mut self, code: DiagCode, payload: &[u32]) {
        self.log(DiagLevel::Warn, code, payload);
    }

    fn error(&mut self, code: DiagCode, payload: &[u32]) {
        self.log(DiagLevel::Error, code, payload);
    }

    fn emergency(&mut self, code: DiagCode, payload: &[u32]) {
        self.log(DiagLevel::Emergency, code, payload);
    }
}

impl<D: DiagnosticSink + ?Sized> DiagnosticSink for &mut D {
    fn log(&mut self, level: DiagLevel, code: DiagCode, payload: &[u32]) {
        (**self).log(level, code, payload);
    }
}

/// Sink that discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn log(&mut self, _level: DiagLevel, _code: DiagCode, _payload: &[u32]) {}
}
