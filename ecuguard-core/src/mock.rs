//! Host-side test doubles for the hardware and collaborator traits

use core::cell::{Cell, RefCell};

use ecuguard_hal::{
    Clock, ClockReading, FaultStatus, FaultStatusRegisters, MemoryError, PersistentStore,
    SensorError, WatchdogTimer,
};
use heapless::Vec;

use crate::diag::{DiagCode, DiagLevel, DiagnosticSink};
use crate::health::HealthProbes;
use crate::safe_state::{DegradeReason, SafeStateController, SafeStateReason};

/// Manually advanced millisecond clock
pub struct MockClock {
    now: Cell<u32>,
}

impl MockClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagEntry {
    pub level: DiagLevel,
    pub code: DiagCode,
    pub payload: [u32; 2],
}

/// Sink that remembers every message
pub struct DiagRecorder {
    entries: RefCell<Vec<DiagEntry, 64>>,
}

impl DiagRecorder {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn count(&self, code: DiagCode) -> usize {
        self.entries.borrow().iter().filter(|e| e.code == code).count()
    }

    pub fn find(&self, code: DiagCode) -> Option<DiagEntry> {
        self.entries.borrow().iter().find(|e| e.code == code).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DiagnosticSink for &DiagRecorder {
    fn log(&mut self, level: DiagLevel, code: DiagCode, payload: &[u32]) {
        let mut words = [0u32; 2];
        for (dst, src) in words.iter_mut().zip(payload) {
            *dst = *src;
        }
        let _ = self.entries.borrow_mut().push(DiagEntry {
            level,
            code,
            payload: words,
        });
    }
}

/// Controller that records transitions instead of acting on them
pub struct SafeStateRecorder {
    safe: RefCell<Vec<SafeStateReason, 8>>,
    degraded: RefCell<Vec<DegradeReason, 8>>,
}

impl SafeStateRecorder {
    pub fn new() -> Self {
        Self {
            safe: RefCell::new(Vec::new()),
            degraded: RefCell::new(Vec::new()),
        }
    }

    pub fn safe_state_calls(&self) -> usize {
        self.safe.borrow().len()
    }

    pub fn first_safe_state(&self) -> Option<SafeStateReason> {
        self.safe.borrow().first().copied()
    }

    pub fn last_safe_state(&self) -> Option<SafeStateReason> {
        self.safe.borrow().last().copied()
    }

    pub fn degraded_calls(&self) -> usize {
        self.degraded.borrow().len()
    }

    pub fn last_degraded(&self) -> Option<DegradeReason> {
        self.degraded.borrow().last().copied()
    }
}

impl SafeStateController for &SafeStateRecorder {
    fn enter_safe_state(&mut self, reason: SafeStateReason) {
        let _ = self.safe.borrow_mut().push(reason);
    }

    fn enter_degraded_mode(&mut self, reason: DegradeReason) {
        let _ = self.degraded.borrow_mut().push(reason);
    }
}

/// Watchdog peripheral that counts register accesses
#[derive(Debug, Default)]
pub struct MockWatchdogTimer {
    pub programmed_ms: Option<u32>,
    pub enabled: bool,
    pub refreshes: u32,
}

impl WatchdogTimer for MockWatchdogTimer {
    fn program(&mut self, timeout_ms: u32) {
        self.programmed_ms = Some(timeout_ms);
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

/// Fault-status registers backed by a plain snapshot
#[derive(Debug, Default)]
pub struct MockFaultRegisters {
    pub status: FaultStatus,
    pub cleared: Option<FaultStatus>,
}

impl FaultStatusRegisters for MockFaultRegisters {
    fn read(&self) -> FaultStatus {
        self.status
    }

    fn clear(&mut self, latched: &FaultStatus) {
        self.cleared = Some(*latched);
        self.status.cfsr &= !latched.cfsr;
        self.status.hfsr &= !latched.hfsr;
    }
}

/// Persistent store that counts flush requests
#[derive(Debug, Default)]
pub struct CountingStore {
    pub flushes: u32,
}

impl PersistentStore for CountingStore {
    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Sensor values the test sets between monitor ticks
pub struct ProbeState {
    pub voltage: Cell<Result<u16, SensorError>>,
    pub temperature: Cell<Result<i16, SensorError>>,
    pub clock: Cell<ClockReading>,
    pub ram: Cell<Result<(), MemoryError>>,
    pub flash: Cell<Result<(), MemoryError>>,
    pub ram_patterns: Cell<u32>,
}

impl ProbeState {
    /// Healthy 13.8 V / 25°C board
    pub fn nominal() -> Self {
        Self {
            voltage: Cell::new(Ok(13_800)),
            temperature: Cell::new(Ok(25)),
            clock: Cell::new(ClockReading::Running { drift_ppm: 0 }),
            ram: Cell::new(Ok(())),
            flash: Cell::new(Ok(())),
            ram_patterns: Cell::new(0),
        }
    }

    pub fn set_voltage(&self, mv: u16) {
        self.voltage.set(Ok(mv));
    }

    pub fn set_temperature(&self, c: i16) {
        self.temperature.set(Ok(c));
    }
}

impl HealthProbes for &ProbeState {
    fn read_supply_mv(&mut self) -> Result<u16, SensorError> {
        self.voltage.get()
    }

    fn read_temperature_c(&mut self) -> Result<i16, SensorError> {
        self.temperature.get()
    }

    fn measure_clock(&mut self) -> ClockReading {
        self.clock.get()
    }

    fn test_ram(&mut self, _pattern: u8) -> Result<(), MemoryError> {
        self.ram_patterns.set(self.ram_patterns.get() + 1);
        self.ram.get()
    }

    fn verify_flash(&mut self) -> Result<(), MemoryError> {
        self.flash.get()
    }
}
