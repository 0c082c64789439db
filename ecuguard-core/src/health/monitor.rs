//! ECU health monitor
//!
//! Periodically samples supply voltage, die temperature, clock integrity and
//! memory, logs out-of-range conditions and escalates them by severity:
//!
//! - Warning: logged and reported only
//! - Error: degraded mode
//! - Critical: safe state
//!
//! Conditions are edge-triggered. A fault is logged when its condition is
//! entered; it is not logged again until the condition has cleared (with
//! hysteresis) and re-entered.

use ecuguard_hal::{Clock, ClockReading, MemoryError};
use heapless::HistoryBuffer;

use super::codes::{FaultCode, HealthFaultRecord, Severity};
use super::probes::HealthProbes;
use super::registry::ActiveFaults;
use super::state::{MonitorEvent, MonitorState};
use crate::config::MonitorConfig;
use crate::diag::{DiagCode, DiagnosticSink};
use crate::safe_state::{DegradeReason, SafeStateController, SafeStateReason};

/// Number of health fault records kept
pub const HEALTH_LOG_CAPACITY: usize = 64;

/// Receives every logged health fault, synchronously
pub trait FaultNotifier {
    fn notify(&mut self, record: &HealthFaultRecord);
}

impl<F> FaultNotifier for F
where
    F: FnMut(&HealthFaultRecord),
{
    fn notify(&mut self, record: &HealthFaultRecord) {
        self(record)
    }
}

/// ECU health monitor
pub struct HealthMonitor<C, P, S, D, N> {
    config: MonitorConfig,
    clock: C,
    probes: P,
    safe_state: S,
    diag: D,
    notifier: N,
    state: MonitorState,
    last_check_ms: u32,
    /// Last sampled supply voltage
    voltage_mv: u16,
    /// Last sampled temperature
    temperature_c: i16,
    /// Conditions currently latched, for edge detection
    conditions: ActiveFaults,
    /// Unacknowledged faults
    active: ActiveFaults,
    log: HistoryBuffer<HealthFaultRecord, HEALTH_LOG_CAPACITY>,
}

impl<C, P, S, D, N> HealthMonitor<C, P, S, D, N>
where
    C: Clock,
    P: HealthProbes,
    S: SafeStateController,
    D: DiagnosticSink,
    N: FaultNotifier,
{
    /// Create a stopped monitor
    ///
    /// Inconsistent configuration fields are replaced by defaults and
    /// reported as a `ConfigCorrected` diagnostic.
    pub fn new(
        mut config: MonitorConfig,
        clock: C,
        probes: P,
        safe_state: S,
        mut diag: D,
        notifier: N,
    ) -> Self {
        let corrected = config.sanitize();
        if !corrected.is_empty() {
            diag.error(DiagCode::ConfigCorrected, &[corrected.bits() as u32]);
        }

        Self {
            config,
            clock,
            probes,
            safe_state,
            diag,
            notifier,
            state: MonitorState::Stopped,
            last_check_ms: 0,
            voltage_mv: 0,
            temperature_c: 0,
            conditions: ActiveFaults::new(),
            active: ActiveFaults::new(),
            log: HistoryBuffer::new(),
        }
    }

    /// Begin periodic checking
    ///
    /// Returns `false` if the monitor is already running.
    pub fn start(&mut self) -> bool {
        match self.state.transition(MonitorEvent::Start) {
            Some(next) => {
                self.state = next;
                self.last_check_ms = self.clock.now_ms();
                self.diag
                    .info(DiagCode::MonitorStarted, &[self.config.check_interval_ms]);
                true
            }
            None => {
                self.diag.warn(DiagCode::MonitorAlreadyRunning, &[]);
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if self.state.is_running() {
            self.diag.info(DiagCode::MonitorStopped, &[]);
        }
        if let Some(next) = self.state.transition(MonitorEvent::Stop) {
            self.state = next;
        }
    }

    /// Periodic entry point
    ///
    /// Runs the checks when the monitor is running and the check interval
    /// has elapsed since the previous check. Never blocks.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            return;
        }

        let now = self.clock.now_ms();
        if now.wrapping_sub(self.last_check_ms) < self.config.check_interval_ms {
            return;
        }
        self.last_check_ms = now;

        let _ = self.run_checks();
    }

    /// Run every check immediately, regardless of state and interval
    ///
    /// Returns `true` when all checks passed.
    pub fn check_now(&mut self) -> bool {
        self.run_checks()
    }

    /// Log a fault detected by another component (bus driver, watchdog, ...)
    ///
    /// Uses the code's default severity. [`FaultCode::NoFault`] is ignored.
    pub fn report_fault(&mut self, code: FaultCode, data: u16) {
        if code == FaultCode::NoFault {
            return;
        }
        self.log_fault(code, code.default_severity(), data);
    }

    /// Remove a fault from the active set; `NoFault` removes all
    ///
    /// The fault log is not touched.
    pub fn acknowledge_fault(&mut self, code: FaultCode) {
        self.active.acknowledge(code);
    }

    /// Copy up to `out.len()` of the most recent log records into `out`,
    /// oldest first
    pub fn fault_log(&self, out: &mut [HealthFaultRecord]) -> usize {
        let skip = self.log.len().saturating_sub(out.len());
        let mut written = 0;
        for (dst, record) in out.iter_mut().zip(self.log.oldest_ordered().skip(skip)) {
            *dst = *record;
            written += 1;
        }
        written
    }

    /// Iterate the fault log, oldest first
    pub fn fault_records(&self) -> impl Iterator<Item = &HealthFaultRecord> + '_ {
        self.log.oldest_ordered()
    }

    pub fn clear_fault_log(&mut self) {
        self.log.clear();
    }

    pub fn active_fault_count(&self) -> usize {
        self.active.count()
    }

    pub fn is_fault_active(&self, code: FaultCode) -> bool {
        self.active.contains(code)
    }

    pub fn active_faults(&self) -> ActiveFaults {
        self.active
    }

    /// Supply voltage from the last check
    pub fn voltage_mv(&self) -> u16 {
        self.voltage_mv
    }

    /// Temperature from the last check
    pub fn temperature_c(&self) -> i16 {
        self.temperature_c
    }

    /// No voltage condition latched at the last check
    pub fn is_voltage_ok(&self) -> bool {
        !(self.conditions.contains(FaultCode::Undervoltage)
            || self.conditions.contains(FaultCode::Overvoltage)
            || self.conditions.contains(FaultCode::VoltageUnstable))
    }

    /// No temperature condition latched at the last check
    pub fn is_temperature_ok(&self) -> bool {
        !(self.conditions.contains(FaultCode::OvertemperatureWarn)
            || self.conditions.contains(FaultCode::OvertemperatureShut)
            || self.conditions.contains(FaultCode::UndertemperatureWarn)
            || self.conditions.contains(FaultCode::UndertemperatureShut)
            || self.conditions.contains(FaultCode::TemperatureSensorFault))
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn run_checks(&mut self) -> bool {
        let voltage_ok = self.check_voltage();
        let temperature_ok = self.check_temperature();
        let clock_ok = if self.config.enable_clock_monitor {
            self.check_clock()
        } else {
            true
        };
        let memory_ok = self.check_memory();

        voltage_ok && temperature_ok && clock_ok && memory_ok
    }

    fn check_voltage(&mut self) -> bool {
        let mv = match self.probes.read_supply_mv() {
            Ok(mv) => {
                self.settle(FaultCode::VoltageUnstable);
                mv
            }
            Err(_) => {
                self.raise(FaultCode::VoltageUnstable, Severity::Error, 0);
                return false;
            }
        };
        self.voltage_mv = mv;

        let t = self.config.voltage;
        if mv < t.undervolt_mv {
            self.settle(FaultCode::Overvoltage);
            self.raise(FaultCode::Undervoltage, Severity::Warning, mv);
        } else if mv > t.overvolt_mv {
            self.settle(FaultCode::Undervoltage);
            self.raise(FaultCode::Overvoltage, Severity::Warning, mv);
        } else if mv > t.nominal_mv.saturating_sub(t.hysteresis_mv)
            && mv < t.nominal_mv.saturating_add(t.hysteresis_mv)
        {
            self.settle(FaultCode::Undervoltage);
            self.settle(FaultCode::Overvoltage);
        }

        self.is_voltage_ok()
    }

    fn check_temperature(&mut self) -> bool {
        let c = match self.probes.read_temperature_c() {
            Ok(c) => {
                self.settle(FaultCode::TemperatureSensorFault);
                c
            }
            Err(_) => {
                self.raise(FaultCode::TemperatureSensorFault, Severity::Error, 0);
                return false;
            }
        };
        self.temperature_c = c;

        let t = self.config.temperature;
        let data = c as u16;

        if c >= t.shutdown_high_c {
            self.raise(FaultCode::OvertemperatureShut, Severity::Critical, data);
        } else if c < t.shutdown_high_c.saturating_sub(t.hysteresis_c) {
            self.settle(FaultCode::OvertemperatureShut);
        }

        if c >= t.warning_high_c && c < t.shutdown_high_c {
            self.raise(FaultCode::OvertemperatureWarn, Severity::Warning, data);
        } else if c < t.warning_high_c.saturating_sub(t.hysteresis_c) {
            self.settle(FaultCode::OvertemperatureWarn);
        }

        if c <= t.shutdown_low_c {
            self.raise(FaultCode::UndertemperatureShut, Severity::Critical, data);
        } else if c > t.shutdown_low_c.saturating_add(t.hysteresis_c) {
            self.settle(FaultCode::UndertemperatureShut);
        }

        if c <= t.warning_low_c && c > t.shutdown_low_c {
            self.raise(FaultCode::UndertemperatureWarn, Severity::Warning, data);
        } else if c > t.warning_low_c.saturating_add(t.hysteresis_c) {
            self.settle(FaultCode::UndertemperatureWarn);
        }

        self.is_temperature_ok()
    }

    fn check_clock(&mut self) -> bool {
        match self.probes.measure_clock() {
            ClockReading::Lost => {
                self.raise(FaultCode::ClockLost, Severity::Critical, 0);
            }
            ClockReading::Running { drift_ppm } => {
                self.settle(FaultCode::ClockLost);
                let drift = drift_ppm.unsigned_abs();
                if drift > self.config.clock_drift_limit_ppm {
                    let data = drift.min(u16::MAX as u32) as u16;
                    self.raise(FaultCode::ClockDrift, Severity::Error, data);
                } else {
                    self.settle(FaultCode::ClockDrift);
                }
            }
            // No new measurement; keep the latched state
            ClockReading::Pending => {}
        }

        !(self.conditions.contains(FaultCode::ClockLost)
            || self.conditions.contains(FaultCode::ClockDrift))
    }

    fn check_memory(&mut self) -> bool {
        let mut ok = match self.probes.test_ram(self.config.ram_test_pattern) {
            Ok(()) => {
                self.settle(FaultCode::RamError);
                true
            }
            Err(e) => {
                self.raise(FaultCode::RamError, Severity::Critical, memory_fault_data(e));
                false
            }
        };

        if self.config.enable_flash_check {
            match self.probes.verify_flash() {
                Ok(()) => self.settle(FaultCode::FlashError),
                Err(e) => {
                    self.raise(FaultCode::FlashError, Severity::Critical, memory_fault_data(e));
                    ok = false;
                }
            }
        }

        ok
    }

    /// Log `code` if its condition was not already latched
    fn raise(&mut self, code: FaultCode, severity: Severity, data: u16) {
        if self.conditions.contains(code) {
            return;
        }
        self.conditions.set(code);
        self.log_fault(code, severity, data);
    }

    /// Release a latched condition
    fn settle(&mut self, code: FaultCode) {
        if self.conditions.contains(code) {
            self.conditions.acknowledge(code);
            self.diag
                .info(DiagCode::HealthRecovered, &[code.as_u16() as u32]);
        }
    }

    fn log_fault(&mut self, code: FaultCode, severity: Severity, data: u16) {
        let record = HealthFaultRecord {
            timestamp_ms: self.clock.now_ms(),
            code,
            severity,
            data,
        };

        self.log.write(record);
        self.active.set(code);
        self.diag.log(
            severity.diag_level(),
            DiagCode::HealthFault,
            &[code.as_u16() as u32, data as u32],
        );
        self.notifier.notify(&record);

        match severity {
            Severity::Critical => self
                .safe_state
                .enter_safe_state(SafeStateReason::HealthCritical(code)),
            Severity::Error => self
                .safe_state
                .enter_degraded_mode(DegradeReason::HealthFault(code)),
            Severity::Warning | Severity::Info => {}
        }
    }
}

fn memory_fault_data(error: MemoryError) -> u16 {
    match error {
        MemoryError::RamMismatch { offset } => offset,
        MemoryError::FlashChecksum => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagLevel;
    use crate::mock::{DiagRecorder, MockClock, ProbeState, SafeStateRecorder};
    use core::cell::Cell;
    use ecuguard_hal::SensorError;
    use proptest::prelude::*;

    type TestMonitor<'a, N> =
        HealthMonitor<&'a MockClock, &'a ProbeState, &'a SafeStateRecorder, &'a DiagRecorder, N>;

    type Notify = fn(&HealthFaultRecord);

    struct Fixture {
        clock: MockClock,
        probes: ProbeState,
        safe: SafeStateRecorder,
        diag: DiagRecorder,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                clock: MockClock::new(1_000),
                probes: ProbeState::nominal(),
                safe: SafeStateRecorder::new(),
                diag: DiagRecorder::new(),
            }
        }

        fn monitor_with(&self, config: MonitorConfig) -> TestMonitor<'_, Notify> {
            let notify: Notify = |_| {};
            HealthMonitor::new(
                config,
                &self.clock,
                &self.probes,
                &self.safe,
                &self.diag,
                notify,
            )
        }

        fn monitor(&self) -> TestMonitor<'_, Notify> {
            self.monitor_with(MonitorConfig::default())
        }
    }

    fn codes<N>(monitor: &TestMonitor<'_, N>) -> heapless::Vec<FaultCode, 64>
    where
        N: FaultNotifier,
    {
        monitor.fault_records().map(|r| r.code).collect()
    }

    #[test]
    fn test_nominal_board_passes() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        assert!(monitor.check_now());
        assert_eq!(monitor.voltage_mv(), 13_800);
        assert_eq!(monitor.temperature_c(), 25);
        assert!(monitor.is_voltage_ok());
        assert!(monitor.is_temperature_ok());
        assert_eq!(monitor.active_fault_count(), 0);
    }

    #[test]
    fn test_start_rejected_when_running() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        assert!(monitor.start());
        assert!(!monitor.start());
        assert_eq!(fx.diag.count(DiagCode::MonitorAlreadyRunning), 1);
        assert!(monitor.state().is_running());

        monitor.stop();
        assert_eq!(monitor.state(), MonitorState::Stopped);
        assert!(monitor.start());
    }

    #[test]
    fn test_tick_respects_interval() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        // Stopped monitor does nothing
        monitor.tick();
        assert_eq!(fx.probes.ram_patterns.get(), 0);

        monitor.start();
        fx.clock.advance(5);
        monitor.tick();
        assert_eq!(fx.probes.ram_patterns.get(), 0);

        fx.clock.advance(5);
        monitor.tick();
        assert_eq!(fx.probes.ram_patterns.get(), 1);

        monitor.tick();
        assert_eq!(fx.probes.ram_patterns.get(), 1);
    }

    #[test]
    fn test_undervoltage_logged_once() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.set_voltage(8_000);

        for _ in 0..3 {
            assert!(!monitor.check_now());
        }

        assert_eq!(codes(&monitor).as_slice(), &[FaultCode::Undervoltage]);
        let record = monitor.fault_records().next().unwrap();
        assert_eq!(record.severity, Severity::Warning);
        assert_eq!(record.data, 8_000);
        assert_eq!(record.timestamp_ms, 1_000);
        assert!(!monitor.is_voltage_ok());
        assert_eq!(fx.safe.safe_state_calls(), 0);
        assert_eq!(fx.safe.degraded_calls(), 0);
    }

    #[test]
    fn test_voltage_recovers_inside_band() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        fx.probes.set_voltage(8_000);
        monitor.check_now();

        // Back above the threshold but not near nominal: still latched
        fx.probes.set_voltage(10_000);
        monitor.check_now();
        assert!(!monitor.is_voltage_ok());

        fx.probes.set_voltage(13_500);
        assert!(monitor.check_now());
        assert!(monitor.is_voltage_ok());
        assert_eq!(fx.diag.count(DiagCode::HealthRecovered), 1);

        // Still unacknowledged
        assert!(monitor.is_fault_active(FaultCode::Undervoltage));

        // A new dip is a new fault
        fx.probes.set_voltage(8_500);
        monitor.check_now();
        assert_eq!(monitor.fault_records().count(), 2);
    }

    #[test]
    fn test_overvoltage() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.set_voltage(17_000);

        assert!(!monitor.check_now());
        assert!(monitor.is_fault_active(FaultCode::Overvoltage));
    }

    #[test]
    fn test_voltage_read_failure_degrades() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.voltage.set(Err(SensorError::ConversionError));

        assert!(!monitor.check_now());
        assert!(monitor.is_fault_active(FaultCode::VoltageUnstable));
        assert_eq!(
            fx.safe.last_degraded(),
            Some(DegradeReason::HealthFault(FaultCode::VoltageUnstable))
        );
    }

    #[test]
    fn test_overtemperature_shutdown_enters_safe_state_once() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.set_temperature(155);

        monitor.check_now();
        monitor.check_now();

        assert_eq!(fx.safe.safe_state_calls(), 1);
        assert_eq!(
            fx.safe.last_safe_state(),
            Some(SafeStateReason::HealthCritical(FaultCode::OvertemperatureShut))
        );
        let entry = fx.diag.find(DiagCode::HealthFault).unwrap();
        assert_eq!(entry.level, DiagLevel::Emergency);
        assert_eq!(entry.payload, [0x0201, 155]);
    }

    #[test]
    fn test_temperature_warning_hysteresis() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        fx.probes.set_temperature(130);
        monitor.check_now();
        assert!(monitor.is_fault_active(FaultCode::OvertemperatureWarn));
        assert!(!monitor.is_temperature_ok());

        // Inside the hysteresis band
        fx.probes.set_temperature(121);
        monitor.check_now();
        assert!(!monitor.is_temperature_ok());

        fx.probes.set_temperature(119);
        monitor.check_now();
        assert!(monitor.is_temperature_ok());
        assert_eq!(fx.safe.safe_state_calls(), 0);
    }

    #[test]
    fn test_undertemperature() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        fx.probes.set_temperature(-45);
        monitor.check_now();
        assert_eq!(codes(&monitor).as_slice(), &[FaultCode::UndertemperatureWarn]);
        assert_eq!(monitor.fault_records().next().unwrap().data, (-45i16) as u16);

        fx.probes.set_temperature(-60);
        monitor.check_now();
        assert!(monitor.is_fault_active(FaultCode::UndertemperatureShut));
        assert_eq!(fx.safe.safe_state_calls(), 1);
    }

    #[test]
    fn test_temperature_sensor_failure() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.temperature.set(Err(SensorError::OpenCircuit));

        assert!(!monitor.check_now());
        assert!(monitor.is_fault_active(FaultCode::TemperatureSensorFault));
        assert_eq!(fx.safe.degraded_calls(), 1);
    }

    #[test]
    fn test_clock_faults() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        fx.probes.clock.set(ClockReading::Running { drift_ppm: -30_000 });
        assert!(!monitor.check_now());
        assert!(monitor.is_fault_active(FaultCode::ClockDrift));
        assert_eq!(fx.safe.degraded_calls(), 1);

        fx.probes.clock.set(ClockReading::Lost);
        monitor.check_now();
        assert_eq!(
            fx.safe.last_safe_state(),
            Some(SafeStateReason::HealthCritical(FaultCode::ClockLost))
        );
    }

    #[test]
    fn test_clock_monitor_disabled() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor_with(MonitorConfig {
            enable_clock_monitor: false,
            ..Default::default()
        });
        fx.probes.clock.set(ClockReading::Lost);

        assert!(monitor.check_now());
        assert_eq!(monitor.active_fault_count(), 0);
    }

    #[test]
    fn test_ram_failure_is_critical() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.ram.set(Err(MemoryError::RamMismatch { offset: 12 }));

        assert!(!monitor.check_now());
        let record = monitor.fault_records().next().unwrap();
        assert_eq!(record.code, FaultCode::RamError);
        assert_eq!(record.severity, Severity::Critical);
        assert_eq!(record.data, 12);
        assert_eq!(
            fx.safe.last_safe_state(),
            Some(SafeStateReason::HealthCritical(FaultCode::RamError))
        );
    }

    #[test]
    fn test_checks_run_in_fixed_order() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        fx.probes.set_voltage(8_000);
        fx.probes.set_temperature(155);
        fx.probes.clock.set(ClockReading::Lost);
        fx.probes.ram.set(Err(MemoryError::RamMismatch { offset: 3 }));

        assert!(!monitor.check_now());

        let records: heapless::Vec<(FaultCode, Severity), 8> = monitor
            .fault_records()
            .map(|r| (r.code, r.severity))
            .collect();
        assert_eq!(
            records.as_slice(),
            &[
                (FaultCode::Undervoltage, Severity::Warning),
                (FaultCode::OvertemperatureShut, Severity::Critical),
                (FaultCode::ClockLost, Severity::Critical),
                (FaultCode::RamError, Severity::Critical),
            ]
        );

        assert_eq!(fx.safe.safe_state_calls(), 3);
        assert_eq!(
            fx.safe.first_safe_state(),
            Some(SafeStateReason::HealthCritical(FaultCode::OvertemperatureShut))
        );
        assert_eq!(
            fx.safe.last_safe_state(),
            Some(SafeStateReason::HealthCritical(FaultCode::RamError))
        );
        assert_eq!(fx.safe.degraded_calls(), 0);
    }

    #[test]
    fn test_flash_check_only_when_enabled() {
        let fx = Fixture::new();
        fx.probes.flash.set(Err(MemoryError::FlashChecksum));

        let mut monitor = fx.monitor();
        assert!(monitor.check_now());

        let mut monitor = fx.monitor_with(MonitorConfig {
            enable_flash_check: true,
            ..Default::default()
        });
        assert!(!monitor.check_now());
        assert!(monitor.is_fault_active(FaultCode::FlashError));
    }

    #[test]
    fn test_report_fault_uses_default_severity() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();

        monitor.report_fault(FaultCode::CanBusOff, 3);
        assert_eq!(
            fx.safe.last_degraded(),
            Some(DegradeReason::HealthFault(FaultCode::CanBusOff))
        );

        monitor.report_fault(FaultCode::CanErrorPassive, 0);
        assert_eq!(fx.safe.degraded_calls(), 1);

        monitor.report_fault(FaultCode::NoFault, 0);
        assert_eq!(monitor.fault_records().count(), 2);
    }

    #[test]
    fn test_acknowledge_keeps_log() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        monitor.report_fault(FaultCode::CanErrorPassive, 0);
        monitor.report_fault(FaultCode::WatchdogReset, 0);
        assert_eq!(monitor.active_fault_count(), 2);

        monitor.acknowledge_fault(FaultCode::WatchdogReset);
        assert_eq!(monitor.active_fault_count(), 1);
        assert!(!monitor.is_fault_active(FaultCode::WatchdogReset));

        monitor.acknowledge_fault(FaultCode::NoFault);
        assert_eq!(monitor.active_fault_count(), 0);
        assert_eq!(monitor.fault_records().count(), 2);
    }

    #[test]
    fn test_log_overwrites_oldest() {
        let fx = Fixture::new();
        let mut monitor = fx.monitor();
        for i in 0..70u16 {
            monitor.report_fault(FaultCode::LinNoResponse, i);
        }

        assert_eq!(monitor.fault_records().count(), HEALTH_LOG_CAPACITY);
        assert_eq!(monitor.fault_records().next().unwrap().data, 6);

        let mut out = [HealthFaultRecord::default(); 4];
        assert_eq!(monitor.fault_log(&mut out), 4);
        assert_eq!(out[0].data, 66);
        assert_eq!(out[3].data, 69);

        monitor.clear_fault_log();
        assert_eq!(monitor.fault_log(&mut out), 0);
        assert_eq!(monitor.fault_records().count(), 0);
        // Clearing history does not acknowledge
        assert!(monitor.is_fault_active(FaultCode::LinNoResponse));

        // The cleared log fills again from empty
        monitor.report_fault(FaultCode::LinNoResponse, 100);
        assert_eq!(monitor.fault_log(&mut out), 1);
        assert_eq!(out[0].data, 100);
    }

    #[test]
    fn test_notifier_invoked_per_record() {
        let fx = Fixture::new();
        let seen = Cell::new(0u32);
        let last = Cell::new(FaultCode::NoFault);

        let mut monitor = HealthMonitor::new(
            MonitorConfig::default(),
            &fx.clock,
            &fx.probes,
            &fx.safe,
            &fx.diag,
            |record: &HealthFaultRecord| {
                seen.set(seen.get() + 1);
                last.set(record.code);
            },
        );

        fx.probes.set_voltage(8_000);
        monitor.check_now();
        monitor.check_now();
        monitor.report_fault(FaultCode::CanBusOff, 0);

        assert_eq!(seen.get(), 2);
        assert_eq!(last.get(), FaultCode::CanBusOff);
    }

    #[test]
    fn test_invalid_config_corrected_and_reported() {
        let fx = Fixture::new();
        let mut config = MonitorConfig::default();
        config.voltage.undervolt_mv = 20_000;

        let monitor = fx.monitor_with(config);
        assert_eq!(monitor.config().voltage.undervolt_mv, 9_000);
        let entry = fx.diag.find(DiagCode::ConfigCorrected).unwrap();
        assert_eq!(entry.level, DiagLevel::Error);
    }

    proptest! {
        #[test]
        fn prop_undervoltage_latched_outside_band(mv in 9_000u16..=13_300) {
            let fx = Fixture::new();
            let mut monitor = fx.monitor();
            fx.probes.set_voltage(8_000);
            monitor.check_now();

            fx.probes.set_voltage(mv);
            monitor.check_now();
            prop_assert!(!monitor.is_voltage_ok());
            prop_assert_eq!(monitor.fault_records().count(), 1);
        }

        #[test]
        fn prop_overvoltage_latched_outside_band(mv in 14_300u16..=16_000) {
            let fx = Fixture::new();
            let mut monitor = fx.monitor();
            fx.probes.set_voltage(16_500);
            monitor.check_now();

            fx.probes.set_voltage(mv);
            monitor.check_now();
            prop_assert!(!monitor.is_voltage_ok());
        }

        #[test]
        fn prop_warning_clears_strictly_inside_band(mv in 13_301u16..14_300) {
            let fx = Fixture::new();
            let mut monitor = fx.monitor();
            fx.probes.set_voltage(8_000);
            monitor.check_now();

            fx.probes.set_voltage(mv);
            monitor.check_now();
            prop_assert!(monitor.is_voltage_ok());
        }
    }
}
