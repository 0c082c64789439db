//! System clock drift against an independent timebase
//!
//! Counts monitored-clock cycles over a window of reference time and
//! compares the count with what the nominal frequency predicts.

use ecuguard_hal::{Clock, ClockMonitor, ClockReading};

/// Free-running counter driven by the monitored clock
pub trait CycleCounter {
    /// Current counter value; wraps at `u32::MAX`
    fn cycles(&mut self) -> u32;
}

/// Counts from the last completed measurement window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriftWindow {
    /// Reference time the window spanned
    pub elapsed_ms: u32,
    /// Monitored-clock cycles counted over the window
    pub counted: u32,
    /// Cycles the nominal frequency predicts for `elapsed_ms`
    pub expected: u64,
}

impl DriftWindow {
    /// Deviation from nominal in parts per million, `None` for a stopped clock
    pub fn drift_ppm(&self) -> Option<i32> {
        if self.counted == 0 || self.expected == 0 {
            return None;
        }
        let delta = self.counted as i64 - self.expected as i64;
        let ppm = delta * 1_000_000 / self.expected as i64;
        Some(ppm.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }
}

/// Clock drift monitor
///
/// `measure` must be called at least once per counter wrap period
/// (about 25 s at 168 MHz).
pub struct DriftMonitor<K, R> {
    counter: K,
    reference: R,
    nominal_hz: u32,
    window_ms: u32,
    /// Reference time and cycle count at the start of the current window
    window_start: Option<(u32, u32)>,
    last_window: Option<DriftWindow>,
}

impl<K: CycleCounter, R: Clock> DriftMonitor<K, R> {
    pub fn new(counter: K, reference: R, nominal_hz: u32, window_ms: u32) -> Self {
        Self {
            counter,
            reference,
            nominal_hz,
            window_ms: window_ms.max(1),
            window_start: None,
            last_window: None,
        }
    }

    /// Counts behind the most recent non-pending reading
    pub fn last_window(&self) -> Option<DriftWindow> {
        self.last_window
    }
}

impl<K: CycleCounter, R: Clock> ClockMonitor for DriftMonitor<K, R> {
    fn measure(&mut self) -> ClockReading {
        let now = self.reference.now_ms();
        let cycles = self.counter.cycles();

        let Some((start_ms, start_cycles)) = self.window_start else {
            self.window_start = Some((now, cycles));
            return ClockReading::Pending;
        };

        let elapsed_ms = now.wrapping_sub(start_ms);
        if elapsed_ms < self.window_ms {
            return ClockReading::Pending;
        }
        self.window_start = Some((now, cycles));

        let window = DriftWindow {
            elapsed_ms,
            counted: cycles.wrapping_sub(start_cycles),
            expected: self.nominal_hz as u64 * elapsed_ms as u64 / 1000,
        };
        if window.counted == 0 {
            self.last_window = Some(window);
            return ClockReading::Lost;
        }
        if window.expected == 0 {
            return ClockReading::Pending;
        }
        self.last_window = Some(window);

        match window.drift_ppm() {
            Some(drift_ppm) => ClockReading::Running { drift_ppm },
            None => ClockReading::Pending,
        }
    }
}
