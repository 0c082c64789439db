//! Time sources

use cortex_m::peripheral::{DCB, DWT};
use ecuguard_drivers::clock::CycleCounter;
use ecuguard_hal::Clock;
use embassy_time::Instant;

/// Millisecond clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Core clock cycles from the DWT cycle counter
pub struct DwtCycles(());

impl DwtCycles {
    /// Enable the trace unit and start the cycle counter
    pub fn new(dcb: &mut DCB, dwt: &mut DWT) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();
        Self(())
    }
}

impl CycleCounter for DwtCycles {
    fn cycles(&mut self) -> u32 {
        DWT::cycle_count()
    }
}
