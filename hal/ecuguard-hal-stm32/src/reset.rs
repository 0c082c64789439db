//! Reset cause flags

use embassy_stm32::pac;

/// Why the MCU last came out of reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Independent watchdog expired
    Watchdog,
    /// Window watchdog expired
    WindowWatchdog,
    /// `SCB::sys_reset` or another software request
    Software,
    PowerOn,
    Brownout,
    /// NRST pin
    Pin,
    LowPower,
}

/// Read the reset flags in RCC_CSR and clear them for the next boot
///
/// When several flags are set the most specific one wins (a watchdog reset
/// also sets the pin flag).
pub fn take_reset_cause() -> ResetCause {
    let csr = pac::RCC.csr().read();

    let cause = if csr.iwdgrstf() {
        ResetCause::Watchdog
    } else if csr.wwdgrstf() {
        ResetCause::WindowWatchdog
    } else if csr.sftrstf() {
        ResetCause::Software
    } else if csr.lpwrrstf() {
        ResetCause::LowPower
    } else if csr.porrstf() {
        ResetCause::PowerOn
    } else if csr.borrstf() {
        ResetCause::Brownout
    } else {
        ResetCause::Pin
    };

    pac::RCC.csr().modify(|w| w.set_rmvf(true));
    cause
}
