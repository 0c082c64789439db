//! Independent watchdog (IWDG)

use ecuguard_hal::WatchdogTimer;
use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::Peri;

/// IWDG behind the [`WatchdogTimer`] seam
///
/// The prescaler and reload value are computed by embassy when the timeout
/// is programmed. The IWDG can be programmed once per boot; later
/// `program` calls are ignored.
pub struct Iwdg<'d> {
    peripheral: Option<Peri<'d, IWDG>>,
    watchdog: Option<IndependentWatchdog<'d, IWDG>>,
}

impl<'d> Iwdg<'d> {
    pub fn new(peripheral: Peri<'d, IWDG>) -> Self {
        Self {
            peripheral: Some(peripheral),
            watchdog: None,
        }
    }

    /// Whether a timeout has been programmed
    pub fn is_programmed(&self) -> bool {
        self.watchdog.is_some()
    }
}

impl WatchdogTimer for Iwdg<'_> {
    fn program(&mut self, timeout_ms: u32) {
        if let Some(peripheral) = self.peripheral.take() {
            self.watchdog = Some(IndependentWatchdog::new(
                peripheral,
                timeout_ms.saturating_mul(1000),
            ));
        }
    }

    fn enable(&mut self) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.unleash();
        }
    }

    fn refresh(&mut self) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.pet();
        }
    }
}
