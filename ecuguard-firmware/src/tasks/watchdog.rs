//! Watchdog refresh task
//!
//! Kicks at the watchdog's expected interval, but only while the health
//! task keeps ticking. A stalled health task lets the IWDG expire.
//!
//! The IWDG has no early-warning interrupt, so `Watchdog::on_expiry` is not
//! wired here. An expiry is seen at the next boot through the reset cause,
//! which `main` reports to the health monitor as `WatchdogReset`.

use defmt::*;
use embassy_time::{Duration, Ticker};

use ecuguard_core::watchdog::Watchdog;
use ecuguard_hal_stm32::{EmbassyClock, Iwdg};

use crate::channels::HEALTH_HEARTBEAT;
use crate::platform::DefmtSink;

pub type EcuWatchdog = Watchdog<Iwdg<'static>, EmbassyClock, DefmtSink>;

/// Kicks between watchdog statistics reports
const STATS_INTERVAL_KICKS: u32 = 1200;

/// Watchdog task - owns the IWDG from start-up onwards
#[embassy_executor::task]
pub async fn watchdog_task(mut watchdog: EcuWatchdog) {
    watchdog.start();

    let interval = watchdog.expected_interval_ms();
    info!(
        "Watchdog task started ({} ms interval, {} ms tolerance)",
        interval,
        watchdog.tolerance_ms()
    );

    let mut ticker = Ticker::every(Duration::from_millis(interval as u64));

    loop {
        ticker.next().await;

        if HEALTH_HEARTBEAT.try_take().is_none() {
            warn!("Health task stalled, withholding watchdog refresh");
            continue;
        }

        watchdog.kick();

        let stats = watchdog.stats();
        if stats.kick_count % STATS_INTERVAL_KICKS == 0 {
            info!(
                "Watchdog: {} kicks, {} late ({} permille)",
                stats.kick_count,
                stats.late_kick_count,
                stats.late_ratio_permille()
            );
        }
    }
}
