//! Health fault report task
//!
//! Consumes the monitor's notifications. This is where faults leave the
//! safety core for the rest of the ECU.

use defmt::*;

use ecuguard_core::health::Severity;

use crate::channels::HEALTH_FAULTS;
use crate::platform::is_degraded;

/// Report task - logs every published health fault with the unit status
#[embassy_executor::task]
pub async fn report_task() {
    info!("Report task started");

    loop {
        let record = HEALTH_FAULTS.receive().await;

        let status = if is_degraded() { "degraded" } else { "normal" };
        match record.severity {
            Severity::Info | Severity::Warning => info!(
                "Health fault {=u16:#06x} at {} ms (data {}), unit {}",
                record.code.as_u16(),
                record.timestamp_ms,
                record.data,
                status
            ),
            Severity::Error | Severity::Critical => error!(
                "Health fault {=u16:#06x} at {} ms (data {}), unit {}",
                record.code.as_u16(),
                record.timestamp_ms,
                record.data,
                status
            ),
        }
    }
}
