//! Health monitor task
//!
//! Drives the monitor from a fast ticker; the monitor itself gates checks
//! to the configured interval. Faults reported by other tasks are fed in
//! before each tick.

use defmt::*;
use embassy_stm32::gpio::Output;
use embassy_stm32::peripherals::ADC1;
use embassy_time::{Duration, Ticker};

use ecuguard_core::health::{HealthFaultRecord, HealthMonitor, Probes};
use ecuguard_drivers::clock::DriftMonitor;
use ecuguard_drivers::memory::{MemorySelfTest, VolatileRegion};
use ecuguard_drivers::sensor::{DividerVoltageSensor, NtcSensor};
use ecuguard_hal_stm32::adc::AdcInput;
use ecuguard_hal_stm32::{DwtCycles, EmbassyClock};

use crate::channels::{FAULT_REPORTS, HEALTH_FAULTS, HEALTH_HEARTBEAT};
use crate::platform::{DefmtSink, EcuSafeState};

/// Ticker period; finer than any sensible check interval
pub const HEALTH_TICK_MS: u64 = 1;

pub type EcuProbes = Probes<
    DividerVoltageSensor<AdcInput<'static, 'static, ADC1>>,
    NtcSensor<AdcInput<'static, 'static, ADC1>>,
    DriftMonitor<DwtCycles, EmbassyClock>,
    MemorySelfTest<'static, VolatileRegion<'static>>,
>;

pub type EcuHealthMonitor =
    HealthMonitor<EmbassyClock, EcuProbes, EcuSafeState, DefmtSink, fn(&HealthFaultRecord)>;

/// Monitor notifier: hand the record to the report task
pub fn publish_fault(record: &HealthFaultRecord) {
    if HEALTH_FAULTS.try_send(*record).is_err() {
        warn!("Health fault channel full, {} not published", record.code);
    }
}

/// Health task - samples the ECU on every monitor interval
///
/// The actuator supply is switched on only after an initial check passes
/// with no active faults.
#[embassy_executor::task]
pub async fn health_task(mut monitor: EcuHealthMonitor, mut actuator_enable: Output<'static>) {
    info!(
        "Health task started ({} ms interval)",
        monitor.config().check_interval_ms
    );

    monitor.start();

    // Establish the initial condition set before anything else runs
    if monitor.check_now() {
        actuator_enable.set_high();
        info!("Initial health check passed, actuators enabled");
    } else {
        warn!(
            "Initial health check found {} faults, actuators stay off",
            monitor.active_fault_count()
        );
    }

    let mut ticker = Ticker::every(Duration::from_millis(HEALTH_TICK_MS));

    loop {
        ticker.next().await;

        while let Ok((code, data)) = FAULT_REPORTS.try_receive() {
            monitor.report_fault(code, data);
        }

        monitor.tick();
        HEALTH_HEARTBEAT.signal(());
    }
}
