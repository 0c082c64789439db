//! Monitor configuration compiled in from monitor.toml
//!
//! The active configuration is also kept in a retained SRAM slot. Warm
//! resets reuse a valid slot, so a configuration written there by a service
//! tool takes effect after a software reset. Cold starts rewrite the slot
//! from monitor.toml.

use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use defmt::*;
use ecuguard_core::config::{
    MonitorConfig, TemperatureThresholds, VoltageThresholds, CONFIG_SLOT_SIZE,
};
use ecuguard_hal_stm32::reset::ResetCause;

include!(concat!(env!("OUT_DIR"), "/monitor_config.rs"));

#[link_section = ".uninit.ECUGUARD_CONFIG"]
static mut CONFIG_SLOT: MaybeUninit<[u8; CONFIG_SLOT_SIZE]> = MaybeUninit::uninit();

/// Pick the configuration for this boot and write it back to the slot
pub fn load_monitor_config(cause: ResetCause) -> MonitorConfig {
    let warm = matches!(
        cause,
        ResetCause::Watchdog
            | ResetCause::WindowWatchdog
            | ResetCause::Software
            | ResetCause::LowPower
    );

    critical_section::with(|_| {
        // SAFETY: called once from `main` with interrupts masked; every
        // bit pattern is a valid byte array and `load` checks the content
        let slot = unsafe { (*addr_of_mut!(CONFIG_SLOT)).assume_init_mut() };

        let config = match MonitorConfig::load(slot) {
            Ok(stored) if warm => {
                info!("Using stored monitor configuration");
                stored
            }
            Ok(_) => MONITOR_CONFIG,
            Err(e) => {
                if warm {
                    warn!("Stored monitor configuration invalid: {}", e);
                }
                MONITOR_CONFIG
            }
        };

        if let Err(e) = config.store(slot) {
            error!("Failed to store monitor configuration: {}", e);
        }
        config
    })
}

/// Core clock frequency set up in `main`
pub const SYSCLK_HZ: u32 = 168_000_000;

/// Reference window for one clock drift measurement
pub const CLOCK_WINDOW_MS: u32 = 100;

/// Supply divider: 100k over 10k into a 3.3 V reference
pub const SUPPLY_VREF_MV: u16 = 3300;
pub const SUPPLY_R_TOP_OHMS: u32 = 100_000;
pub const SUPPLY_R_BOTTOM_OHMS: u32 = 10_000;

/// Board NTC pull-up
pub const NTC_PULLUP_OHMS: u32 = 10_000;

/// Bytes of SRAM reserved for the rolling pattern test
pub const RAM_TEST_REGION_SIZE: usize = 1024;

/// Bytes covered per health check by each memory test
pub const RAM_TEST_CHUNK: usize = 32;
pub const FLASH_CRC_CHUNK: usize = 1024;
