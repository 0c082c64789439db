//! ECU Guard - Safety Monitor Firmware
//!
//! Firmware binary for STM32F407-based ECUs. Wires the safety core to the
//! board:
//!
//! - IWDG refreshed by a task that depends on the health task's progress
//! - MemManage/BusFault/UsageFault/HardFault recorded to a reset-persistent
//!   fault log and classified
//! - Supply, temperature, clock and memory checked by the health monitor

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::peripherals::ADC1;
use embassy_stm32::time::Hertz;
use embassy_stm32::Config;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ecuguard_core::health::{FaultCode, HealthFaultRecord, HealthMonitor, Probes};
use ecuguard_core::watchdog::Watchdog;
use ecuguard_drivers::clock::DriftMonitor;
use ecuguard_drivers::memory::{FlashCrcCheck, MemorySelfTest, PatternRamTest, VolatileRegion};
use ecuguard_drivers::sensor::{DividerVoltageSensor, NtcSensor};
use ecuguard_hal_stm32::adc::AdcInput;
use ecuguard_hal_stm32::fault::enable_fault_exceptions;
use ecuguard_hal_stm32::reset::{take_reset_cause, ResetCause};
use ecuguard_hal_stm32::storage::program_image;
use ecuguard_hal_stm32::{DwtCycles, EmbassyClock, Iwdg};

use crate::channels::FAULT_REPORTS;
use crate::config::*;
use crate::platform::{DefmtSink, EcuSafeState};

mod channels;
mod config;
mod faults;
mod platform;
mod tasks;

// Shared converter for the supply and temperature inputs
static ADC: StaticCell<RefCell<Adc<'static, ADC1>>> = StaticCell::new();

// SRAM walked by the pattern test (contents are restored after each cell)
static RAM_TEST_REGION: StaticCell<[u8; RAM_TEST_REGION_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ECU Guard firmware starting...");

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized");

    let reset_cause = take_reset_cause();
    info!("Reset cause: {}", reset_cause);

    faults::restore_fault_log();
    let monitor_config = config::load_monitor_config(reset_cause);

    let mut cp = unwrap!(cortex_m::Peripherals::take());
    enable_fault_exceptions(&mut cp.SCB);
    let cycles = DwtCycles::new(&mut cp.DCB, &mut cp.DWT);

    // Watchdog: configured now, started by its task
    let watchdog = Watchdog::new(
        Iwdg::new(p.IWDG),
        EmbassyClock,
        DefmtSink,
        WATCHDOG_TIMEOUT_MS,
    );

    // Health monitor probes
    let adc = ADC.init(RefCell::new(Adc::new(p.ADC1)));
    let supply = DividerVoltageSensor::new(
        AdcInput::new(adc, p.PA0.degrade_adc()),
        SUPPLY_VREF_MV,
        SUPPLY_R_TOP_OHMS,
        SUPPLY_R_BOTTOM_OHMS,
    );
    let temperature = NtcSensor::new(AdcInput::new(adc, p.PA1.degrade_adc()), NTC_PULLUP_OHMS);
    let clock = DriftMonitor::new(cycles, EmbassyClock, SYSCLK_HZ, CLOCK_WINDOW_MS);

    let region = VolatileRegion::new(RAM_TEST_REGION.init([0; RAM_TEST_REGION_SIZE]));
    let flash = monitor_config
        .enable_flash_check
        .then(|| FlashCrcCheck::baseline(program_image(), FLASH_CRC_CHUNK));
    if let Some(flash) = &flash {
        info!("Program image CRC baseline: {:#010x}", flash.expected());
    }
    let memory = MemorySelfTest::new(PatternRamTest::new(region, RAM_TEST_CHUNK), flash);

    let notify: fn(&HealthFaultRecord) = tasks::health::publish_fault;
    let monitor = HealthMonitor::new(
        monitor_config,
        EmbassyClock,
        Probes::new(supply, temperature, clock, memory),
        EcuSafeState,
        DefmtSink,
        notify,
    );

    // Outputs stay off until the first health check passes
    let actuator_enable = Output::new(p.PE0, Level::Low, Speed::Low);

    if reset_cause == ResetCause::Watchdog {
        warn!("Recovered from watchdog reset");
        let _ = FAULT_REPORTS.try_send((FaultCode::WatchdogReset, 0));
    }

    // Spawn tasks
    spawner.spawn(tasks::report_task()).unwrap();
    spawner
        .spawn(tasks::health_task(monitor, actuator_enable))
        .unwrap();
    spawner.spawn(tasks::watchdog_task(watchdog)).unwrap();

    info!("All tasks spawned, ECU Guard running");
}

/// 168 MHz SYSCLK from an 8 MHz crystal
fn clock_config() -> Config {
    use embassy_stm32::rcc::*;

    let mut config = Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL168,
        divp: Some(PllPDiv::DIV2),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV4;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.sys = Sysclk::PLL1_P;
    config
}
