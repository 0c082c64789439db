//! Blocking ADC inputs

use core::cell::RefCell;

use ecuguard_drivers::AdcReader;
use embassy_stm32::adc::{Adc, AnyAdcChannel, Instance};

/// One analog channel on a shared ADC
///
/// Several inputs borrow the same converter; conversions are blocking and
/// never overlap because the health monitor samples from a single task.
pub struct AdcInput<'a, 'd, T: Instance> {
    adc: &'a RefCell<Adc<'d, T>>,
    channel: AnyAdcChannel<T>,
}

impl<'a, 'd, T: Instance> AdcInput<'a, 'd, T> {
    pub fn new(adc: &'a RefCell<Adc<'d, T>>, channel: AnyAdcChannel<T>) -> Self {
        Self { adc, channel }
    }
}

impl<T: Instance> AdcReader for AdcInput<'_, '_, T> {
    fn read(&mut self) -> Result<u16, ()> {
        let mut adc = self.adc.try_borrow_mut().map_err(|_| ())?;
        Ok(adc.blocking_read(&mut self.channel))
    }
}
