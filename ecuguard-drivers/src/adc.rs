//! ADC channel abstraction

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Full-scale count of a 12-bit converter
pub const ADC_12BIT_MAX: u16 = 4096;

/// Fixed ADC value for tests
#[cfg(test)]
pub struct DummyAdc(pub u16);

#[cfg(test)]
impl AdcReader for DummyAdc {
    fn read(&mut self) -> Result<u16, ()> {
        Ok(self.0)
    }
}

/// ADC that always fails the conversion
#[cfg(test)]
pub struct FailingAdc;

#[cfg(test)]
impl AdcReader for FailingAdc {
    fn read(&mut self) -> Result<u16, ()> {
        Err(())
    }
}
