//! Memory self-tests
//!
//! Both tests work incrementally: each call covers one chunk of the region
//! so a health check stays within its time budget.

pub mod flash_crc;
pub mod pattern;

pub use flash_crc::FlashCrcCheck;
pub use pattern::{PatternRamTest, TestRegion, VolatileRegion};

use ecuguard_hal::{MemoryError, MemoryTester};

/// RAM pattern test with an optional flash image check
pub struct MemorySelfTest<'a, R> {
    ram: PatternRamTest<R>,
    flash: Option<FlashCrcCheck<'a>>,
}

impl<'a, R: TestRegion> MemorySelfTest<'a, R> {
    pub fn new(ram: PatternRamTest<R>, flash: Option<FlashCrcCheck<'a>>) -> Self {
        Self { ram, flash }
    }
}

impl<R: TestRegion> MemoryTester for MemorySelfTest<'_, R> {
    fn test_ram(&mut self, pattern: u8) -> Result<(), MemoryError> {
        self.ram.step(pattern)
    }

    fn verify_flash(&mut self) -> Result<(), MemoryError> {
        match self.flash.as_mut() {
            Some(flash) => flash.step(),
            None => Ok(()),
        }
    }
}
