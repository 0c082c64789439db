//! Memory integrity tests

/// Memory test failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryError {
    /// RAM cell did not hold the written pattern (offset into the tested region)
    RamMismatch { offset: u16 },
    /// Flash image checksum did not match the stored value
    FlashChecksum,
}

/// RAM and flash integrity checks
///
/// Each call must run in bounded time: implementations test a slice of
/// memory per call rather than the whole device.
pub trait MemoryTester {
    /// Write `pattern` (and its complement) to the test region and read it back
    fn test_ram(&mut self, pattern: u8) -> Result<(), MemoryError>;

    /// Verify the program image checksum
    ///
    /// Platforms without a flash check report success.
    fn verify_flash(&mut self) -> Result<(), MemoryError> {
        Ok(())
    }
}
