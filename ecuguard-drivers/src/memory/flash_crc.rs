//! Incremental flash image CRC check

use crc32fast::Hasher;
use ecuguard_hal::MemoryError;

/// Recomputes the CRC-32 of a program image a chunk at a time
///
/// The comparison happens when a pass over the whole image completes;
/// steps in the middle of a pass report success.
pub struct FlashCrcCheck<'a> {
    image: &'a [u8],
    expected: u32,
    chunk: usize,
    cursor: usize,
    hasher: Hasher,
}

impl<'a> FlashCrcCheck<'a> {
    /// Check `image` against a known CRC, hashing `chunk` bytes per step
    pub fn new(image: &'a [u8], expected: u32, chunk: usize) -> Self {
        Self {
            image,
            expected,
            chunk: chunk.max(1),
            cursor: 0,
            hasher: Hasher::new(),
        }
    }

    /// Take the image's current CRC as the reference
    ///
    /// Hashes the whole image once; call it at boot, not from a check.
    pub fn baseline(image: &'a [u8], chunk: usize) -> Self {
        Self::new(image, crc32fast::hash(image), chunk)
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Hash the next chunk
    pub fn step(&mut self) -> Result<(), MemoryError> {
        let end = (self.cursor + self.chunk).min(self.image.len());
        self.hasher.update(&self.image[self.cursor..end]);
        self.cursor = end;

        if self.cursor < self.image.len() {
            return Ok(());
        }

        self.cursor = 0;
        let crc = core::mem::take(&mut self.hasher).finalize();
        if crc == self.expected {
            Ok(())
        } else {
            Err(MemoryError::FlashChecksum)
        }
    }
}
