//! Pattern RAM test

use core::ptr;

use ecuguard_hal::MemoryError;

/// Memory under test
pub trait TestRegion {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&mut self, offset: usize, value: u8);

    fn read(&mut self, offset: usize) -> u8;
}

/// Plain slice access, for simulated memory
///
/// The compiler may fold a write and its read-back; use [`VolatileRegion`]
/// for real RAM.
impl TestRegion for &mut [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn write(&mut self, offset: usize, value: u8) {
        self[offset] = value;
    }

    fn read(&mut self, offset: usize) -> u8 {
        self[offset]
    }
}

/// RAM accessed with volatile reads and writes
///
/// Every test write reaches the cell and every read-back comes from it.
pub struct VolatileRegion<'a> {
    cells: &'a mut [u8],
}

impl<'a> VolatileRegion<'a> {
    pub fn new(cells: &'a mut [u8]) -> Self {
        Self { cells }
    }
}

#[allow(unsafe_code)]
impl TestRegion for VolatileRegion<'_> {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn write(&mut self, offset: usize, value: u8) {
        let cell: *mut u8 = &mut self.cells[offset];
        // SAFETY: `cell` comes from an exclusive, bounds-checked borrow
        unsafe { ptr::write_volatile(cell, value) }
    }

    fn read(&mut self, offset: usize) -> u8 {
        let cell: *const u8 = &self.cells[offset];
        // SAFETY: as in `write`
        unsafe { ptr::read_volatile(cell) }
    }
}

/// Writes a pattern and its complement to each cell and reads them back
///
/// The original contents of each cell are restored after it is tested.
pub struct PatternRamTest<R> {
    region: R,
    chunk: usize,
    cursor: usize,
}

impl<R: TestRegion> PatternRamTest<R> {
    /// Test `chunk` bytes of `region` per step (at least one)
    pub fn new(region: R, chunk: usize) -> Self {
        Self {
            region,
            chunk: chunk.max(1),
            cursor: 0,
        }
    }

    /// Offset the next step starts at
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Test the next chunk, wrapping to the start of the region
    pub fn step(&mut self, pattern: u8) -> Result<(), MemoryError> {
        let len = self.region.len();
        if len == 0 {
            return Ok(());
        }

        let start = self.cursor;
        let end = (start + self.chunk).min(len);
        self.cursor = if end == len { 0 } else { end };

        for offset in start..end {
            let saved = self.region.read(offset);
            let mut result = Ok(());

            for value in [pattern, !pattern] {
                self.region.write(offset, value);
                if self.region.read(offset) != value {
                    result = Err(MemoryError::RamMismatch {
                        offset: offset.min(u16::MAX as usize) as u16,
                    });
                    break;
                }
            }

            self.region.write(offset, saved);
            result?;
        }

        Ok(())
    }
}
