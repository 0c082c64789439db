//! Active fault registry

use super::codes::FaultCode;

/// Bitmap of currently unacknowledged fault codes
///
/// Set when a fault is logged, cleared only by acknowledgment. Lookup, set
/// and clear are single bit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveFaults(u32);

impl ActiveFaults {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Mark a code active (no-op for [`FaultCode::NoFault`])
    pub fn set(&mut self, code: FaultCode) {
        if let Some(bit) = code.bit() {
            self.0 |= 1 << bit;
        }
    }

    /// Acknowledge a code; [`FaultCode::NoFault`] acknowledges every code
    pub fn acknowledge(&mut self, code: FaultCode) {
        match code.bit() {
            Some(bit) => self.0 &= !(1 << bit),
            None => self.0 = 0,
        }
    }

    pub fn contains(&self, code: FaultCode) -> bool {
        code.bit().is_some_and(|bit| self.0 & (1 << bit) != 0)
    }

    /// Number of active codes
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw bitmap
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Iterate the active codes in bit order
    pub fn iter(&self) -> impl Iterator<Item = FaultCode> + '_ {
        FaultCode::ALL
            .iter()
            .copied()
            .filter(move |code| self.contains(*code))
    }
}
