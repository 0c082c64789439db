//! CPU fault-status register access

/// Snapshot of the fault-status registers
///
/// Field names follow the ARMv7-M System Control Block. Platforms without a
/// given register report zero for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultStatus {
    /// Configurable Fault Status (MMFSR | BFSR << 8 | UFSR << 16)
    pub cfsr: u32,
    /// HardFault Status
    pub hfsr: u32,
    /// Debug Fault Status
    pub dfsr: u32,
    /// MemManage Fault Address
    pub mmfar: u32,
    /// BusFault Address
    pub bfar: u32,
    /// Auxiliary Fault Status (implementation defined)
    pub afsr: u32,
}

/// Access to the CPU fault-status registers
///
/// Both methods run in exception context: they must not allocate, block or
/// loop unboundedly.
pub trait FaultStatusRegisters {
    /// Read the current fault-status registers
    fn read(&self) -> FaultStatus;

    /// Write back the latched status bits to clear them
    ///
    /// The status registers are write-one-to-clear, so passing the snapshot
    /// that was read clears exactly the bits that were latched.
    fn clear(&mut self, latched: &FaultStatus);
}
