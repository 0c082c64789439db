//! Fault classification from the Configurable Fault Status Register

use bitflags::bitflags;

use super::context::ExceptionContext;

bitflags! {
    /// Configurable Fault Status Register bits (ARMv7-M)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CfsrFlags: u32 {
        // MemManage Fault Status (MMFSR)
        const IACCVIOL = 1 << 0;
        const DACCVIOL = 1 << 1;
        const MUNSTKERR = 1 << 3;
        const MSTKERR = 1 << 4;
        const MLSPERR = 1 << 5;
        const MMARVALID = 1 << 7;

        // BusFault Status (BFSR)
        const IBUSERR = 1 << 8;
        const PRECISERR = 1 << 9;
        const IMPRECISERR = 1 << 10;
        const UNSTKERR = 1 << 11;
        const STKERR = 1 << 12;
        const LSPERR = 1 << 13;
        const BFARVALID = 1 << 15;

        // UsageFault Status (UFSR)
        const UNDEFINSTR = 1 << 16;
        const INVSTATE = 1 << 17;
        const INVPC = 1 << 18;
        const NOCP = 1 << 19;
        const UNALIGNED = 1 << 24;
        const DIVBYZERO = 1 << 25;
    }
}

impl CfsrFlags {
    /// MMFSR byte
    pub const MEMORY: u32 = 0x0000_00FF;
    /// BFSR byte
    pub const BUS: u32 = 0x0000_FF00;
    /// UFSR half-word
    pub const USAGE: u32 = 0xFFFF_0000;
}

/// Fault severity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultClass {
    /// Skip the faulting instruction and resume
    Recoverable,
    /// Continue with reduced capability
    Degraded,
    /// Must enter the safe state
    Fatal,
}

impl FaultClass {
    /// Short description for diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            FaultClass::Recoverable => "recoverable",
            FaultClass::Degraded => "degraded",
            FaultClass::Fatal => "fatal",
        }
    }
}

/// Classify a captured exception
///
/// Status groups are inspected in priority order: memory, bus, instruction,
/// then arithmetic. The first match decides. Any pattern not listed below is
/// Fatal, including an empty CFSR (e.g. a forced HardFault from a vector
/// table read).
///
/// | Bits                         | Class       |
/// |------------------------------|-------------|
/// | IACCVIOL, DACCVIOL           | Fatal       |
/// | IBUSERR                      | Fatal       |
/// | PRECISERR, IMPRECISERR       | Degraded    |
/// | UNDEFINSTR, INVSTATE, INVPC  | Fatal       |
/// | DIVBYZERO                    | Recoverable |
pub fn classify(context: &ExceptionContext) -> FaultClass {
    let cfsr = context.cfsr();
    let raw = cfsr.bits();

    if raw & CfsrFlags::MEMORY != 0
        && cfsr.intersects(CfsrFlags::IACCVIOL | CfsrFlags::DACCVIOL)
    {
        return FaultClass::Fatal;
    }

    if raw & CfsrFlags::BUS != 0 {
        if cfsr.contains(CfsrFlags::IBUSERR) {
            return FaultClass::Fatal;
        }
        if cfsr.intersects(CfsrFlags::PRECISERR | CfsrFlags::IMPRECISERR) {
            return FaultClass::Degraded;
        }
    }

    if raw & CfsrFlags::USAGE != 0 {
        if cfsr.intersects(CfsrFlags::UNDEFINSTR | CfsrFlags::INVSTATE | CfsrFlags::INVPC) {
            return FaultClass::Fatal;
        }
        if cfsr.contains(CfsrFlags::DIVBYZERO) {
            return FaultClass::Recoverable;
        }
    }

    FaultClass::Fatal
}

/// Length in bytes of the Thumb instruction starting with `first_halfword`
///
/// Thumb-2 32-bit encodings start with 0b11101, 0b11110 or 0b11111 in the
/// top five bits; everything else is a 16-bit instruction. `SDIV`/`UDIV`
/// are 32-bit, so a divide fault is skipped by four bytes.
pub fn thumb_instruction_len(first_halfword: u16) -> u32 {
    match first_halfword >> 11 {
        0b11101 | 0b11110 | 0b11111 => 4,
        _ => 2,
    }
}
