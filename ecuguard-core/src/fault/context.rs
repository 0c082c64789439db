//! Exception context snapshot and its stored record form

use ecuguard_hal::{FaultStatus, FaultStatusRegisters};

use super::classify::CfsrFlags;

/// Registers stacked by the CPU on exception entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackedFrame {
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r3: u32,
    pub r12: u32,
    pub lr: u32,
    /// Return address (the faulting instruction for synchronous faults)
    pub pc: u32,
    pub psr: u32,
}

/// Immutable snapshot taken at the moment of a CPU exception
///
/// Filled by the platform adapter from the exception frame and the
/// fault-status registers; the classifier only ever sees this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExceptionContext {
    pub frame: StackedFrame,
    pub status: FaultStatus,
}

impl ExceptionContext {
    /// Number of 32-bit words in a context
    pub const WORDS: usize = 14;

    pub const fn new(frame: StackedFrame, status: FaultStatus) -> Self {
        Self { frame, status }
    }

    /// Combine a stacked frame with the current fault-status registers
    pub fn capture<R: FaultStatusRegisters + ?Sized>(frame: StackedFrame, registers: &R) -> Self {
        Self::new(frame, registers.read())
    }

    /// Decoded Configurable Fault Status bits
    pub fn cfsr(&self) -> CfsrFlags {
        CfsrFlags::from_bits_retain(self.status.cfsr)
    }

    /// Fixed register order used for checksumming
    pub fn words(&self) -> [u32; Self::WORDS] {
        let f = &self.frame;
        let s = &self.status;
        [
            f.r0, f.r1, f.r2, f.r3, f.r12, f.lr, f.pc, f.psr, s.cfsr, s.hfsr, s.dfsr, s.mmfar,
            s.bfar, s.afsr,
        ]
    }
}

/// A captured exception with its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultRecord {
    pub context: ExceptionContext,
    pub timestamp_ms: u32,
}

impl FaultRecord {
    /// Size of the encoded record in bytes
    pub const ENCODED_LEN: usize = (ExceptionContext::WORDS + 1) * 4;

    /// Little-endian encoding of every field, independent of struct layout
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut bytes = [0u8; Self::ENCODED_LEN];
        let words = self.context.words();
        let all = words.iter().chain(core::iter::once(&self.timestamp_ms));
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(all) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// CRC-32 over the encoded record
    pub fn checksum(&self) -> u32 {
        crc32fast::hash(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFaultRegisters;

    #[test]
    fn test_capture_reads_registers() {
        let regs = MockFaultRegisters {
            status: FaultStatus {
                cfsr: 1 << 25,
                hfsr: 1 << 30,
                ..Default::default()
            },
            cleared: None,
        };
        let frame = StackedFrame {
            pc: 0x0800_1234,
            ..Default::default()
        };

        let ctx = ExceptionContext::capture(frame, &regs);
        assert_eq!(ctx.frame.pc, 0x0800_1234);
        assert_eq!(ctx.status.hfsr, 1 << 30);
        assert!(ctx.cfsr().contains(CfsrFlags::DIVBYZERO));
    }

    #[test]
    fn test_encode_layout() {
        let record = FaultRecord {
            context: ExceptionContext::new(
                StackedFrame {
                    r0: 0x0403_0201,
                    ..Default::default()
                },
                FaultStatus::default(),
            ),
            timestamp_ms: 0xAABB_CCDD,
        };
        let bytes = record.encode();
        assert_eq!(bytes.len(), 60);
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
        assert_eq!(&bytes[56..], &[0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn test_checksum_covers_timestamp() {
        let a = FaultRecord::default();
        let b = FaultRecord {
            timestamp_ms: 1,
            ..a
        };
        assert_ne!(a.checksum(), b.checksum());
    }
}
