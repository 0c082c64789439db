//! Cortex-M fault-status registers and exception frames

use core::ptr;

use cortex_m::peripheral::SCB;
use cortex_m_rt::ExceptionFrame;
use ecuguard_core::fault::{thumb_instruction_len, FaultOutcome, StackedFrame};
use ecuguard_hal::{FaultStatus, FaultStatusRegisters};

/// SHCSR enable bits for MemManage, BusFault and UsageFault
const SHCSR_FAULT_ENABLES: u32 = (1 << 16) | (1 << 17) | (1 << 18);
/// CCR: trap on integer divide by zero
const CCR_DIV_0_TRP: u32 = 1 << 4;

/// System Control Block fault-status registers
#[derive(Debug, Clone, Copy, Default)]
pub struct ScbFaultRegisters;

impl FaultStatusRegisters for ScbFaultRegisters {
    fn read(&self) -> FaultStatus {
        // SAFETY: read-only access to always-present SCB registers
        let scb = unsafe { &*SCB::PTR };
        FaultStatus {
            cfsr: scb.cfsr.read(),
            hfsr: scb.hfsr.read(),
            dfsr: scb.dfsr.read(),
            mmfar: scb.mmfar.read(),
            bfar: scb.bfar.read(),
            afsr: scb.afsr.read(),
        }
    }

    fn clear(&mut self, latched: &FaultStatus) {
        // SAFETY: the status registers are write-one-to-clear; writing back
        // the latched snapshot only clears bits that were set
        unsafe {
            let scb = &*SCB::PTR;
            scb.cfsr.write(latched.cfsr);
            scb.hfsr.write(latched.hfsr);
            scb.dfsr.write(latched.dfsr);
        }
    }
}

/// Route MemManage, BusFault and UsageFault to their own handlers and trap
/// integer division by zero
///
/// Without this every configurable fault escalates to HardFault, which
/// cannot resume.
pub fn enable_fault_exceptions(scb: &mut SCB) {
    // SAFETY: only sets enable bits; handlers for the three exceptions must
    // be linked into the image
    unsafe {
        scb.shcsr.modify(|v| v | SHCSR_FAULT_ENABLES);
        scb.ccr.modify(|v| v | CCR_DIV_0_TRP);
    }
}

/// Basic exception frame as stacked by the CPU
///
/// Laid out exactly as in memory so a pointer to the stacked frame can be
/// reinterpreted; writes to `pc` take effect on exception return.
#[repr(C)]
#[derive(Debug)]
pub struct RawFrame {
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r3: u32,
    pub r12: u32,
    pub lr: u32,
    pub pc: u32,
    pub xpsr: u32,
}

impl RawFrame {
    pub fn to_stacked(&self) -> StackedFrame {
        StackedFrame {
            r0: self.r0,
            r1: self.r1,
            r2: self.r2,
            r3: self.r3,
            r12: self.r12,
            lr: self.lr,
            pc: self.pc,
            psr: self.xpsr,
        }
    }

    /// Apply a handler outcome to the stacked frame
    ///
    /// Returns `false` when the outcome requires a reset instead of an
    /// exception return.
    ///
    /// # Safety
    ///
    /// `self.pc` must point at readable code memory (true for any PC the
    /// CPU stacked on a synchronous fault).
    pub unsafe fn apply(&mut self, outcome: FaultOutcome) -> bool {
        match outcome {
            FaultOutcome::SkipInstruction => {
                let first = ptr::read_volatile(self.pc as *const u16);
                self.pc = self.pc.wrapping_add(thumb_instruction_len(first));
                true
            }
            FaultOutcome::Resume => true,
            FaultOutcome::Reset(_) => false,
        }
    }
}

/// Conversion from the cortex-m-rt HardFault frame
pub trait ExceptionFrameExt {
    fn to_stacked(&self) -> StackedFrame;
}

impl ExceptionFrameExt for ExceptionFrame {
    fn to_stacked(&self) -> StackedFrame {
        StackedFrame {
            r0: self.r0(),
            r1: self.r1(),
            r2: self.r2(),
            r3: self.r3(),
            r12: self.r12(),
            lr: self.lr(),
            pc: self.pc(),
            psr: self.xpsr(),
        }
    }
}
