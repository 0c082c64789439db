//! CPU fault entry points and the reset-persistent fault log
//!
//! MemManage, BusFault and UsageFault enter through an assembly trampoline
//! that hands the stacked frame to [`configurable_fault`], so a skipped
//! instruction or resumed execution takes effect on exception return.
//! HardFault goes through cortex-m-rt and always ends in a reset.

use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use cortex_m::peripheral::SCB;
use cortex_m_rt::{exception, ExceptionFrame};
use ecuguard_core::fault::{ExceptionContext, FaultHandler, FaultLog, FaultOutcome, LoggedFault};
use ecuguard_core::safe_state::ResetRequired;
use ecuguard_core::{DiagCode, DiagnosticSink};
use ecuguard_hal_stm32::{
    EmbassyClock, ExceptionFrameExt, RawFrame, RetainedSram, ScbFaultRegisters,
};

use crate::platform::{DefmtSink, EcuSafeState};

/// Survives warm resets; validated by [`restore_fault_log`] at boot
#[link_section = ".uninit.ECUGUARD_FAULT_LOG"]
static mut FAULT_LOG: MaybeUninit<FaultLog> = MaybeUninit::uninit();

type EcuFaultHandler =
    FaultHandler<EmbassyClock, ScbFaultRegisters, RetainedSram, EcuSafeState, DefmtSink>;

fn fault_handler() -> EcuFaultHandler {
    FaultHandler::new(
        EmbassyClock,
        ScbFaultRegisters,
        RetainedSram,
        EcuSafeState,
        DefmtSink,
    )
}

/// # Safety
///
/// Caller must hold exclusive access: a critical section in thread mode, or
/// fault context (faults preempt everything that could touch the log).
unsafe fn fault_log() -> &'static mut FaultLog {
    // Every bit pattern is a valid `FaultLog`; `adopt` checks the content.
    (*addr_of_mut!(FAULT_LOG)).assume_init_mut()
}

/// Run `f` with the fault log inside a critical section
pub fn with_fault_log<R>(f: impl FnOnce(&mut FaultLog) -> R) -> R {
    // SAFETY: interrupts are masked for the duration of `f`
    critical_section::with(|_| f(unsafe { fault_log() }))
}

/// Keep records from before the reset, or start a fresh log
pub fn restore_fault_log() {
    let mut diag = DefmtSink;

    with_fault_log(|log| {
        if log.adopt() {
            diag.info(DiagCode::FaultLogRestored, &[log.count()]);

            let mut records = [LoggedFault::Corrupted { slot: 0 }; 4];
            let n = log.read_into(&mut records);
            for record in &records[..n] {
                match record.intact() {
                    Some(r) => defmt::warn!(
                        "Previous fault: pc={:#010x} cfsr={:#010x} at {} ms",
                        r.context.frame.pc,
                        r.context.status.cfsr,
                        r.timestamp_ms
                    ),
                    None => defmt::warn!("Previous fault: record corrupted"),
                }
            }
        } else {
            diag.warn(DiagCode::FaultLogInitialized, &[]);
        }
    });
}

core::arch::global_asm!(
    ".section .text.ecuguard_fault_trampoline, \"ax\"",
    ".global MemoryManagement",
    ".global BusFault",
    ".global UsageFault",
    ".type MemoryManagement, %function",
    ".type BusFault, %function",
    ".type UsageFault, %function",
    ".thumb_func",
    "MemoryManagement:",
    ".thumb_func",
    "BusFault:",
    ".thumb_func",
    "UsageFault:",
    "tst lr, #4",
    "ite eq",
    "mrseq r0, msp",
    "mrsne r0, psp",
    "b {handler}",
    handler = sym configurable_fault,
);

/// MemManage, BusFault and UsageFault body
///
/// Returns normally for recoverable and degraded faults; the trampoline's
/// tail call makes that return the exception return.
unsafe extern "C" fn configurable_fault(frame: &mut RawFrame) {
    let mut handler = fault_handler();
    let context = ExceptionContext::capture(frame.to_stacked(), handler.registers());
    let outcome = handler.on_exception(fault_log(), &context);

    if !frame.apply(outcome) {
        SCB::sys_reset();
    }
}

#[exception]
unsafe fn HardFault(frame: &ExceptionFrame) -> ! {
    let mut handler = fault_handler();
    let context = ExceptionContext::capture(frame.to_stacked(), handler.registers());

    // A HardFault frame cannot be resumed from here; the reset below
    // happens whatever the classification.
    match handler.on_exception(fault_log(), &context) {
        FaultOutcome::Reset(ResetRequired(reason)) => {
            defmt::error!("HardFault: {}", reason);
        }
        FaultOutcome::SkipInstruction | FaultOutcome::Resume => {
            defmt::error!("HardFault escalated from a recoverable fault");
        }
    }
    SCB::sys_reset()
}
