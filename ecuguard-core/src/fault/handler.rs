//! Common CPU fault handler
//!
//! Runs in exception context for HardFault, MemManage, BusFault and
//! UsageFault. The platform adapter captures an [`ExceptionContext`], calls
//! [`FaultHandler::on_exception`] and applies the returned [`FaultOutcome`]
//! to the exception frame.

use ecuguard_hal::{Clock, FaultStatusRegisters, PersistentStore};

use super::classify::{classify, FaultClass};
use super::context::{ExceptionContext, FaultRecord};
use super::log::FaultLog;
use crate::diag::{DiagCode, DiagnosticSink};
use crate::safe_state::{DegradeReason, ResetRequired, SafeStateController, SafeStateReason};

/// What the platform adapter must do after the handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultOutcome {
    /// Advance the stacked PC past the faulting instruction and return
    SkipInstruction,
    /// Return from the exception unchanged (degraded mode entered)
    Resume,
    /// Safe state requested; force a system reset
    Reset(ResetRequired),
}

/// Fault handler collaborators
///
/// All members are used from exception context and must honour its rules:
/// no allocation, no blocking, bounded loops only.
pub struct FaultHandler<C, R, P, S, D> {
    clock: C,
    registers: R,
    store: P,
    safe_state: S,
    diag: D,
}

impl<C, R, P, S, D> FaultHandler<C, R, P, S, D>
where
    C: Clock,
    R: FaultStatusRegisters,
    P: PersistentStore,
    S: SafeStateController,
    D: DiagnosticSink,
{
    pub fn new(clock: C, registers: R, store: P, safe_state: S, diag: D) -> Self {
        Self {
            clock,
            registers,
            store,
            safe_state,
            diag,
        }
    }

    /// Read the live fault-status registers for a freshly stacked frame
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// Record, clear, classify and act on a captured exception
    ///
    /// The record is written (and flushed) before any branch on the
    /// classification, and the latched status bits are cleared so the next
    /// fault starts from a clean status.
    pub fn on_exception<const N: usize>(
        &mut self,
        log: &mut FaultLog<N>,
        context: &ExceptionContext,
    ) -> FaultOutcome {
        log.record(FaultRecord {
            context: *context,
            timestamp_ms: self.clock.now_ms(),
        });
        self.store.flush();

        self.registers.clear(&context.status);

        let class = classify(context);
        self.diag
            .error(DiagCode::CpuFault, &[context.frame.pc, context.status.cfsr]);

        match class {
            FaultClass::Recoverable => FaultOutcome::SkipInstruction,
            FaultClass::Degraded => {
                self.safe_state.enter_degraded_mode(DegradeReason::BusFault);
                FaultOutcome::Resume
            }
            FaultClass::Fatal => {
                let reason = SafeStateReason::CpuFault;
                self.diag.emergency(DiagCode::CpuFault, &[context.frame.pc]);
                self.safe_state.enter_safe_state(reason);
                FaultOutcome::Reset(ResetRequired(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{CfsrFlags, LoggedFault, StackedFrame};
    use crate::mock::{
        CountingStore, DiagRecorder, MockClock, MockFaultRegisters, SafeStateRecorder,
    };
    use ecuguard_hal::FaultStatus;

    struct Fixture {
        clock: MockClock,
        diag: DiagRecorder,
        safe: SafeStateRecorder,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                clock: MockClock::new(4_200),
                diag: DiagRecorder::new(),
                safe: SafeStateRecorder::new(),
            }
        }

        fn handler(
            &self,
            cfsr: u32,
        ) -> FaultHandler<
            &MockClock,
            MockFaultRegisters,
            CountingStore,
            &SafeStateRecorder,
            &DiagRecorder,
        > {
            let registers = MockFaultRegisters {
                status: FaultStatus {
                    cfsr,
                    ..Default::default()
                },
                cleared: None,
            };
            FaultHandler::new(
                &self.clock,
                registers,
                CountingStore::default(),
                &self.safe,
                &self.diag,
            )
        }
    }

    fn capture<R: FaultStatusRegisters>(registers: &R) -> ExceptionContext {
        let frame = StackedFrame {
            pc: 0x0800_2000,
            lr: 0x0800_1F01,
            psr: 0x0100_0000,
            ..Default::default()
        };
        ExceptionContext::capture(frame, registers)
    }

    #[test]
    fn test_divide_by_zero_skips_instruction() {
        let fx = Fixture::new();
        let mut handler = fx.handler(CfsrFlags::DIVBYZERO.bits());
        let mut log: FaultLog<4> = FaultLog::new();

        let ctx = capture(handler.registers());
        let outcome = handler.on_exception(&mut log, &ctx);

        assert_eq!(outcome, FaultOutcome::SkipInstruction);
        assert_eq!(fx.safe.safe_state_calls(), 0);
        assert_eq!(fx.safe.degraded_calls(), 0);
    }

    #[test]
    fn test_bus_error_enters_degraded_mode() {
        let fx = Fixture::new();
        let mut handler = fx.handler((CfsrFlags::PRECISERR | CfsrFlags::BFARVALID).bits());
        let mut log: FaultLog<4> = FaultLog::new();

        let ctx = capture(handler.registers());
        assert_eq!(handler.on_exception(&mut log, &ctx), FaultOutcome::Resume);
        assert_eq!(fx.safe.last_degraded(), Some(DegradeReason::BusFault));
        assert_eq!(fx.safe.safe_state_calls(), 0);
    }

    #[test]
    fn test_fatal_requests_safe_state_and_reset() {
        let fx = Fixture::new();
        let mut handler = fx.handler(CfsrFlags::IACCVIOL.bits());
        let mut log: FaultLog<4> = FaultLog::new();

        let ctx = capture(handler.registers());
        let outcome = handler.on_exception(&mut log, &ctx);

        assert_eq!(
            outcome,
            FaultOutcome::Reset(ResetRequired(SafeStateReason::CpuFault))
        );
        assert_eq!(fx.safe.last_safe_state(), Some(SafeStateReason::CpuFault));
    }

    #[test]
    fn test_forced_hardfault_resets() {
        let fx = Fixture::new();
        let mut handler = fx.handler(0);
        handler.registers.status.hfsr = 1 << 30;
        let mut log: FaultLog<4> = FaultLog::new();

        let ctx = capture(handler.registers());
        match handler.on_exception(&mut log, &ctx) {
            FaultOutcome::Reset(ResetRequired(reason)) => {
                assert_eq!(reason, SafeStateReason::CpuFault)
            }
            other => panic!("forced HardFault must reset, got {:?}", other),
        }
        assert_eq!(fx.safe.safe_state_calls(), 1);
        assert_eq!(log.count(), 1);
    }

    #[test]
    fn test_fault_recorded_and_flushed_before_action() {
        let fx = Fixture::new();
        let mut handler = fx.handler(CfsrFlags::UNDEFINSTR.bits());
        let mut log: FaultLog<4> = FaultLog::new();

        let ctx = capture(handler.registers());
        let _ = handler.on_exception(&mut log, &ctx);

        assert_eq!(handler.store.flushes, 1);
        let entry = log.read(1).next().unwrap();
        match entry {
            LoggedFault::Intact(record) => {
                assert_eq!(record.context, ctx);
                assert_eq!(record.timestamp_ms, 4_200);
            }
            LoggedFault::Corrupted { .. } => panic!("fresh record must verify"),
        }
    }

    #[test]
    fn test_latched_status_cleared() {
        let fx = Fixture::new();
        let mut handler = fx.handler(CfsrFlags::DIVBYZERO.bits());
        let mut log: FaultLog<4> = FaultLog::new();

        let ctx = capture(handler.registers());
        let _ = handler.on_exception(&mut log, &ctx);

        assert_eq!(handler.registers().cleared, Some(ctx.status));
        assert_eq!(handler.registers().read().cfsr, 0);
    }
}
