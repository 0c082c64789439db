//! CPU fault handling
//!
//! Captured exception contexts are recorded into an integrity-protected
//! log, classified into a [`FaultClass`] and turned into a recovery action.
//!
//! ```text
//! exception entry ─► ExceptionContext ─► FaultLog::record
//!                                     ─► clear latched status bits
//!                                     ─► classify ─► Resume / Degraded / Safe state
//! ```

pub mod classify;
pub mod context;
pub mod handler;
pub mod log;

pub use classify::{classify, thumb_instruction_len, CfsrFlags, FaultClass};
pub use context::{ExceptionContext, FaultRecord, StackedFrame};
pub use handler::{FaultHandler, FaultOutcome};
pub use log::{FaultLog, LoggedFault, FAULT_LOG_CAPACITY};
