//! Persistent storage abstractions
//!
//! Fault records live in RAM that survives a warm reset (a `.uninit`
//! section or battery-backed SRAM). Some platforms additionally mirror that
//! region into non-volatile memory; the safety core only asks for that
//! mirror to be scheduled.

/// Reset-persistent storage backing the fault log
pub trait PersistentStore {
    /// Schedule a flush of the persistent region to non-volatile memory
    ///
    /// Fire-and-forget: called from exception context after every record,
    /// so it must neither block nor report failure. Platforms whose
    /// persistent region needs no flush leave this empty.
    fn flush(&mut self);
}
