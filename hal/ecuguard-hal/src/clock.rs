//! Timestamp source

/// Monotonic millisecond clock
///
/// The counter wraps at `u32::MAX`; consumers compute intervals with
/// `wrapping_sub` so a wrap between two samples is harmless.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch (usually boot)
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
