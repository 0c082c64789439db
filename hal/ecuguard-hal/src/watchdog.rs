//! Hardware watchdog countdown

/// Hardware watchdog peripheral
///
/// Programming and enabling are separate steps so the safety core decides
/// when the countdown becomes live. Once enabled, most watchdog peripherals
/// cannot be stopped again until the next reset.
pub trait WatchdogTimer {
    /// Program the countdown reload value for `timeout_ms`
    ///
    /// Called before [`enable`](Self::enable). Must not start the countdown.
    fn program(&mut self, timeout_ms: u32);

    /// Set the enable and reset-on-timeout bits
    fn enable(&mut self);

    /// Reload the countdown
    ///
    /// Must be callable from the foreground loop without blocking.
    fn refresh(&mut self);
}
