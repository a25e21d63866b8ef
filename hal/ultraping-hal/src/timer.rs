//! Periodic timer interrupt abstraction
//!
//! The timer-driven ping arms a periodic interrupt that polls the echo
//! line. The timer is owned by the caller and lent to the driver, so only
//! one timer ping can hold it at a time.

/// Periodic timer interrupt
///
/// `callback` is invoked from interrupt context every `interval_us`
/// microseconds until [`cancel_periodic`](PeriodicTimer::cancel_periodic)
/// is called. Scheduling again replaces the previous callback.
pub trait PeriodicTimer {
    /// Start calling `callback` every `interval_us` microseconds
    fn schedule_periodic(&mut self, interval_us: u32, callback: fn());

    /// Stop the periodic interrupt
    fn cancel_periodic(&mut self);
}
