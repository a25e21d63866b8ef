//! Clock and delay abstractions
//!
//! The ranging driver measures time of flight against a free-running
//! microsecond clock and uses busy delays for the trigger pulse.

/// Free-running microsecond clock
///
/// Must be monotonic over the span of one ping (a few tens of
/// milliseconds). A 64-bit counter avoids the wraparound handling a
/// 32-bit `micros()` would need.
pub trait Clock {
    /// Microseconds since an arbitrary epoch
    fn now_micros(&mut self) -> u64;
}

/// Blocking delays
pub trait Delay {
    /// Busy-wait for `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Wait for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}
