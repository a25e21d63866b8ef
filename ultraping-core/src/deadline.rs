//! Ping deadlines
//!
//! Every wait loop of a ping is bounded by an absolute timestamp. Before
//! the echo starts the budget also covers the sensor's start delay; once
//! the echo line goes active the deadline is reset to exactly one
//! max-echo window, which makes the pulse start recoverable as
//! `deadline - max_echo_time`.

use crate::EchoTime;

/// Absolute time limit for one trigger attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PingDeadline {
    /// Absolute limit (us)
    at_us: u64,
    /// Max-echo window this deadline was built from (us)
    max_echo_time_us: u32,
}

impl PingDeadline {
    /// Deadline for the echo to start after the trigger pulse
    pub const fn awaiting_echo(now_us: u64, max_echo_time_us: u32, start_delay_us: u32) -> Self {
        Self {
            at_us: now_us + max_echo_time_us as u64 + start_delay_us as u64,
            max_echo_time_us,
        }
    }

    /// Deadline for the echo to end, set when the echo line goes active
    pub const fn echo_started(now_us: u64, max_echo_time_us: u32) -> Self {
        Self {
            at_us: now_us + max_echo_time_us as u64,
            max_echo_time_us,
        }
    }

    /// Absolute limit (us)
    pub const fn at_us(&self) -> u64 {
        self.at_us
    }

    /// Check if `now_us` is past the deadline
    pub const fn is_expired(&self, now_us: u64) -> bool {
        now_us > self.at_us
    }

    /// Timestamp at which the echo pulse started
    ///
    /// Only meaningful for deadlines built by [`echo_started`](Self::echo_started).
    pub const fn pulse_start_us(&self) -> u64 {
        self.at_us.saturating_sub(self.max_echo_time_us as u64)
    }

    /// Round-trip time from the pulse start to `now_us`, less `overhead_us`
    ///
    /// Never returns 0, which is reserved for "no echo".
    pub fn echo_time(&self, now_us: u64, overhead_us: u32) -> EchoTime {
        let elapsed = now_us
            .saturating_sub(self.pulse_start_us())
            .saturating_sub(overhead_us as u64);
        (elapsed.min(EchoTime::MAX as u64) as EchoTime).max(1)
    }
}
