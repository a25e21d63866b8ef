//! Timing constants and multi-echo tuning
//!
//! Overheads are small empirical corrections for the time spent between
//! the echo edge and the clock read. They differ per platform: register
//! access on AVR is slower relative to its clock than generic pin calls on
//! ARM.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing constants for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    /// Correction subtracted from blocking ping results (us)
    pub ping_overhead_us: u32,
    /// Correction subtracted from timer ping results (us)
    pub timer_overhead_us: u32,
    /// Longest time a sensor may take to start its echo pulse (us)
    ///
    /// Most sensors start within 450us; the SRF06 can take far longer.
    pub max_sensor_start_delay_us: u32,
    /// Minimum spacing between consecutive ping starts (us)
    ///
    /// Reverberation from one ping has to decay before the next trigger.
    pub ping_median_delay_us: u32,
    /// Polling interval of the timer-driven ping (us)
    ///
    /// 24us is about 0.4cm of resolution.
    pub echo_timer_interval_us: u32,
    /// Trigger low time before the pulse (us)
    pub trigger_settle_us: u32,
    /// Trigger pulse width (us), 10us per sensor datasheets
    pub trigger_pulse_us: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::avr()
    }
}

impl TimingConfig {
    /// Timing for 8-bit AVR targets
    pub const fn avr() -> Self {
        Self {
            ping_overhead_us: 5,
            timer_overhead_us: 13,
            max_sensor_start_delay_us: 5_800,
            ping_median_delay_us: 29_000,
            echo_timer_interval_us: 24,
            trigger_settle_us: 4,
            trigger_pulse_us: 10,
        }
    }

    /// Timing for 32-bit ARM targets
    pub const fn arm() -> Self {
        Self {
            ping_overhead_us: 1,
            timer_overhead_us: 1,
            ..Self::avr()
        }
    }

    /// Spacing between pings in whole milliseconds
    pub const fn ping_median_delay_ms(&self) -> u32 {
        self.ping_median_delay_us / 1000
    }
}

/// Integer ratio `num / den`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ratio {
    pub num: u16,
    pub den: u16,
}

impl Ratio {
    /// Create a new ratio
    pub const fn new(num: u16, den: u16) -> Self {
        Self { num, den }
    }

    /// Scale `value` by this ratio, rounding down
    ///
    /// A zero denominator yields 0; [`SensorConfig::validate`] rejects it
    /// before a driver is built.
    ///
    /// [`SensorConfig::validate`]: super::SensorConfig::validate
    pub const fn apply(&self, value: u32) -> u32 {
        if self.den == 0 {
            return 0;
        }
        (value as u64 * self.num as u64 / self.den as u64) as u32
    }
}

/// Multi-echo disambiguation parameters
///
/// Both defaults are empirical and have no documented derivation. They
/// need calibration against real sensor data before being trusted for a
/// new sensor or mounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MultiEchoTuning {
    /// A second-pulse echo shorter than this share of the first echo is a
    /// late reflection of the first pulse, i.e. a new surface
    pub shorter_echo_ratio: Ratio,
    /// Share of the first echo added to the wait window after a miss
    pub retry_step: Ratio,
}

impl Default for MultiEchoTuning {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiEchoTuning {
    /// Default tuning (3/4 and 1/2)
    pub const fn new() -> Self {
        Self {
            shorter_echo_ratio: Ratio::new(3, 4),
            retry_step: Ratio::new(1, 2),
        }
    }
}
