//! Multi-echo disambiguation
//!
//! A plain ping only sees the first surface along the beam. To see past
//! it, each round fires two pulses. The first measures the primary echo.
//! The second is delayed by a wait window (`offset`) so that any late
//! reflection of the first pulse lands while the sensor is listening for
//! the second one.
//!
//! The second pulse's own echo can then be either:
//! - much shorter than the first echo: the sensor heard a late reflection
//!   of the first pulse, i.e. a new, farther surface; or
//! - about as long as the first echo or longer: just the primary echo of
//!   the second pulse again.
//!
//! A new surface is recorded and the window moves past it. Otherwise the
//! window grows by a step and the round is retried.
//!
//! Times are round-trip microseconds; hit times are measured from the
//! start of the round's first pulse.

use crate::config::MultiEchoTuning;
use crate::EchoTime;

/// Result of processing a round's first echo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirstEchoOutcome {
    /// First round, echo beyond the threshold: recorded as hit `index`
    Hit { index: usize, echo: EchoTime },
    /// First round, echo at or inside the threshold: the window starts at the threshold
    BelowThreshold,
    /// Later round: the first echo only re-establishes timing
    Repeat,
}

/// Result of processing a round's second echo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SecondEchoOutcome {
    /// Late reflection of the first pulse: new surface recorded as hit `index`
    Hit { index: usize, echo: EchoTime },
    /// Primary echo of the second pulse: window widened to `offset`
    Rejected { offset: u32 },
}

/// Offset and hit bookkeeping for one multi-echo run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MultiEchoSearch {
    max_hits: usize,
    hits_found: usize,
    /// Wait window between the first and second pulse of a round (us)
    offset_us: u32,
    threshold_us: u32,
    first_round: bool,
    tuning: MultiEchoTuning,
}

impl MultiEchoSearch {
    /// Start a run looking for up to `max_hits` surfaces
    ///
    /// # Arguments
    /// - `max_hits`: Capacity of the caller's hit buffer
    /// - `threshold_us`: Echoes up to this round-trip time count as the
    ///   expected near obstacle, not as hits
    /// - `tuning`: Disambiguation ratios
    pub fn new(max_hits: usize, threshold_us: u32, tuning: MultiEchoTuning) -> Self {
        Self {
            max_hits,
            hits_found: 0,
            offset_us: 0,
            threshold_us,
            first_round: true,
            tuning,
        }
    }

    /// Number of hits recorded so far
    pub fn hits_found(&self) -> usize {
        self.hits_found
    }

    /// Current wait window (us)
    pub fn offset_us(&self) -> u32 {
        self.offset_us
    }

    /// Check if the hit buffer is full
    pub fn is_complete(&self) -> bool {
        self.hits_found >= self.max_hits
    }

    /// Absolute time at which the round's second pulse may fire
    pub fn second_pulse_at(&self, first_pulse_start_us: u64) -> u64 {
        first_pulse_start_us + self.offset_us as u64
    }

    /// Process the echo of a round's first pulse
    pub fn on_first_echo(&mut self, first_length: EchoTime) -> FirstEchoOutcome {
        if !self.first_round {
            return FirstEchoOutcome::Repeat;
        }
        self.first_round = false;

        if first_length > self.threshold_us {
            self.offset_us = first_length;
            match self.record() {
                Some(index) => FirstEchoOutcome::Hit {
                    index,
                    echo: first_length,
                },
                // No room for hits at all
                None => FirstEchoOutcome::Repeat,
            }
        } else {
            self.offset_us = self.threshold_us;
            FirstEchoOutcome::BelowThreshold
        }
    }

    /// Process the echo of a round's second pulse
    ///
    /// # Arguments
    /// - `first_length`: Echo time of this round's first pulse
    /// - `second_length`: Echo time of the second pulse, from its own start
    /// - `hit_time`: Second echo end, measured from the first pulse start
    pub fn on_second_echo(
        &mut self,
        first_length: EchoTime,
        second_length: EchoTime,
        hit_time: EchoTime,
    ) -> SecondEchoOutcome {
        if second_length < self.tuning.shorter_echo_ratio.apply(first_length) {
            if let Some(index) = self.record() {
                self.offset_us = hit_time;
                return SecondEchoOutcome::Hit {
                    index,
                    echo: hit_time,
                };
            }
        }

        // The window must grow or the retry would repeat forever
        let step = self.tuning.retry_step.apply(first_length).max(1);
        self.offset_us = self.offset_us.saturating_add(step);
        SecondEchoOutcome::Rejected {
            offset: self.offset_us,
        }
    }

    fn record(&mut self) -> Option<usize> {
        if self.is_complete() {
            return None;
        }
        let index = self.hits_found;
        self.hits_found += 1;
        Some(index)
    }
}
