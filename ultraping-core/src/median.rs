//! Median filtering window
//!
//! A run of pings is collected into a small window kept in descending
//! order by insertion sort. Out-of-range pings are discarded and shrink
//! the sample target, so the run always ends after at most the requested
//! number of pings.

use heapless::Vec;

use crate::EchoTime;

/// Largest number of samples in one median run
pub const MAX_MEDIAN_SAMPLES: usize = 32;

/// Sorted sample window for one median run
#[derive(Debug, Clone)]
pub struct MedianWindow {
    /// Valid samples, largest first
    samples: Vec<EchoTime, MAX_MEDIAN_SAMPLES>,
    /// Samples still expected (requested count minus discards)
    target: usize,
}

impl MedianWindow {
    /// Create a window for `samples` pings (clamped to [`MAX_MEDIAN_SAMPLES`])
    pub fn new(samples: u8) -> Self {
        Self {
            samples: Vec::new(),
            target: (samples as usize).min(MAX_MEDIAN_SAMPLES),
        }
    }

    /// Number of samples the run is still aiming for
    pub fn target(&self) -> usize {
        self.target
    }

    /// Number of valid samples collected
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no valid sample has been collected
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check if the run has collected all the samples it expects
    pub fn is_complete(&self) -> bool {
        self.samples.len() >= self.target
    }

    /// Add a valid sample in sorted position
    ///
    /// Ignored once the window is complete.
    pub fn insert(&mut self, echo: EchoTime) {
        if self.is_complete() || self.samples.push(echo).is_err() {
            return;
        }

        // Shift smaller samples up until the new one is in place
        let mut j = self.samples.len() - 1;
        while j > 0 && self.samples[j - 1] < echo {
            self.samples[j] = self.samples[j - 1];
            j -= 1;
        }
        self.samples[j] = echo;
    }

    /// Drop one sample from the target after an out-of-range ping
    pub fn discard(&mut self) {
        self.target = self.target.saturating_sub(1);
    }

    /// Middle sample, `window[target / 2]`
    ///
    /// `None` when every ping was discarded or the run is not complete yet.
    pub fn median(&self) -> Option<EchoTime> {
        if self.target == 0 {
            return None;
        }
        self.samples.get(self.target / 2).copied()
    }

    /// Collected samples, largest first
    pub fn as_slice(&self) -> &[EchoTime] {
        &self.samples
    }
}
