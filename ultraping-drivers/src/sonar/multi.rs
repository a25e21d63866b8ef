//! Multi-echo and threshold ranging
//!
//! Runs the two-pulse rounds of [`MultiEchoSearch`] against the sensor.
//! Each round fires a first pulse to re-establish timing, waits out the
//! search window, then fires a second pulse whose echo tells a farther
//! surface apart from a plain repeat of the first echo.

use ultraping_core::{
    EchoTime, FirstEchoOutcome, MultiEchoSearch, PingError, SecondEchoOutcome, NO_ECHO,
};
use ultraping_hal::Platform;

use super::Sonar;

impl<P: Platform> Sonar<P> {
    /// Find up to `hits.len()` surfaces along the beam
    ///
    /// Hit times are round-trip microseconds from the start of the first
    /// pulse of the round that found them, in the order found. Returns the
    /// number of hits written. A trigger failure is reported as 0, the
    /// same as finding nothing; use [`try_ping_multi`](Self::try_ping_multi)
    /// to tell them apart.
    ///
    /// # Arguments
    /// - `hits`: Output buffer, its length is the maximum number of hits
    /// - `threshold_distance`: Surfaces closer than this are not reported
    /// - `max_distance`: Distance ceiling override (0 keeps the current one)
    pub fn ping_multi(
        &mut self,
        hits: &mut [EchoTime],
        threshold_distance: u16,
        max_distance: u16,
    ) -> usize {
        self.try_ping_multi(hits, threshold_distance, max_distance)
            .unwrap_or(0)
    }

    /// Find up to `hits.len()` surfaces along the beam
    ///
    /// Stops early with the hits found so far when an echo outlasts the
    /// max-distance window. Fails when the sensor cannot be triggered.
    pub fn try_ping_multi(
        &mut self,
        hits: &mut [EchoTime],
        threshold_distance: u16,
        max_distance: u16,
    ) -> Result<usize, PingError> {
        self.apply_max_distance(max_distance);

        let overhead = self.config.timing.ping_overhead_us;
        let threshold_us = threshold_distance as u32 * self.config.us_per_unit();
        let mut search = MultiEchoSearch::new(hits.len(), threshold_us, self.config.tuning);

        while !search.is_complete() {
            // First pulse
            self.trigger_pulse()?;
            let first = self.deadline;
            let first_end = match self.wait_echo_end(first) {
                Ok(end) => end,
                Err(_) => return Ok(self.multi_done(&search)),
            };
            let first_length = first.echo_time(first_end, overhead);

            if let FirstEchoOutcome::Hit { index, echo } = search.on_first_echo(first_length) {
                hits[index] = echo;
                if search.is_complete() {
                    break;
                }
            }

            let second_at = search.second_pulse_at(first.pulse_start_us());
            while self.platform.now_micros() < second_at {
                core::hint::spin_loop();
            }

            // Second pulse, bounded by the first pulse's window
            self.trigger_pulse()?;
            let second = self.deadline;
            let second_end = match self.wait_echo_end(first) {
                Ok(end) => end,
                Err(_) => return Ok(self.multi_done(&search)),
            };
            let second_length = second.echo_time(second_end, overhead);
            let hit_time = first.echo_time(second_end, overhead);

            match search.on_second_echo(first_length, second_length, hit_time) {
                SecondEchoOutcome::Hit { index, echo } => {
                    hits[index] = echo;

                    #[cfg(feature = "defmt")]
                    defmt::trace!("multi-echo hit {}: {}us", index, echo);
                }
                SecondEchoOutcome::Rejected { .. } => {
                    #[cfg(feature = "defmt")]
                    defmt::trace!(
                        "second echo {}us vs first {}us, window now {}us",
                        second_length,
                        first_length,
                        search.offset_us()
                    );
                }
            }

            if !search.is_complete() {
                self.platform.delay_ms(self.config.timing.ping_median_delay_ms());
            }
        }

        Ok(self.multi_done(&search))
    }

    /// First surface beyond `threshold_distance`, as a round-trip time
    ///
    /// Returns [`NO_ECHO`] when nothing was found or the sensor could not
    /// be triggered.
    pub fn ping_threshold(&mut self, threshold_distance: u16, max_distance: u16) -> EchoTime {
        self.try_ping_threshold(threshold_distance, max_distance)
            .unwrap_or(NO_ECHO)
    }

    /// First surface beyond `threshold_distance`, as a round-trip time
    pub fn try_ping_threshold(
        &mut self,
        threshold_distance: u16,
        max_distance: u16,
    ) -> Result<EchoTime, PingError> {
        let mut hit = [NO_ECHO; 1];
        match self.try_ping_multi(&mut hit, threshold_distance, max_distance)? {
            0 => Err(self.fail(PingError::NoHitsFound)),
            _ => Ok(hit[0]),
        }
    }

    fn multi_done(&mut self, search: &MultiEchoSearch) -> usize {
        let found = search.hits_found();
        if found > 0 {
            self.last_error = None;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("multi-echo run found {} hits, window {}us", found, search.offset_us());

        found
    }
}
