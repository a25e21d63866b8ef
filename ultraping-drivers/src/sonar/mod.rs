//! Sonar driver
//!
//! Owns the sensor configuration and the platform, and implements the
//! trigger/echo timing shared by every ranging operation.
//!
//! # Usage
//!
//! ```ignore
//! let mut sonar = Sonar::new(platform, SensorConfig::new(12, 11).with_max_distance(200))?;
//!
//! let echo_us = sonar.ping(0);            // 0 = no echo
//! let cm = sonar.ping_length(0);
//! let filtered = sonar.ping_median(5, 0);
//!
//! let mut hits = [0; 3];
//! let found = sonar.ping_multi(&mut hits, 0, 0);
//! ```
//!
//! Every sentinel-returning call has a `try_` counterpart that reports
//! the cause of a missing measurement as a [`PingError`].

mod interrupt;
mod multi;

use ultraping_core::{
    convert, ConfigError, EchoTime, MedianWindow, PingDeadline, PingError, SensorConfig, NO_ECHO,
};
use ultraping_hal::{Pin, PinMode, Platform};

/// Ultrasonic sensor driver
///
/// One instance per sensor. Operations busy-wait on the calling core and
/// must not interleave for the same sensor or for sensors sharing a pin.
pub struct Sonar<P> {
    platform: P,
    config: SensorConfig,
    trigger: Pin,
    echo: Pin,
    /// Longest echo time accepted (us)
    max_echo_time_us: u32,
    /// Deadline of the most recent trigger
    deadline: PingDeadline,
    /// Timer ping in flight
    timer_armed: bool,
    /// Result of the last successful timer ping (us)
    ping_result: EchoTime,
    /// Cause of the last missing measurement
    last_error: Option<PingError>,
}

impl<P: Platform> Sonar<P> {
    /// Create a new driver and configure the pins
    ///
    /// The echo pin becomes an input and the trigger pin an output. With a
    /// shared pin (one-pin mode) the pin idles as input and is switched to
    /// output around each trigger pulse.
    pub fn new(platform: P, config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sonar = Self {
            platform,
            trigger: Pin(config.trigger_pin),
            echo: Pin(config.echo_pin),
            max_echo_time_us: 0,
            deadline: PingDeadline::echo_started(0, 0),
            timer_armed: false,
            ping_result: NO_ECHO,
            last_error: None,
            config,
        };
        sonar.set_max_distance(sonar.config.max_distance);

        sonar.platform.set_pin_mode(sonar.echo, PinMode::Input);
        if !sonar.config.is_one_pin() {
            sonar.platform.set_pin_mode(sonar.trigger, PinMode::Output);
        }

        Ok(sonar)
    }

    /// Create a driver with default options for a two-pin or one-pin sensor
    pub fn with_defaults(platform: P, trigger_pin: u8, echo_pin: u8) -> Result<Self, ConfigError> {
        Self::new(platform, SensorConfig::new(trigger_pin, echo_pin))
    }

    /// Set the distance ceiling for subsequent pings
    ///
    /// Clamped to the sensor's maximum distance. Must not be called while
    /// a timer ping is in flight.
    pub fn set_max_distance(&mut self, max_distance: u16) {
        self.config.max_distance = max_distance.min(self.config.max_sensor_distance);
        self.max_echo_time_us = convert::max_echo_time_us(
            self.config.max_distance,
            self.config.max_sensor_distance,
            self.config.us_per_unit(),
            self.config.rounding,
        );
    }

    /// Current distance ceiling in length units
    pub fn max_distance(&self) -> u16 {
        self.config.max_distance
    }

    /// Longest echo time accepted (us)
    pub fn max_echo_time_us(&self) -> u32 {
        self.max_echo_time_us
    }

    /// Get the configuration
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Cause of the most recent missing measurement, if the last
    /// operation produced none
    pub fn last_error(&self) -> Option<PingError> {
        self.last_error
    }

    /// Get access to the underlying platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Get mutable access to the underlying platform
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Release the platform
    pub fn release(self) -> P {
        self.platform
    }

    /// Convert an echo time to whole length units
    pub fn convert_length(&self, echo_time_us: EchoTime) -> u32 {
        convert::convert_length(echo_time_us, self.config.us_per_unit(), self.config.rounding)
    }

    /// Send a ping and return the echo time in microseconds
    ///
    /// A non-zero `max_distance` replaces the configured ceiling first.
    /// Returns [`NO_ECHO`] (0) when there is no measurement; see
    /// [`last_error`](Self::last_error) or [`try_ping`](Self::try_ping)
    /// for the cause.
    pub fn ping(&mut self, max_distance: u16) -> EchoTime {
        self.try_ping(max_distance).unwrap_or(NO_ECHO)
    }

    /// Send a ping and return the echo time in microseconds
    pub fn try_ping(&mut self, max_distance: u16) -> Result<EchoTime, PingError> {
        self.apply_max_distance(max_distance);
        self.trigger_pulse()?;

        let deadline = self.deadline;
        let end = self.wait_echo_end(deadline)?;

        self.last_error = None;
        Ok(deadline.echo_time(end, self.config.timing.ping_overhead_us))
    }

    /// Send a ping and return the distance in whole length units
    ///
    /// 0 means no echo.
    pub fn ping_length(&mut self, max_distance: u16) -> u32 {
        let echo_time = self.ping(max_distance);
        self.convert_length(echo_time)
    }

    /// Median of `samples` pings, in microseconds
    ///
    /// Out-of-range pings are discarded and not replaced, so the median is
    /// taken over the remaining valid pings. Returns [`NO_ECHO`] when every
    /// ping was out of range.
    pub fn ping_median(&mut self, samples: u8, max_distance: u16) -> EchoTime {
        self.try_ping_median(samples, max_distance).unwrap_or(NO_ECHO)
    }

    /// Median of `samples` pings, in microseconds
    ///
    /// Consecutive ping starts are spaced by at least the configured
    /// median delay (29ms by default) so that reverberation from one ping
    /// has decayed before the next trigger.
    pub fn try_ping_median(&mut self, samples: u8, max_distance: u16) -> Result<EchoTime, PingError> {
        let mut window = MedianWindow::new(samples);
        let spacing_us = self.config.timing.ping_median_delay_us as u64;

        while !window.is_complete() {
            let started = self.platform.now_micros();

            match self.try_ping(max_distance) {
                Ok(echo) => window.insert(echo),
                Err(_) => window.discard(),
            }

            if !window.is_complete() {
                let elapsed = self.platform.now_micros().saturating_sub(started);
                if elapsed < spacing_us {
                    self.platform.delay_ms(((spacing_us - elapsed) / 1000) as u32);
                }
            }
        }

        match window.median() {
            Some(median) => {
                self.last_error = None;
                Ok(median)
            }
            None => Err(self.fail(PingError::NoValidSamples)),
        }
    }

    /// Apply a per-call distance override (0 keeps the current ceiling)
    fn apply_max_distance(&mut self, max_distance: u16) {
        if max_distance > 0 {
            self.set_max_distance(max_distance);
        }
    }

    /// Check if the echo line is in its active state
    fn echo_active(&mut self) -> bool {
        self.platform.read_digital_input(self.echo) == self.config.model.echo_active_high()
    }

    /// Fire a trigger pulse and wait for the echo to start
    ///
    /// On success `self.deadline` is one max-echo window after the echo
    /// start, which is the timeout for the echo to end.
    fn trigger_pulse(&mut self) -> Result<(), PingError> {
        let one_pin = self.config.is_one_pin();
        let timing = self.config.timing;

        if one_pin {
            self.platform.set_pin_mode(self.trigger, PinMode::Output);
        }

        // Clean falling edge, then the pulse itself
        self.platform.set_low(self.trigger);
        self.platform.delay_us(timing.trigger_settle_us);
        self.platform.set_high(self.trigger);
        self.platform.delay_us(timing.trigger_pulse_us);
        self.platform.set_low(self.trigger);

        if one_pin {
            self.platform.set_pin_mode(self.trigger, PinMode::Input);
        }

        // Previous ping hasn't finished
        if self.echo_active() {
            return Err(self.fail(PingError::PulseBusy));
        }

        let now = self.platform.now_micros();
        let start_deadline =
            PingDeadline::awaiting_echo(now, self.max_echo_time_us, timing.max_sensor_start_delay_us);
        while !self.echo_active() {
            if start_deadline.is_expired(self.platform.now_micros()) {
                return Err(self.fail(PingError::EchoNeverStarted));
            }
        }

        self.deadline = PingDeadline::echo_started(self.platform.now_micros(), self.max_echo_time_us);
        Ok(())
    }

    /// Wait for the echo line to go inactive, returning the time it did
    fn wait_echo_end(&mut self, deadline: PingDeadline) -> Result<u64, PingError> {
        while self.echo_active() {
            if deadline.is_expired(self.platform.now_micros()) {
                return Err(self.fail(PingError::EchoTimeout));
            }
        }
        Ok(self.platform.now_micros())
    }

    /// Record and log a failure
    fn fail(&mut self, error: PingError) -> PingError {
        #[cfg(feature = "defmt")]
        defmt::debug!("sonar on pin {}: {}", self.trigger, error);

        self.last_error = Some(error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Echo, SimEvent, SimPlatform};
    use proptest::prelude::*;
    use ultraping_core::{LengthUnit, Rounding, SensorModel, TimingConfig};
    use ultraping_hal::{Delay, Level};

    /// Timing with no overhead correction so results equal echo durations
    pub(crate) fn exact_timing() -> TimingConfig {
        TimingConfig {
            ping_overhead_us: 0,
            timer_overhead_us: 0,
            ..TimingConfig::avr()
        }
    }

    pub(crate) fn sonar(script: &[Echo]) -> Sonar<SimPlatform> {
        let config = SensorConfig::new(2, 3).with_timing(exact_timing());
        Sonar::new(SimPlatform::new(Pin(2), Pin(3), script), config).unwrap()
    }

    #[test]
    fn test_new_configures_pins() {
        let sonar = sonar(&[]);
        let log = &sonar.platform().log;

        assert!(log.contains(&SimEvent::Mode(Pin(3), PinMode::Input)));
        assert!(log.contains(&SimEvent::Mode(Pin(2), PinMode::Output)));
        assert_eq!(sonar.max_echo_time_us(), 501 * 57);
    }

    #[test]
    fn test_new_rejects_shared_pin_without_one_pin() {
        let mut config = SensorConfig::one_pin(4);
        config.one_pin_enabled = false;

        let result = Sonar::new(SimPlatform::new(Pin(4), Pin(4), &[]), config);
        assert!(matches!(result, Err(ConfigError::SharedPinWithoutOnePin)));
    }

    #[test]
    fn test_set_max_distance_clamps() {
        let mut sonar = sonar(&[]);

        sonar.set_max_distance(200);
        assert_eq!(sonar.max_distance(), 200);
        assert_eq!(sonar.max_echo_time_us(), 201 * 57);

        sonar.set_max_distance(900);
        assert_eq!(sonar.max_distance(), 500);
        assert_eq!(sonar.max_echo_time_us(), 501 * 57);
    }

    #[test]
    fn test_ping_measures_echo_duration() {
        let mut sonar = sonar(&[Echo::pulse(100, 1_000)]);

        assert_eq!(sonar.ping(0), 1_000);
        assert_eq!(sonar.last_error(), None);
        assert_eq!(sonar.platform().triggers.len(), 1);
    }

    #[test]
    fn test_ping_subtracts_overhead() {
        let config = SensorConfig::new(2, 3).with_timing(TimingConfig::avr());
        let mut sonar = Sonar::new(
            SimPlatform::new(Pin(2), Pin(3), &[Echo::pulse(100, 1_000)]),
            config,
        )
        .unwrap();

        assert_eq!(sonar.ping(0), 995);
    }

    #[test]
    fn test_trigger_pulse_shape() {
        let mut sonar = sonar(&[Echo::pulse(100, 500)]);
        sonar.ping(0);

        let writes: std::vec::Vec<_> = sonar
            .platform()
            .log
            .iter()
            .filter_map(|e| match e {
                SimEvent::Write(pin, level, at) => Some((*pin, *level, *at)),
                _ => None,
            })
            .collect();

        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].1, Level::Low);
        assert_eq!(writes[1].1, Level::High);
        assert_eq!(writes[2].1, Level::Low);
        // 4us settle, 10us pulse
        assert_eq!(writes[1].2 - writes[0].2, 4);
        assert_eq!(writes[2].2 - writes[1].2, 10);
        assert!(writes.iter().all(|w| w.0 == Pin(2)));
    }

    #[test]
    fn test_ping_length_converts() {
        let mut sonar = sonar(&[Echo::pulse(100, 5_700)]);
        assert_eq!(sonar.ping_length(0), 100);

        assert_eq!(sonar.convert_length(0), 0);
        assert_eq!(sonar.convert_length(5_756), 100);
    }

    #[test]
    fn test_ping_length_inches_rounded() {
        let config = SensorConfig::new(2, 3)
            .with_timing(exact_timing())
            .with_unit(LengthUnit::Inches)
            .with_rounding(Rounding::Nearest);
        let mut sonar = Sonar::new(
            SimPlatform::new(Pin(2), Pin(3), &[Echo::pulse(100, 1_400)]),
            config,
        )
        .unwrap();

        // 1400 / 146 = 9.6
        assert_eq!(sonar.ping_length(0), 10);
        assert_eq!(sonar.convert_length(20), 1);
    }

    #[test]
    fn test_echo_beyond_max_distance_is_no_echo() {
        let mut sonar = sonar(&[Echo::pulse(100, 11_500)]);
        sonar.set_max_distance(200);

        assert_eq!(sonar.ping(0), NO_ECHO);
        assert_eq!(sonar.last_error(), Some(PingError::EchoTimeout));
    }

    #[test]
    fn test_ping_override_sets_max_distance() {
        let mut sonar = sonar(&[Echo::pulse(100, 3_000)]);

        // 3000us is about 52cm, beyond a 50cm override
        assert_eq!(sonar.ping(50), NO_ECHO);
        assert_eq!(sonar.max_distance(), 50);
    }

    #[test]
    fn test_ping_recovers_after_long_echo() {
        let mut sonar = sonar(&[Echo::pulse(100, 40_000), Echo::pulse(100, 1_000)]);

        assert_eq!(sonar.try_ping(0), Err(PingError::EchoTimeout));
        // Echo line still held by the first ping
        assert_eq!(sonar.try_ping(0), Err(PingError::PulseBusy));

        sonar.platform_mut().delay_ms(20);
        sonar.platform_mut().push_echo(Echo::pulse(100, 1_000));
        assert_eq!(sonar.try_ping(0), Ok(1_000));
    }

    #[test]
    fn test_pulse_busy() {
        let mut sonar = sonar(&[Echo::pulse(100, 1_000)]);
        sonar.platform_mut().hold_echo_active(1_000_000);

        assert_eq!(sonar.try_ping(0), Err(PingError::PulseBusy));
        assert_eq!(sonar.ping(0), NO_ECHO);
        assert_eq!(sonar.last_error(), Some(PingError::PulseBusy));
    }

    #[test]
    fn test_echo_never_started() {
        let mut sonar = sonar(&[Echo::Silent]);
        let start = sonar.platform().now();

        assert_eq!(sonar.try_ping(0), Err(PingError::EchoNeverStarted));
        // Waited for the full window plus the sensor start delay
        let waited = sonar.platform().now() - start;
        assert!(waited >= (501 * 57 + 5_800) as u64);
    }

    #[test]
    fn test_one_pin_mode_switches_around_pulse() {
        let config = SensorConfig::one_pin(5).with_timing(exact_timing());
        let mut sonar = Sonar::new(
            SimPlatform::new(Pin(5), Pin(5), &[Echo::pulse(100, 800)]),
            config,
        )
        .unwrap();
        sonar.platform_mut().log.clear();

        assert_eq!(sonar.ping(0), 800);

        let log = &sonar.platform().log;
        let output_at = log
            .iter()
            .position(|e| *e == SimEvent::Mode(Pin(5), PinMode::Output))
            .unwrap();
        let high_at = log
            .iter()
            .position(|e| matches!(e, SimEvent::Write(_, Level::High, _)))
            .unwrap();
        let last_write = log
            .iter()
            .rposition(|e| matches!(e, SimEvent::Write(..)))
            .unwrap();
        let input_at = log
            .iter()
            .position(|e| *e == SimEvent::Mode(Pin(5), PinMode::Input))
            .unwrap();
        let first_read = log
            .iter()
            .position(|e| matches!(e, SimEvent::Read(_)))
            .unwrap();

        assert!(output_at < high_at);
        assert!(last_write < input_at);
        assert!(input_at < first_read);
    }

    #[test]
    fn test_urm37_active_low_echo() {
        let config = SensorConfig::new(2, 3)
            .with_timing(exact_timing())
            .with_model(SensorModel::Urm37);
        let mut platform = SimPlatform::new(Pin(2), Pin(3), &[Echo::pulse(100, 5_000)]);
        platform.active_high = false;
        let mut sonar = Sonar::new(platform, config).unwrap();

        assert_eq!(sonar.ping(0), 5_000);
        // 50us per cm
        assert_eq!(sonar.ping_length(0), NO_ECHO);
        assert_eq!(sonar.convert_length(5_000), 100);
    }

    #[test]
    fn test_median_discards_out_of_range() {
        let mut sonar = sonar(&[
            Echo::pulse(100, 100),
            Echo::Silent,
            Echo::pulse(100, 100),
            Echo::pulse(100, 100),
            Echo::pulse(100, 100),
        ]);

        assert_eq!(sonar.ping_median(5, 0), 100);
        assert_eq!(sonar.platform().triggers.len(), 5);
        assert_eq!(sonar.last_error(), None);
    }

    #[test]
    fn test_median_of_spread_samples() {
        let mut sonar = sonar(&[
            Echo::pulse(100, 300),
            Echo::pulse(100, 500),
            Echo::pulse(100, 100),
            Echo::pulse(100, 400),
            Echo::pulse(100, 200),
        ]);

        assert_eq!(sonar.ping_median(5, 0), 300);
    }

    #[test]
    fn test_median_spaces_pings() {
        let mut sonar = sonar(&[Echo::pulse(100, 200); 3]);
        sonar.ping_median(3, 0);

        let triggers = &sonar.platform().triggers;
        assert_eq!(triggers.len(), 3);
        for pair in triggers.windows(2) {
            assert!(pair[1] - pair[0] >= 28_000);
        }
    }

    #[test]
    fn test_median_all_out_of_range() {
        let mut sonar = sonar(&[Echo::Silent; 3]);

        assert_eq!(sonar.try_ping_median(3, 0), Err(PingError::NoValidSamples));
        assert_eq!(sonar.last_error(), Some(PingError::NoValidSamples));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_echo_past_window_is_no_echo(max_distance in 1u16..=500, excess in 2u32..500) {
            let mut sonar = sonar(&[]);
            sonar.set_max_distance(max_distance);
            let limit = sonar.max_echo_time_us();

            sonar.platform_mut().push_echo(Echo::pulse(100, limit + excess));
            prop_assert_eq!(sonar.ping(0), NO_ECHO);

            // Comfortably inside the window still measures
            sonar.platform_mut().delay_ms(30);
            sonar.platform_mut().push_echo(Echo::pulse(100, limit / 2));
            prop_assert_eq!(sonar.ping(0), limit / 2);
        }
    }
}
