//! Timer-driven ranging
//!
//! [`ping_timer`](Sonar::ping_timer) fires the trigger and arms a
//! periodic interrupt. The interrupt's callback calls
//! [`check_timer`](Sonar::check_timer) on each tick until it reports a
//! result or the window runs out; either way the timer is canceled.
//!
//! ```ignore
//! fn echo_tick() {
//!     // With the sonar and timer in a critical-section mutex
//!     if sonar.check_timer(&mut timer) {
//!         let cm = sonar.convert_length(sonar.ping_result());
//!     }
//! }
//!
//! sonar.ping_timer(&mut timer, echo_tick, 0)?;
//! ```

use ultraping_core::{EchoTime, PingError, NO_ECHO};
use ultraping_hal::{PeriodicTimer, Platform};

use super::Sonar;

impl<P: Platform> Sonar<P> {
    /// Trigger a ping and start polling the echo from `timer`
    ///
    /// # Arguments
    /// - `timer`: Periodic timer the poll runs on
    /// - `callback`: Interrupt handler, expected to call [`check_timer`](Self::check_timer)
    /// - `max_distance`: Distance ceiling override (0 keeps the current one)
    pub fn ping_timer<T: PeriodicTimer>(
        &mut self,
        timer: &mut T,
        callback: fn(),
        max_distance: u16,
    ) -> Result<(), PingError> {
        if self.timer_armed {
            return Err(self.fail(PingError::TimerBusy));
        }

        self.apply_max_distance(max_distance);
        self.ping_result = NO_ECHO;
        self.trigger_pulse()?;

        timer.schedule_periodic(self.config.timing.echo_timer_interval_us, callback);
        self.timer_armed = true;
        Ok(())
    }

    /// Poll a timer ping
    ///
    /// Completes on the falling edge of the echo line, not its rising edge.
    ///
    /// Returns `true` once, when the echo has ended; the echo time is then
    /// available from [`ping_result`](Self::ping_result). Past the
    /// max-distance window the timer is canceled and `false` returned with
    /// [`PingError::EchoTimeout`] as the last error.
    pub fn check_timer<T: PeriodicTimer>(&mut self, timer: &mut T) -> bool {
        if !self.timer_armed {
            return false;
        }

        let now = self.platform.now_micros();
        if self.deadline.is_expired(now) {
            self.timer_stop(timer);
            self.fail(PingError::EchoTimeout);
            return false;
        }

        if self.echo_active() {
            return false;
        }

        self.timer_stop(timer);
        self.ping_result = self
            .deadline
            .echo_time(now, self.config.timing.timer_overhead_us);
        self.last_error = None;
        true
    }

    /// Cancel the periodic poll
    pub fn timer_stop<T: PeriodicTimer>(&mut self, timer: &mut T) {
        timer.cancel_periodic();
        self.timer_armed = false;
    }

    /// Echo time of the last completed timer ping
    pub fn ping_result(&self) -> EchoTime {
        self.ping_result
    }

    /// Check if a timer ping is in flight
    pub fn is_timer_armed(&self) -> bool {
        self.timer_armed
    }
}
