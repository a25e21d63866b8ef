//! General-purpose timer helpers
//!
//! Thin wrappers over [`PeriodicTimer`] for application code that wants a
//! periodic callback without owning a sensor. Millisecond periods are
//! built from a 1ms tick and a [`MsCountdown`], which keeps the hardware
//! timer at a fixed rate whatever the requested period.

use ultraping_hal::PeriodicTimer;

/// Tick interval used by [`timer_ms`] (us)
pub const MS_TICK_US: u32 = 1000;

/// Call `callback` every `interval_us` microseconds
pub fn timer_us<T: PeriodicTimer>(timer: &mut T, interval_us: u32, callback: fn()) {
    timer.schedule_periodic(interval_us, callback);
}

/// Call `tick` every millisecond
///
/// `tick` should feed a [`MsCountdown`] that runs the user callback every
/// N ticks. The callback is a plain `fn()`, so the countdown lives in a
/// static:
///
/// ```ignore
/// static BLINK: Mutex<RefCell<MsCountdown>> = Mutex::new(RefCell::new(MsCountdown::new(250)));
///
/// fn tick() {
///     critical_section::with(|cs| {
///         BLINK.borrow_ref_mut(cs).tick_with(toggle_led);
///     });
/// }
///
/// timer_ms(&mut timer, tick); // toggle_led every 250ms
/// ```
pub fn timer_ms<T: PeriodicTimer>(timer: &mut T, tick: fn()) {
    timer.schedule_periodic(MS_TICK_US, tick);
}

/// Stop a timer started by [`timer_us`] or [`timer_ms`]
pub fn timer_stop<T: PeriodicTimer>(timer: &mut T) {
    timer.cancel_periodic();
}

/// Divides a 1ms tick down to a period of N milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MsCountdown {
    period_ms: u32,
    remaining: u32,
}

impl MsCountdown {
    /// Create a countdown that fires every `period_ms` ticks (at least 1)
    pub const fn new(period_ms: u32) -> Self {
        let period_ms = if period_ms == 0 { 1 } else { period_ms };
        Self {
            period_ms,
            remaining: period_ms,
        }
    }

    /// Period in ticks
    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Count one tick, returning `true` when the period has elapsed
    pub fn tick(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.period_ms;
            true
        } else {
            false
        }
    }

    /// Count one tick and run `f` when the period has elapsed
    pub fn tick_with<F: FnOnce()>(&mut self, f: F) -> bool {
        let fired = self.tick();
        if fired {
            f();
        }
        fired
    }

    /// Restart the current period
    pub fn reset(&mut self) {
        self.remaining = self.period_ms;
    }
}
