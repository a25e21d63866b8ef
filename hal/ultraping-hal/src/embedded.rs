//! `embedded-hal` 1.0 adapter
//!
//! Wraps a typed trigger output, a typed echo input, a delay provider and
//! a microsecond clock into a [`Platform`](crate::Platform). Typed HAL pins
//! fix their direction at compile time, so this adapter only supports the
//! two-pin wiring and ignores pin mode changes.
//!
//! Pin errors are restricted to [`Infallible`], which is what GPIO on most
//! microcontroller HALs reports.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::gpio::{DigitalIo, Level, Pin, PinMode};
use crate::time::{Clock, Delay};

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Platform built from `embedded-hal` pins and delays
///
/// `trigger_pin` and `echo_pin` are the numbers the driver is configured
/// with; reads of any other pin return low and writes to it are ignored.
pub struct EmbeddedHalPlatform<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    trigger_pin: Pin,
    echo_pin: Pin,
}

impl<T, E, D, C> EmbeddedHalPlatform<T, E, D, C>
where
    T: OutputPin<Error = Infallible>,
    E: InputPin<Error = Infallible>,
    D: DelayNs,
    C: FnMut() -> u64,
{
    /// Create a new adapter
    ///
    /// # Arguments
    /// - `trigger`, `trigger_pin`: Output pin wired to the sensor trigger
    /// - `echo`, `echo_pin`: Input pin wired to the sensor echo
    /// - `delay`: Delay provider with microsecond resolution
    /// - `clock`: Returns a free-running microsecond timestamp
    pub fn new(trigger: T, trigger_pin: Pin, echo: E, echo_pin: Pin, delay: D, clock: C) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            trigger_pin,
            echo_pin,
        }
    }

    /// Release the wrapped peripherals
    pub fn release(self) -> (T, E, D, C) {
        (self.trigger, self.echo, self.delay, self.clock)
    }
}

impl<T, E, D, C> DigitalIo for EmbeddedHalPlatform<T, E, D, C>
where
    T: OutputPin<Error = Infallible>,
    E: InputPin<Error = Infallible>,
{
    fn read_digital_input(&mut self, pin: Pin) -> bool {
        if pin == self.echo_pin {
            infallible(self.echo.is_high())
        } else {
            false
        }
    }

    fn write_digital_output(&mut self, pin: Pin, level: Level) {
        if pin != self.trigger_pin {
            return;
        }
        match level {
            Level::High => infallible(self.trigger.set_high()),
            Level::Low => infallible(self.trigger.set_low()),
        }
    }

    fn set_pin_mode(&mut self, _pin: Pin, _mode: PinMode) {
        // Direction is fixed by the HAL pin types
    }
}

impl<T, E, D, C> Clock for EmbeddedHalPlatform<T, E, D, C>
where
    C: FnMut() -> u64,
{
    fn now_micros(&mut self) -> u64 {
        (self.clock)()
    }
}

impl<T, E, D, C> Delay for EmbeddedHalPlatform<T, E, D, C>
where
    D: DelayNs,
{
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
