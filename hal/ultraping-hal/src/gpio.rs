//! GPIO pin abstractions
//!
//! Pins are addressed by number so that one platform object can serve
//! both the trigger and the echo line, including the one-pin wiring where
//! both roles share a single pin.

/// GPIO pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(pub u8);

impl Pin {
    /// Get the raw pin number
    pub const fn number(self) -> u8 {
        self.0
    }
}

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Check if the level is high (logic 1)
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Direction of a GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    Input,
    Output,
}

/// Digital I/O by pin number
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip. Reads take `&mut self` because port reads often
/// go through a peripheral handle.
pub trait DigitalIo {
    /// Read the input level of a pin (true = high)
    fn read_digital_input(&mut self, pin: Pin) -> bool;

    /// Drive an output pin to the given level
    fn write_digital_output(&mut self, pin: Pin, level: Level);

    /// Switch a pin between input and output
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode);

    /// Drive an output pin high
    fn set_high(&mut self, pin: Pin) {
        self.write_digital_output(pin, Level::High);
    }

    /// Drive an output pin low
    fn set_low(&mut self, pin: Pin) {
        self.write_digital_output(pin, Level::Low);
    }
}
