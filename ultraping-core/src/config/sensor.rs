//! Sensor configuration
//!
//! Pin roles, distance ceiling and the options that change how echo time
//! maps to length.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::timing::{MultiEchoTuning, TimingConfig};
use crate::error::ConfigError;

/// Default maximum sensor distance in length units
///
/// HC-SR04 class sensors top out around 500cm; there is no reason to wait
/// for an echo longer than sound takes to travel this far and back.
pub const DEFAULT_MAX_SENSOR_DISTANCE: u16 = 500;

/// Length unit for distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LengthUnit {
    #[default]
    Centimeters,
    Inches,
}

/// Sensor family
///
/// Selects the round-trip constant and the echo line polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorModel {
    /// HC-SR04, SRF05, SRF06, DYP-ME007, Parallax PING)))
    #[default]
    Standard,
    /// URM37 in PWM mode (echo line pulls low, 50us per cm)
    Urm37,
}

impl SensorModel {
    /// Microseconds of round-trip flight per length unit
    pub const fn us_per_unit(self, unit: LengthUnit) -> u32 {
        match (self, unit) {
            (SensorModel::Standard, LengthUnit::Centimeters) => 57,
            (SensorModel::Standard, LengthUnit::Inches) => 146,
            (SensorModel::Urm37, LengthUnit::Centimeters) => 50,
            // 50us x 2.54
            (SensorModel::Urm37, LengthUnit::Inches) => 127,
        }
    }

    /// Level of the echo line while an echo pulse is in progress
    pub const fn echo_active_high(self) -> bool {
        matches!(self, SensorModel::Standard)
    }
}

/// Conversion rounding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rounding {
    /// Integer division, fractions dropped
    #[default]
    Truncate,
    /// Nearest whole unit, never rounding a real echo down to 0
    Nearest,
}

/// Sensor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// Pin wired to the sensor trigger input
    pub trigger_pin: u8,
    /// Pin wired to the sensor echo output (same as trigger for one-pin)
    pub echo_pin: u8,
    /// Distance ceiling for pings, in length units
    pub max_distance: u16,
    /// Hard upper bound for `max_distance`
    pub max_sensor_distance: u16,
    /// Length unit used for distances
    pub unit: LengthUnit,
    /// Sensor family
    pub model: SensorModel,
    /// Conversion rounding mode
    pub rounding: Rounding,
    /// Allow trigger and echo to share one pin
    pub one_pin_enabled: bool,
    /// Timing constants and platform overheads
    pub timing: TimingConfig,
    /// Multi-echo disambiguation parameters
    pub tuning: MultiEchoTuning,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl SensorConfig {
    /// Create a config for the given pins with default options
    pub const fn new(trigger_pin: u8, echo_pin: u8) -> Self {
        Self {
            trigger_pin,
            echo_pin,
            max_distance: DEFAULT_MAX_SENSOR_DISTANCE,
            max_sensor_distance: DEFAULT_MAX_SENSOR_DISTANCE,
            unit: LengthUnit::Centimeters,
            model: SensorModel::Standard,
            rounding: Rounding::Truncate,
            one_pin_enabled: true,
            timing: TimingConfig::avr(),
            tuning: MultiEchoTuning::new(),
        }
    }

    /// Create a one-pin config (trigger and echo share `pin`)
    pub const fn one_pin(pin: u8) -> Self {
        Self::new(pin, pin)
    }

    /// Set the maximum distance
    pub const fn with_max_distance(mut self, max_distance: u16) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the length unit
    pub const fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the sensor model
    pub const fn with_model(mut self, model: SensorModel) -> Self {
        self.model = model;
        self
    }

    /// Set the rounding mode
    pub const fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Set the timing constants
    pub const fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set the multi-echo parameters
    pub const fn with_tuning(mut self, tuning: MultiEchoTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Microseconds of round-trip flight per length unit
    pub const fn us_per_unit(&self) -> u32 {
        self.model.us_per_unit(self.unit)
    }

    /// Check if trigger and echo share a pin
    pub const fn is_one_pin(&self) -> bool {
        self.trigger_pin == self.echo_pin
    }

    /// Check the config for combinations the driver cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_one_pin() && !self.one_pin_enabled {
            return Err(ConfigError::SharedPinWithoutOnePin);
        }
        if self.tuning.shorter_echo_ratio.den == 0 || self.tuning.retry_step.den == 0 {
            return Err(ConfigError::ZeroDenominator);
        }
        Ok(())
    }
}
