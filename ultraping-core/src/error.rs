//! Error types
//!
//! The sentinel-returning ranging calls collapse all of these onto
//! `NO_ECHO` (0). The `try_` variants keep them apart.

/// Reasons a ranging operation produced no measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PingError {
    /// Echo line still active from a previous ping when triggering
    PulseBusy,
    /// Sensor never started its echo pulse (unresponsive, or start delay exceeded)
    EchoNeverStarted,
    /// Echo did not return within the max-distance window
    EchoTimeout,
    /// Multi-echo run completed without a qualifying hit
    NoHitsFound,
    /// Every ping of a median run was out of range
    NoValidSamples,
    /// A timer ping is already in flight on this sensor
    TimerBusy,
}

impl PingError {
    /// Check if the error came from triggering the sensor
    ///
    /// Trigger failures usually mean wiring or sensor trouble rather than
    /// an empty field of view.
    pub fn is_trigger_failure(&self) -> bool {
        matches!(self, PingError::PulseBusy | PingError::EchoNeverStarted)
    }
}

/// Configuration rejected by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Trigger and echo share a pin but one-pin mode is disabled
    SharedPinWithoutOnePin,
    /// A multi-echo ratio has a zero denominator
    ZeroDenominator,
}
