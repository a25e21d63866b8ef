//! Board-agnostic ranging logic for ultrasonic distance sensors
//!
//! This crate contains everything about a ping that does not touch
//! hardware:
//!
//! - Sensor and timing configuration
//! - Echo time to length conversion
//! - Ping deadlines (the time budget every wait loop is bounded by)
//! - Median filtering window
//! - Multi-echo disambiguation state machine
//! - Error taxonomy
//!
//! The driver in `ultraping-drivers` sequences the pin I/O around these
//! pieces.
//!
//! # Testing
//!
//! Config parsing tests need the `serde` feature:
//!
//! ```text
//! cargo test -p ultraping-core --features serde
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod convert;
pub mod deadline;
pub mod error;
pub mod median;
pub mod multi_echo;

pub use config::{LengthUnit, MultiEchoTuning, Ratio, Rounding, SensorConfig, SensorModel, TimingConfig};
pub use convert::{convert_length, max_echo_time_us};
pub use deadline::PingDeadline;
pub use error::{ConfigError, PingError};
pub use median::{MedianWindow, MAX_MEDIAN_SAMPLES};
pub use multi_echo::{FirstEchoOutcome, MultiEchoSearch, SecondEchoOutcome};

/// Microseconds of round-trip flight time
pub type EchoTime = u32;

/// Value returned when there is no echo within range
pub const NO_ECHO: EchoTime = 0;
