//! Ultrasonic ranging driver
//!
//! This crate drives HC-SR04 family sensors through the platform traits
//! of `ultraping-hal`:
//!
//! - Blocking pings (single, median-filtered, multi-echo, threshold)
//! - Timer-driven pings polled from a periodic interrupt
//! - General-purpose microsecond/millisecond timer helpers
//!
//! # Blocking calls
//!
//! The blocking operations spin on the calling core for the whole ping
//! (up to ~35ms, or N times that for median and multi-echo runs).
//! Microsecond accuracy depends on that spin, so call them from the main
//! loop or a dedicated thread, never from a context that must stay
//! responsive.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod sonar;
pub mod timer;

#[cfg(test)]
pub(crate) mod sim;

pub use sonar::Sonar;
pub use ultraping_core::{EchoTime, PingError, SensorConfig, NO_ECHO};
