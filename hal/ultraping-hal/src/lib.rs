//! UltraPing Hardware Abstraction Layer
//!
//! This crate defines the platform traits the ranging driver talks to.
//! Board support code implements them once per chip; the driver stays
//! generic over [`Platform`] and never touches registers itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ultraping-drivers (Sonar)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ultraping-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board support │       │ embedded-hal  │
//! │ (register IO) │       │   adapter     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::DigitalIo`] - Pin reads, writes and mode switching
//! - [`time::Clock`], [`time::Delay`] - Microsecond clock and busy delays
//! - [`timer::PeriodicTimer`] - Periodic timer interrupt
//! - [`Platform`] - Everything a blocking ping needs

#![no_std]
#![deny(unsafe_code)]

pub mod embedded;
pub mod gpio;
pub mod time;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use embedded::EmbeddedHalPlatform;
pub use gpio::{DigitalIo, Level, Pin, PinMode};
pub use time::{Clock, Delay};
pub use timer::PeriodicTimer;

/// Full platform needed by the blocking ranging operations
pub trait Platform: DigitalIo + Clock + Delay {}

// Blanket implementation for types that implement all three traits
impl<T: DigitalIo + Clock + Delay> Platform for T {}
