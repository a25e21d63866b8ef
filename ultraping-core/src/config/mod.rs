//! Configuration types
//!
//! Runtime replacements for the compile-time switches of classic ping
//! libraries: length unit, sensor model, rounding, one-pin wiring, and the
//! per-platform timing corrections.

pub mod sensor;
pub mod timing;

pub use sensor::*;
pub use timing::*;
