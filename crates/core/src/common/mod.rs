//! Common types shared across the simulator.
//!
//! This module collects the pieces every other subsystem leans on:
//! 1. **Errors:** the parse-time and run-time failure taxonomies.
//! 2. **Randomness:** the deterministic generator behind every
//!    "random-looking" behavior (disk contents, cache-miss fill values,
//!    synthesized inputs, disk busy status).

/// Parse-time and run-time error taxonomies.
pub mod error;
/// Seeded xorshift64 pseudo-random number generator.
pub mod rng;

pub use error::{Fault, ParseError, Region};
pub use rng::XorShift64;
