//! # Mathematical Functions
//!
//! Pure functions mapping bins to prices and back.

pub mod bin_math;

// Re-export commonly used functions
pub use bin_math::*;
