//! # Bin Series
//!
//! Authoritative and synthetic bin series for display.

pub mod generator;

pub use generator::*;
