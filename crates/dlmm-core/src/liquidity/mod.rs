//! # Liquidity Distributions

pub mod distribution;

pub use distribution::{build_default, build_single_bin, build_spot, to_absolute, validate};
