//! # DLMM Core - Bin Liquidity and Position Logic
//!
//! Domain logic behind a DLMM pool dashboard, independent of any transport
//! or rendering layer. It provides:
//!
//! - Bin id and price conversions
//! - Liquidity distributions for opening and topping up positions
//! - Position, pool group and portfolio aggregation
//! - Planning of partial removals over a bin range
//! - Bin series for charts, with a flagged synthetic fallback
//!
//! Every operation is synchronous and holds no state between calls. Caches
//! and random sources are owned and passed in by the caller.

pub mod adapter;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod liquidity;
pub mod math;
pub mod position;
pub mod series;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{CoreResult, DlmmError};
pub use types::*;
