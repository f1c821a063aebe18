//! # Distribution Types

use serde::{Deserialize, Serialize};

/// Share of a deposit placed in one bin, in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityDistributionEntry {
    /// Offset from the pool's active bin
    pub relative_bin_id: i32,
    /// Basis points of the deposit placed as token X
    pub distribution_x: u32,
    /// Basis points of the deposit placed as token Y
    pub distribution_y: u32,
}

impl LiquidityDistributionEntry {
    pub fn new(relative_bin_id: i32, distribution_x: u32, distribution_y: u32) -> Self {
        Self {
            relative_bin_id,
            distribution_x,
            distribution_y,
        }
    }

    /// Combined X and Y weight
    pub fn total(&self) -> u32 {
        self.distribution_x + self.distribution_y
    }
}

/// A distribution entry mapped onto an absolute bin id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsoluteDistributionEntry {
    pub bin_id: i32,
    pub distribution_x: u32,
    pub distribution_y: u32,
}
