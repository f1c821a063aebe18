//! # Position Types
//!
//! Raw position records as normalized by the adapter, and the typed position,
//! pool group and portfolio views derived from them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Liquidity a position holds in one bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBinLiquidity {
    pub bin_id: i32,
    #[serde(default)]
    pub amount_x: Decimal,
    #[serde(default)]
    pub amount_y: Decimal,
}

/// Position record after field coercion. Absent fields are zero, never missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPositionRecord {
    pub position_id: String,
    pub pool_address: String,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    pub token_x_amount: Decimal,
    pub token_y_amount: Decimal,
    pub fees_earned_x: Decimal,
    pub fees_earned_y: Decimal,
    /// Unix seconds at which the position was opened
    pub opened_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bin_liquidity: Vec<PositionBinLiquidity>,
}

/// A wallet's liquidity position in one pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_id: String,
    pub pool_address: String,
    pub symbol_x: String,
    pub symbol_y: String,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    pub token_x_amount: Decimal,
    pub token_y_amount: Decimal,
    pub fees_earned_x: Decimal,
    pub fees_earned_y: Decimal,
    /// USD value of the deposited tokens
    pub total_value: Decimal,
    /// USD value of unclaimed fees
    pub fees_earned_usd: Decimal,
    pub is_in_range: bool,
    /// Share of the position in the active bin; zero when out of range
    pub utilization_rate: f64,
    pub apy: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bin_liquidity: Vec<PositionBinLiquidity>,
}

impl Position {
    /// Number of bins the position spans
    pub fn width(&self) -> i64 {
        self.upper_bin_id as i64 - self.lower_bin_id as i64 + 1
    }

    /// Whether `bin_id` lies inside the position's range
    pub fn contains_bin(&self, bin_id: i32) -> bool {
        bin_id >= self.lower_bin_id && bin_id <= self.upper_bin_id
    }
}

/// All of one wallet's positions in a single pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPositionGroup {
    pub pool_address: String,
    pub symbol_x: String,
    pub symbol_y: String,
    pub positions: Vec<Position>,
    pub combined_value: Decimal,
    pub combined_fees: Decimal,
    pub in_range_count: usize,
}

/// Portfolio-wide totals for one wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_positions: usize,
    pub active_pools: usize,
    pub total_value_usd: Decimal,
    pub total_fees_earned_usd: Decimal,
    pub in_range_positions: usize,
    pub out_of_range_positions: usize,
    /// `None` when no position reports a yield
    pub average_apy: Option<f64>,
}

/// Positions, pool groups and summary from one refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub positions: Vec<Position>,
    pub groups: Vec<PoolPositionGroup>,
    pub summary: PortfolioSummary,
}
