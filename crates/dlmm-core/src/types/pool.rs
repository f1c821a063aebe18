//! # Pool Types
//!
//! Pool-level data handed to the core by external collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_SYMBOL;

/// Live pool state read from the chain oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub pool_address: String,
    pub active_bin_id: i32,
    pub bin_step: u16,
    #[serde(default)]
    pub reserve_x: Decimal,
    #[serde(default)]
    pub reserve_y: Decimal,
    #[serde(default)]
    pub decimals_x: u8,
    #[serde(default)]
    pub decimals_y: u8,
}

/// Pool metadata normalized by the adapter.
///
/// Pool state the source did not report stays `None` rather than taking a
/// default, so nothing downstream mistakes it for chain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetadata {
    pub pool_address: String,
    pub symbol_x: String,
    pub symbol_y: String,
    pub mint_x: String,
    pub mint_y: String,
    pub decimals_x: u8,
    pub decimals_y: u8,
    /// Current trading bin; `None` when the source did not report one
    pub active_bin_id: Option<i32>,
    /// `None` when the source did not report one
    pub bin_step: Option<u16>,
    /// USD price of one token X
    pub price_x_usd: Decimal,
    /// USD price of one token Y
    pub price_y_usd: Decimal,
    /// Pool-reported yield, when the source publishes one
    pub apy: Option<f64>,
}

impl PoolMetadata {
    /// Placeholder for a pool whose metadata could not be resolved
    pub fn unknown(pool_address: &str) -> Self {
        Self {
            pool_address: pool_address.to_string(),
            symbol_x: UNKNOWN_SYMBOL.to_string(),
            symbol_y: UNKNOWN_SYMBOL.to_string(),
            mint_x: String::new(),
            mint_y: String::new(),
            decimals_x: 0,
            decimals_y: 0,
            active_bin_id: None,
            bin_step: None,
            price_x_usd: Decimal::ZERO,
            price_y_usd: Decimal::ZERO,
            apy: None,
        }
    }

    /// Pair label such as `SOL/USDC`
    pub fn pair_name(&self) -> String {
        format!("{}/{}", self.symbol_x, self.symbol_y)
    }
}
