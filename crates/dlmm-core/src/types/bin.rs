//! # Bin Types
//!
//! Price bins and the raw reserve records they are built from.

use serde::{Deserialize, Serialize};

/// A single price bin as shown to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    /// Absolute bin id
    pub bin_id: i32,
    /// Price of X in Y at this bin
    pub price: f64,
    /// Reserve of token X
    pub reserve_x: f64,
    /// Reserve of token Y
    pub reserve_y: f64,
    /// Display liquidity in quote units, `reserve_x * price + reserve_y`
    pub total_liquidity: f64,
    /// Whether this is the current trading bin
    pub is_active: bool,
    /// Set only on generated bins; authoritative bins never carry it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_synthetic: bool,
}

impl Bin {
    /// Create an authoritative bin
    pub fn new(bin_id: i32, price: f64, reserve_x: f64, reserve_y: f64, is_active: bool) -> Self {
        Self {
            bin_id,
            price,
            reserve_x,
            reserve_y,
            total_liquidity: reserve_x * price + reserve_y,
            is_active,
            is_synthetic: false,
        }
    }

    /// Mark this bin as generated rather than read from chain
    pub fn into_synthetic(mut self) -> Self {
        self.is_synthetic = true;
        self
    }
}

/// Reserves of one bin as reported by the chain oracle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBinReserve {
    pub bin_id: i32,
    #[serde(default)]
    pub reserve_x: f64,
    #[serde(default)]
    pub reserve_y: f64,
}
