//! # Bin Math
//!
//! Conversions between bin ids and prices. Every pool shares the same anchor,
//! [`CENTER_BIN_ID`], where price equals the reference price; each step away
//! multiplies the price by `1 + bin_step / 10000`.
//!
//! Prices are computed in the log domain so offsets of several hundred
//! thousand bins stay accurate. When the linear price would leave the `f64`
//! range the `ln_*` functions remain usable.

use crate::constants::{BASIS_POINT_MAX, CENTER_BIN_ID, DEFAULT_REFERENCE_PRICE, MAX_BIN_STEP};
use crate::errors::{CoreResult, DlmmError};

/// Natural log of the price ratio between adjacent bins
pub fn ln_bin_step_ratio(bin_step: u16) -> CoreResult<f64> {
    validate_bin_step(bin_step)?;
    Ok((bin_step as f64 / BASIS_POINT_MAX as f64).ln_1p())
}

/// Price ratio between adjacent bins (`1 + bin_step / 10000`)
pub fn bin_step_ratio(bin_step: u16) -> CoreResult<f64> {
    validate_bin_step(bin_step)?;
    Ok(1.0 + bin_step as f64 / BASIS_POINT_MAX as f64)
}

/// Natural log of the price of a bin relative to the reference price
pub fn ln_price_for_bin(bin_id: i32, bin_step: u16) -> CoreResult<f64> {
    let ln_ratio = ln_bin_step_ratio(bin_step)?;
    let offset = bin_id as i64 - CENTER_BIN_ID as i64;
    Ok(offset as f64 * ln_ratio)
}

/// Bin whose log price is nearest to `ln_price`
pub fn bin_for_ln_price(ln_price: f64, bin_step: u16) -> CoreResult<i32> {
    if !ln_price.is_finite() {
        return Err(DlmmError::InvalidPrice);
    }
    let ln_ratio = ln_bin_step_ratio(bin_step)?;
    let offset = (ln_price / ln_ratio).round();
    let bin_id = offset + CENTER_BIN_ID as f64;

    if bin_id < i32::MIN as f64 || bin_id > i32::MAX as f64 {
        return Err(DlmmError::PriceOutOfRange);
    }
    Ok(bin_id as i32)
}

/// Price of a bin with a reference price of 1
pub fn price_for_bin(bin_id: i32, bin_step: u16) -> CoreResult<f64> {
    price_for_bin_with_reference(bin_id, bin_step, DEFAULT_REFERENCE_PRICE)
}

/// Price of a bin: `reference * (1 + bin_step/10000)^(bin_id - CENTER_BIN_ID)`
pub fn price_for_bin_with_reference(
    bin_id: i32,
    bin_step: u16,
    reference_price: f64,
) -> CoreResult<f64> {
    validate_price(reference_price)?;
    let ln_price = ln_price_for_bin(bin_id, bin_step)? + reference_price.ln();
    let price = ln_price.exp();

    // Subnormal prices lose the precision needed to map back to the same bin
    if !price.is_normal() {
        return Err(DlmmError::PriceOutOfRange);
    }
    Ok(price)
}

/// Bin nearest to `price` with a reference price of 1
pub fn bin_for_price(price: f64, bin_step: u16) -> CoreResult<i32> {
    bin_for_price_with_reference(price, bin_step, DEFAULT_REFERENCE_PRICE)
}

/// Inverse of [`price_for_bin_with_reference`], rounded to the nearest bin
pub fn bin_for_price_with_reference(
    price: f64,
    bin_step: u16,
    reference_price: f64,
) -> CoreResult<i32> {
    validate_bin_step(bin_step)?;
    validate_price(price)?;
    validate_price(reference_price)?;
    bin_for_ln_price(price.ln() - reference_price.ln(), bin_step)
}

/// Adjust a raw bin price (base units of Y per base unit of X) to a
/// human-readable price using token decimals.
pub fn price_to_display(price: f64, decimals_x: u8, decimals_y: u8) -> f64 {
    price * 10f64.powi(decimals_x as i32 - decimals_y as i32)
}

/// Inverse of [`price_to_display`]
pub fn price_from_display(display_price: f64, decimals_x: u8, decimals_y: u8) -> f64 {
    display_price / 10f64.powi(decimals_x as i32 - decimals_y as i32)
}

/// Check that a bin step is usable
pub fn validate_bin_step(bin_step: u16) -> CoreResult<()> {
    if bin_step == 0 || bin_step > MAX_BIN_STEP {
        return Err(DlmmError::InvalidBinStep);
    }
    Ok(())
}

fn validate_price(price: f64) -> CoreResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DlmmError::InvalidPrice);
    }
    Ok(())
}
