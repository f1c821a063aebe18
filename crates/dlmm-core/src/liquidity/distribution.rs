//! # Liquidity Distribution
//!
//! Builds and validates the per-bin weights submitted when a position is
//! opened or topped up. Weights are basis points of the whole deposit, X and
//! Y combined, and always sum to exactly 10000.
//!
//! Bins left of the active bin hold only token X, bins to the right only
//! token Y, and the active bin may hold both.

use std::collections::HashSet;

use crate::constants::{ACTIVE_BIN_SPLIT_DIVISOR, DISTRIBUTION_TOTAL_BPS, MAX_DISTRIBUTION_BINS};
use crate::errors::{CoreResult, DlmmError};
use crate::types::{AbsoluteDistributionEntry, LiquidityDistributionEntry};

/// Triangular distribution peaking at the active bin.
///
/// The weight of offset `i` is `max(1, total_bins - |i|)`. Every bin except
/// the active one is floored to whole basis points; the active bin absorbs
/// the rounding remainder and is split evenly between X and Y.
pub fn build_default(
    bins_left: i32,
    bins_right: i32,
) -> CoreResult<Vec<LiquidityDistributionEntry>> {
    check_range(bins_left, bins_right)?;
    let total_bins = bins_left as u64 + bins_right as u64 + 1;
    Ok(build_weighted(bins_left, bins_right, |offset| {
        total_bins.saturating_sub(offset.unsigned_abs() as u64).max(1)
    }))
}

/// Uniform distribution over the range, with the same rounding rules as
/// [`build_default`].
pub fn build_spot(bins_left: i32, bins_right: i32) -> CoreResult<Vec<LiquidityDistributionEntry>> {
    check_range(bins_left, bins_right)?;
    Ok(build_weighted(bins_left, bins_right, |_| 1))
}

/// Whole deposit in the active bin, split evenly
pub fn build_single_bin() -> Vec<LiquidityDistributionEntry> {
    let x = DISTRIBUTION_TOTAL_BPS / ACTIVE_BIN_SPLIT_DIVISOR;
    vec![LiquidityDistributionEntry::new(0, x, DISTRIBUTION_TOTAL_BPS - x)]
}

/// Check a distribution before submission.
///
/// Collects every violation rather than stopping at the first, so the caller
/// can show all of them at once.
pub fn validate(entries: &[LiquidityDistributionEntry]) -> CoreResult<()> {
    let mut violations = Vec::new();
    let mut seen = HashSet::with_capacity(entries.len());
    let mut total: u64 = 0;

    if entries.is_empty() {
        violations.push("distribution has no entries".to_string());
    }

    for entry in entries {
        if entry.relative_bin_id < 0 && entry.distribution_y != 0 {
            violations.push(format!(
                "bin {} is left of the active bin but has distributionY = {}",
                entry.relative_bin_id, entry.distribution_y
            ));
        }
        if entry.relative_bin_id > 0 && entry.distribution_x != 0 {
            violations.push(format!(
                "bin {} is right of the active bin but has distributionX = {}",
                entry.relative_bin_id, entry.distribution_x
            ));
        }
        if !seen.insert(entry.relative_bin_id) {
            violations.push(format!("bin {} appears more than once", entry.relative_bin_id));
        }
        total += entry.distribution_x as u64 + entry.distribution_y as u64;
    }

    if total != DISTRIBUTION_TOTAL_BPS as u64 {
        violations.push(format!(
            "distribution totals {} bps, expected {}",
            total, DISTRIBUTION_TOTAL_BPS
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DlmmError::validation(violations))
    }
}

/// Map relative entries onto absolute bin ids around `active_bin_id`
pub fn to_absolute(
    entries: &[LiquidityDistributionEntry],
    active_bin_id: i32,
) -> CoreResult<Vec<AbsoluteDistributionEntry>> {
    entries
        .iter()
        .map(|entry| -> CoreResult<AbsoluteDistributionEntry> {
            let bin_id = active_bin_id
                .checked_add(entry.relative_bin_id)
                .ok_or(DlmmError::InvalidRange)?;
            Ok(AbsoluteDistributionEntry {
                bin_id,
                distribution_x: entry.distribution_x,
                distribution_y: entry.distribution_y,
            })
        })
        .collect()
}

fn check_range(bins_left: i32, bins_right: i32) -> CoreResult<()> {
    if bins_left < 0 || bins_right < 0 {
        return Err(DlmmError::InvalidRange);
    }
    // A lone active bin has to be asked for through build_single_bin
    if bins_left == 0 && bins_right == 0 {
        return Err(DlmmError::InvalidRange);
    }
    if bins_left as u64 + bins_right as u64 + 1 > MAX_DISTRIBUTION_BINS {
        return Err(DlmmError::InvalidRange);
    }
    Ok(())
}

fn build_weighted<F>(bins_left: i32, bins_right: i32, weight: F) -> Vec<LiquidityDistributionEntry>
where
    F: Fn(i32) -> u64,
{
    let weights: Vec<(i32, u64)> = (-bins_left..=bins_right).map(|i| (i, weight(i))).collect();
    let total_weight: u128 = weights.iter().map(|(_, w)| *w as u128).sum();

    let mut allocated: u32 = 0;
    let mut entries: Vec<LiquidityDistributionEntry> = weights
        .iter()
        .map(|&(offset, w)| {
            if offset == 0 {
                return LiquidityDistributionEntry::new(0, 0, 0);
            }
            let bps = (w as u128 * DISTRIBUTION_TOTAL_BPS as u128 / total_weight) as u32;
            allocated += bps;
            if offset < 0 {
                LiquidityDistributionEntry::new(offset, bps, 0)
            } else {
                LiquidityDistributionEntry::new(offset, 0, bps)
            }
        })
        .collect();

    // Active bin last so the total is exact
    let center = DISTRIBUTION_TOTAL_BPS - allocated;
    let center_x = center / ACTIVE_BIN_SPLIT_DIVISOR;
    entries[bins_left as usize] = LiquidityDistributionEntry::new(0, center_x, center - center_x);

    entries
}
