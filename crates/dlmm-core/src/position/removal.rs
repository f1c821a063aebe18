//! # Range Removal Planning
//!
//! Plans a partial withdrawal over a bin range chosen by the user: which of
//! the wallet's positions the range touches, the slice of each position
//! inside it, and how much of each token that slice is expected to return.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CoreResult, DlmmError};
use crate::types::Position;

/// Inclusive bin range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinRange {
    pub start: i32,
    pub end: i32,
}

impl BinRange {
    pub fn new(start: i32, end: i32) -> CoreResult<Self> {
        if start > end {
            return Err(DlmmError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Number of bins in the range
    pub fn width(&self) -> i64 {
        self.end as i64 - self.start as i64 + 1
    }

    /// Whether `[lower, upper]` shares at least one bin with this range
    pub fn overlaps(&self, lower: i32, upper: i32) -> bool {
        !(upper < self.start || lower > self.end)
    }
}

/// Which side of the liquidity a removal withdraws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoveType {
    #[default]
    Both,
    XOnly,
    YOnly,
}

impl RemoveType {
    pub fn includes_x(&self) -> bool {
        matches!(self, RemoveType::Both | RemoveType::XOnly)
    }

    pub fn includes_y(&self) -> bool {
        matches!(self, RemoveType::Both | RemoveType::YOnly)
    }
}

/// The slice of one position affected by a removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRemoval {
    pub position: Position,
    pub clipped_start: i32,
    pub clipped_end: i32,
    pub estimated_x: Decimal,
    pub estimated_y: Decimal,
    /// The removal empties the position's whole range on both sides
    pub closes_position: bool,
}

impl PositionRemoval {
    /// Bin ids to withdraw from, in ascending order
    pub fn bin_ids(&self) -> impl Iterator<Item = i32> {
        self.clipped_start..=self.clipped_end
    }
}

/// A removal across every affected position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalPlan {
    pub bin_range: BinRange,
    pub remove_type: RemoveType,
    pub per_position: Vec<PositionRemoval>,
    pub estimated_x: Decimal,
    pub estimated_y: Decimal,
}

/// Positions sharing at least one bin with `bin_range`, in input order
pub fn select_overlapping(positions: &[Position], bin_range: BinRange) -> Vec<&Position> {
    positions
        .iter()
        .filter(|p| bin_range.overlaps(p.lower_bin_id, p.upper_bin_id))
        .collect()
}

/// Intersection of a position's range with `bin_range`.
///
/// Calling this on a pair that does not overlap is a caller bug and fails
/// with `NoOverlap`.
pub fn clip_to_range(position: &Position, bin_range: BinRange) -> CoreResult<(i32, i32)> {
    if !bin_range.overlaps(position.lower_bin_id, position.upper_bin_id) {
        return Err(DlmmError::NoOverlap);
    }
    Ok((
        bin_range.start.max(position.lower_bin_id),
        bin_range.end.min(position.upper_bin_id),
    ))
}

/// Plan a removal of `bin_range` from the given positions.
///
/// Estimates cover only the clipped slice of each position. When a position
/// carries per-bin amounts those bins are summed exactly; otherwise its
/// amounts are pro-rated by the share of its bins inside the slice.
pub fn plan_removal(
    positions: &[Position],
    bin_range: BinRange,
    remove_type: RemoveType,
) -> CoreResult<RemovalPlan> {
    let selected = select_overlapping(positions, bin_range);
    if selected.is_empty() {
        return Err(DlmmError::EmptySelection);
    }

    let mut estimated_x = Decimal::ZERO;
    let mut estimated_y = Decimal::ZERO;
    let mut per_position = Vec::with_capacity(selected.len());

    for position in selected {
        let (clipped_start, clipped_end) = clip_to_range(position, bin_range)?;
        let (amount_x, amount_y) = attributable_amounts(position, clipped_start, clipped_end);

        let removal_x = if remove_type.includes_x() { amount_x } else { Decimal::ZERO };
        let removal_y = if remove_type.includes_y() { amount_y } else { Decimal::ZERO };
        estimated_x = estimated_x.saturating_add(removal_x);
        estimated_y = estimated_y.saturating_add(removal_y);

        let covers_range =
            clipped_start == position.lower_bin_id && clipped_end == position.upper_bin_id;

        debug!(
            "Removing bins [{}, {}] of position {} ({} x, {} y)",
            clipped_start, clipped_end, position.position_id, removal_x, removal_y
        );

        per_position.push(PositionRemoval {
            position: position.clone(),
            clipped_start,
            clipped_end,
            estimated_x: removal_x,
            estimated_y: removal_y,
            closes_position: covers_range && remove_type == RemoveType::Both,
        });
    }

    Ok(RemovalPlan {
        bin_range,
        remove_type,
        per_position,
        estimated_x,
        estimated_y,
    })
}

/// Token amounts held by `position` within `[start, end]`
fn attributable_amounts(position: &Position, start: i32, end: i32) -> (Decimal, Decimal) {
    if !position.bin_liquidity.is_empty() {
        return position
            .bin_liquidity
            .iter()
            .filter(|bin| bin.bin_id >= start && bin.bin_id <= end)
            .fold((Decimal::ZERO, Decimal::ZERO), |(x, y), bin| {
                (x.saturating_add(bin.amount_x), y.saturating_add(bin.amount_y))
            });
    }

    let clipped = Decimal::from(end as i64 - start as i64 + 1);
    let width = Decimal::from(position.width());
    let pro_rate = |amount: Decimal| {
        amount
            .saturating_mul(clipped)
            .checked_div(width)
            .unwrap_or(Decimal::ZERO)
    };
    (pro_rate(position.token_x_amount), pro_rate(position.token_y_amount))
}
