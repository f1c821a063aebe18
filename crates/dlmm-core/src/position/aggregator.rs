//! # Position Aggregation
//!
//! Builds the portfolio view for one wallet: typed positions from normalized
//! records and pool metadata, per-pool groups, and portfolio totals.
//!
//! Incomplete upstream data never removes a position from the view. A
//! position whose pool cannot be resolved is still emitted, with `Unknown`
//! symbols, zero USD value and no in-range status.

use ahash::{AHashMap, AHashSet};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::constants::{MIN_APY_WINDOW_SECS, SECONDS_PER_YEAR};
use crate::position::directory::PoolDirectory;
use crate::types::{
    PoolMetadata, PoolPositionGroup, Portfolio, PortfolioSummary, Position, RawPositionRecord,
};

/// Turns raw records into positions as of a fixed point in time
#[derive(Debug, Clone, Copy)]
pub struct PositionAggregator {
    /// Unix seconds at which yields are evaluated
    as_of: i64,
}

impl PositionAggregator {
    pub fn new(as_of: i64) -> Self {
        Self { as_of }
    }

    /// Build a typed position from a normalized record and its pool metadata
    pub fn to_position(&self, record: &RawPositionRecord, pool: Option<&PoolMetadata>) -> Position {
        let placeholder;
        let metadata = match pool {
            Some(metadata) => metadata,
            None => {
                placeholder = PoolMetadata::unknown(&record.pool_address);
                &placeholder
            }
        };

        // An unreported active bin never counts as in range
        let is_in_range = metadata.active_bin_id.is_some_and(|active_bin_id| {
            is_in_range(active_bin_id, record.lower_bin_id, record.upper_bin_id)
        });

        let total_value = usd_value(
            record.token_x_amount,
            metadata.price_x_usd,
            record.token_y_amount,
            metadata.price_y_usd,
        );
        let fees_earned_usd = usd_value(
            record.fees_earned_x,
            metadata.price_x_usd,
            record.fees_earned_y,
            metadata.price_y_usd,
        );

        Position {
            position_id: record.position_id.clone(),
            pool_address: record.pool_address.clone(),
            symbol_x: metadata.symbol_x.clone(),
            symbol_y: metadata.symbol_y.clone(),
            lower_bin_id: record.lower_bin_id,
            upper_bin_id: record.upper_bin_id,
            token_x_amount: record.token_x_amount,
            token_y_amount: record.token_y_amount,
            fees_earned_x: record.fees_earned_x,
            fees_earned_y: record.fees_earned_y,
            total_value,
            fees_earned_usd,
            is_in_range,
            utilization_rate: utilization_rate(
                is_in_range,
                record.lower_bin_id,
                record.upper_bin_id,
            ),
            apy: self.position_apy(total_value, fees_earned_usd, record.opened_at, metadata.apy),
            bin_liquidity: record.bin_liquidity.clone(),
        }
    }

    /// Resolve metadata for every record and build the complete portfolio view
    pub fn build_portfolio<D>(&self, records: &[RawPositionRecord], directory: &D) -> Portfolio
    where
        D: PoolDirectory + ?Sized,
    {
        let mut resolved: AHashMap<&str, Option<PoolMetadata>> = AHashMap::new();
        let positions: Vec<Position> = records
            .iter()
            .map(|record| {
                let metadata = resolved
                    .entry(record.pool_address.as_str())
                    .or_insert_with(|| {
                        let metadata = directory.resolve(&record.pool_address);
                        if metadata.is_none() {
                            warn!(
                                "Pool metadata unavailable for {}, using placeholders",
                                record.pool_address
                            );
                        }
                        metadata
                    });
                self.to_position(record, metadata.as_ref())
            })
            .collect();

        let groups = group_by_pool(&positions);
        let summary = summarize(&positions);
        debug!(
            "Built portfolio: {} positions across {} pools",
            summary.total_positions, summary.active_pools
        );

        Portfolio {
            positions,
            groups,
            summary,
        }
    }

    /// Annualized fee yield in percent.
    ///
    /// Uses fees earned over the time the position has been held when that is
    /// known and long enough to be meaningful, otherwise the pool's own figure.
    fn position_apy(
        &self,
        total_value: Decimal,
        fees_earned_usd: Decimal,
        opened_at: Option<i64>,
        pool_apy: Option<f64>,
    ) -> Option<f64> {
        if let Some(opened_at) = opened_at {
            let held_secs = self.as_of.saturating_sub(opened_at);
            if held_secs >= MIN_APY_WINDOW_SECS && total_value > Decimal::ZERO {
                let fee_yield = fees_earned_usd.checked_div(total_value)?.to_f64()?;
                return Some(fee_yield * SECONDS_PER_YEAR as f64 / held_secs as f64 * 100.0);
            }
        }
        pool_apy
    }
}

/// Whether the active bin lies inside `[lower_bin_id, upper_bin_id]`
pub fn is_in_range(active_bin_id: i32, lower_bin_id: i32, upper_bin_id: i32) -> bool {
    active_bin_id >= lower_bin_id && active_bin_id <= upper_bin_id
}

/// Share of a uniformly spread position that sits in the active bin.
///
/// An out-of-range position earns no fees and always reports zero. In range
/// the rate is `1 / width`, so a one-bin position scores 1 and wider ranges
/// score proportionally less.
pub fn utilization_rate(is_in_range: bool, lower_bin_id: i32, upper_bin_id: i32) -> f64 {
    if !is_in_range {
        return 0.0;
    }
    let width = (upper_bin_id as i64 - lower_bin_id as i64 + 1).max(1);
    1.0 / width as f64
}

/// Group positions by pool, largest combined value first.
///
/// Pools with equal value keep the order in which they first appear.
pub fn group_by_pool(positions: &[Position]) -> Vec<PoolPositionGroup> {
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut groups: Vec<PoolPositionGroup> = Vec::new();

    for position in positions {
        let slot = *index.entry(position.pool_address.as_str()).or_insert_with(|| {
            groups.push(PoolPositionGroup {
                pool_address: position.pool_address.clone(),
                symbol_x: position.symbol_x.clone(),
                symbol_y: position.symbol_y.clone(),
                positions: Vec::new(),
                combined_value: Decimal::ZERO,
                combined_fees: Decimal::ZERO,
                in_range_count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.combined_value = group.combined_value.saturating_add(position.total_value);
        group.combined_fees = group.combined_fees.saturating_add(position.fees_earned_usd);
        if position.is_in_range {
            group.in_range_count += 1;
        }
        group.positions.push(position.clone());
    }

    groups.sort_by(|a, b| b.combined_value.cmp(&a.combined_value));
    groups
}

/// Portfolio totals across every pool
pub fn summarize(positions: &[Position]) -> PortfolioSummary {
    let pools: AHashSet<&str> = positions.iter().map(|p| p.pool_address.as_str()).collect();
    let in_range_positions = positions.iter().filter(|p| p.is_in_range).count();

    let total_value_usd = positions
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.total_value));
    let total_fees_earned_usd = positions
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.fees_earned_usd));

    let apys: Vec<f64> = positions.iter().filter_map(|p| p.apy).collect();
    let average_apy = if apys.is_empty() {
        None
    } else {
        Some(apys.iter().sum::<f64>() / apys.len() as f64)
    };

    PortfolioSummary {
        total_positions: positions.len(),
        active_pools: pools.len(),
        total_value_usd,
        total_fees_earned_usd,
        in_range_positions,
        out_of_range_positions: positions.len() - in_range_positions,
        average_apy,
    }
}

fn usd_value(amount_x: Decimal, price_x: Decimal, amount_y: Decimal, price_y: Decimal) -> Decimal {
    amount_x
        .saturating_mul(price_x)
        .saturating_add(amount_y.saturating_mul(price_y))
}
