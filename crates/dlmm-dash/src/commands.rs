//! Dashboard views built from local data with the core crate

use std::path::Path;

use dlmm_core::liquidity::{build_default, build_single_bin, build_spot, to_absolute, validate};
use dlmm_core::position::{
    plan_removal, BinRange, CachedPoolDirectory, PoolDirectory, PositionAggregator, RemovalPlan,
    RemoveType,
};
use dlmm_core::series::{series_or_synthetic, BinSeriesGenerator};
use dlmm_core::{
    AbsoluteDistributionEntry, Bin, LiquidityDistributionEntry, PoolSnapshot, Portfolio,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::config::DashConfig;
use crate::error::{DashError, DashResult};
use crate::store::{load_positions, load_reserves, FilePoolSource};

/// Shape of a new position's liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// Weighted toward the active bin
    #[default]
    Curve,
    /// Equal weight in every bin
    Spot,
    /// Active bin only
    Single,
}

/// Distribution output, relative unless an active bin was given
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DistributionView {
    Relative(Vec<LiquidityDistributionEntry>),
    Absolute(Vec<AbsoluteDistributionEntry>),
}

/// Session over the configured pool data
pub struct Dashboard {
    directory: CachedPoolDirectory<FilePoolSource>,
    config: DashConfig,
}

impl Dashboard {
    pub fn open(config: DashConfig) -> DashResult<Self> {
        let source = FilePoolSource::load(&config.data.pools_path)?;
        Ok(Self::with_source(config, source))
    }

    pub fn with_source(config: DashConfig, source: FilePoolSource) -> Self {
        let directory = CachedPoolDirectory::new(source, config.cache.max_age());
        Self { directory, config }
    }

    /// Portfolio view of the wallet positions in `positions_path`
    pub fn portfolio(&self, positions_path: &Path, as_of: i64) -> DashResult<Portfolio> {
        let records = load_positions(positions_path)?;
        let portfolio = PositionAggregator::new(as_of).build_portfolio(&records, &self.directory);
        info!(
            "Portfolio: {} positions, {} USD",
            portfolio.summary.total_positions, portfolio.summary.total_value_usd
        );
        Ok(portfolio)
    }

    /// Removal plan for `[start, end]`, optionally restricted to one pool
    pub fn plan_removal(
        &self,
        positions_path: &Path,
        as_of: i64,
        start: i32,
        end: i32,
        remove_type: RemoveType,
        pool: Option<&str>,
    ) -> DashResult<RemovalPlan> {
        let bin_range = BinRange::new(start, end)?;
        let mut positions = self.portfolio(positions_path, as_of)?.positions;
        if let Some(pool) = pool {
            positions.retain(|position| position.pool_address == pool);
        }
        Ok(plan_removal(&positions, bin_range, remove_type)?)
    }

    /// Bin series for `pool`, from `reserves_path` when given and non-empty.
    ///
    /// `tvl` sizes the synthetic series used when there are no reserves.
    pub fn bins(
        &self,
        pool: &str,
        reserves_path: Option<&Path>,
        tvl: f64,
    ) -> DashResult<Vec<Bin>> {
        let metadata = self
            .directory
            .resolve(pool)
            .ok_or_else(|| DashError::UnknownPool(pool.to_string()))?;
        let reserves = match reserves_path {
            Some(path) => load_reserves(path)?,
            None => Vec::new(),
        };

        let incomplete = |field| DashError::IncompletePool {
            pool: pool.to_string(),
            field,
        };
        let snapshot = PoolSnapshot {
            pool_address: metadata.pool_address.clone(),
            active_bin_id: metadata.active_bin_id.ok_or_else(|| incomplete("active bin"))?,
            bin_step: metadata.bin_step.ok_or_else(|| incomplete("bin step"))?,
            reserve_x: Default::default(),
            reserve_y: Default::default(),
            decimals_x: metadata.decimals_x,
            decimals_y: metadata.decimals_y,
        };

        let rng = match self.config.series.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut generator = BinSeriesGenerator::new(self.config.series.params(), rng)?;
        Ok(series_or_synthetic(
            &snapshot,
            &reserves,
            tvl,
            self.config.series.half_width,
            &mut generator,
        )?)
    }
}

/// Liquidity distribution for a new position
pub fn distribution(
    shape: Shape,
    bins_left: i32,
    bins_right: i32,
    active_bin_id: Option<i32>,
) -> DashResult<DistributionView> {
    let entries = match shape {
        Shape::Curve => build_default(bins_left, bins_right)?,
        Shape::Spot => build_spot(bins_left, bins_right)?,
        Shape::Single => build_single_bin(),
    };
    validate(&entries)?;

    Ok(match active_bin_id {
        Some(active_bin_id) => {
            DistributionView::Absolute(to_absolute(&entries, active_bin_id)?)
        }
        None => DistributionView::Relative(entries),
    })
}
