//! # Positions
//!
//! Portfolio aggregation, pool metadata lookup and partial removal planning.

pub mod aggregator;
pub mod directory;
pub mod removal;

pub use aggregator::{group_by_pool, is_in_range, summarize, utilization_rate, PositionAggregator};
pub use directory::{CachedPoolDirectory, PoolDirectory, PoolSource};
pub use removal::{
    clip_to_range, plan_removal, select_overlapping, BinRange, PositionRemoval, RemovalPlan,
    RemoveType,
};
