//! # Protocol Constants
//!
//! Fundamental constants for bin-indexed liquidity:
//! - Bin id anchor and bin step bounds
//! - Basis point scale for liquidity distributions
//! - Synthetic series defaults
//! - Placeholder values for unresolved metadata

// ============================================================================
// Bin Constants
// ============================================================================

/// Bin id at which price equals the reference price (2^23)
pub const CENTER_BIN_ID: i32 = 1 << 23;

/// Basis points denominator (10,000 = 100%)
pub const BASIS_POINT_MAX: u32 = 10_000;

/// Largest bin step accepted (100%)
pub const MAX_BIN_STEP: u16 = 10_000;

/// Reference price used when the caller does not supply one
pub const DEFAULT_REFERENCE_PRICE: f64 = 1.0;

// ============================================================================
// Distribution Constants
// ============================================================================

/// Total a liquidity distribution must sum to (X and Y combined)
pub const DISTRIBUTION_TOTAL_BPS: u32 = BASIS_POINT_MAX;

/// Half of the active bin weight goes to each side
pub const ACTIVE_BIN_SPLIT_DIVISOR: u32 = 2;

/// Widest distribution that can be built, in bins
pub const MAX_DISTRIBUTION_BINS: u64 = 1 << 16;

// ============================================================================
// Synthetic Series Constants
// ============================================================================

/// Fraction of TVL placed in the active bin before decay
pub const SERIES_BASE_FRACTION: f64 = 0.1;

/// Exponential decay per bin of distance from the active bin
pub const SERIES_DECAY: f64 = 0.3;

/// Jitter multiplier bounds
pub const SERIES_JITTER_MIN: f64 = 0.5;
pub const SERIES_JITTER_MAX: f64 = 1.0;

/// Default number of bins on each side of the active bin
pub const SERIES_DEFAULT_HALF_WIDTH: u32 = 30;

/// Widest synthetic series that can be generated, in bins
pub const MAX_SERIES_BINS: u64 = 1 << 16;

// ============================================================================
// Aggregation Constants
// ============================================================================

/// Symbol shown when pool metadata cannot be resolved
pub const UNKNOWN_SYMBOL: &str = "Unknown";

/// Seconds per year used to annualize fee yield
pub const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

/// Minimum holding period before fee yield is annualized (1 hour)
pub const MIN_APY_WINDOW_SECS: i64 = 60 * 60;
