//! # Core Error Types
//!
//! Errors raised by bin math, distribution building and removal planning.
//! Two families share one enum: caller bugs (bad bin step, bad price, clipping
//! a pair that does not overlap) and user-input conditions that the dashboard
//! renders back to the user (invalid distributions, empty removal selections).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the liquidity core
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DlmmError {
    // ========================================================================
    // Math Errors
    // ========================================================================

    #[error("Invalid bin step: must be between 1 and 10000 basis points")]
    InvalidBinStep,

    #[error("Invalid price: must be finite and greater than zero")]
    InvalidPrice,

    #[error("Price for bin is outside the representable range")]
    PriceOutOfRange,

    // ========================================================================
    // Range Errors
    // ========================================================================

    #[error("Invalid bin range")]
    InvalidRange,

    #[error("Position does not overlap the requested bin range")]
    NoOverlap,

    #[error("No positions overlap the requested bin range")]
    EmptySelection,

    #[error("Duplicate bin id {0}")]
    DuplicateBin(i32),

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Liquidity distribution is invalid: {}", .0.join("; "))]
    ValidationFailure(Vec<String>),
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, DlmmError>;

impl DlmmError {
    /// Create a validation failure from a list of violations
    pub fn validation(violations: Vec<String>) -> Self {
        Self::ValidationFailure(violations)
    }

    /// True when the error means the caller broke an invariant, as opposed to
    /// input the user can correct.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            Self::InvalidBinStep | Self::InvalidPrice | Self::PriceOutOfRange | Self::NoOverlap
        )
    }

    /// Violations carried by a validation failure, empty otherwise
    pub fn violations(&self) -> &[String] {
        match self {
            Self::ValidationFailure(violations) => violations,
            _ => &[],
        }
    }
}
