//! # Type Definitions
//!
//! Data model shared by every component. Field names serialize in camelCase
//! so JSON consumers see the same names as the data model.

pub mod bin;
pub mod distribution;
pub mod pool;
pub mod position;

pub use bin::*;
pub use distribution::*;
pub use pool::*;
pub use position::*;
