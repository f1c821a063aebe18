pub mod commands;
pub mod config;
pub mod error;
pub mod store;

pub use commands::{distribution, Dashboard, DistributionView, Shape};
pub use config::{CacheConfig, DashConfig, DataConfig, SeriesConfig};
pub use error::{DashError, DashResult};
pub use store::FilePoolSource;
