use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dlmm_core::constants::{
    MAX_SERIES_BINS, SERIES_BASE_FRACTION, SERIES_DECAY, SERIES_DEFAULT_HALF_WIDTH,
    SERIES_JITTER_MAX, SERIES_JITTER_MIN,
};
use dlmm_core::series::SeriesParams;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DashError, DashResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Dashboard configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashConfig {
    /// Default log level when `RUST_LOG` is not set
    pub log_level: String,

    /// Pool metadata cache
    pub cache: CacheConfig,

    /// Synthetic bin series shape
    pub series: SeriesConfig,

    /// Local data files
    pub data: DataConfig,
}

/// Pool metadata cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds before cached pool metadata is fetched again
    pub metadata_max_age_secs: u64,
}

/// Synthetic bin series configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Bins generated on each side of the active bin
    pub half_width: u32,
    pub base_fraction: f64,
    pub decay: f64,
    pub jitter_min: f64,
    pub jitter_max: f64,
    /// Fixed seed for reproducible series; entropy when unset
    pub seed: Option<u64>,
}

/// Local data file configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON file holding raw pool metadata records
    pub pools_path: PathBuf,
}

impl DashConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> DashResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DashError::io(path, e))?;
        let config: DashConfig = toml::from_str(&content).map_err(|e| DashError::parse(path, e))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> DashResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        info!("No config file at {}, using defaults", path.display());
        Ok(Self::default())
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> DashResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DashError::parse(path, e))?;
        fs::write(path, content).map_err(|e| DashError::io(path, e))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> DashResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(DashError::invalid_config(
                "log_level",
                &self.log_level,
                "one of trace, debug, info, warn, error",
            ));
        }

        if self.cache.metadata_max_age_secs == 0 {
            return Err(DashError::invalid_config(
                "cache.metadata_max_age_secs",
                0,
                "greater than 0",
            ));
        }

        self.series.validate()?;

        if self.data.pools_path.as_os_str().is_empty() {
            return Err(DashError::invalid_config("data.pools_path", "empty", "a file path"));
        }

        Ok(())
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.metadata_max_age_secs)
    }
}

impl SeriesConfig {
    /// Validate series configuration
    fn validate(&self) -> DashResult<()> {
        if self.half_width == 0 {
            return Err(DashError::invalid_config("series.half_width", 0, "greater than 0"));
        }

        if 2 * self.half_width as u64 + 1 > MAX_SERIES_BINS {
            return Err(DashError::invalid_config(
                "series.half_width",
                self.half_width,
                "a series of at most 65536 bins",
            ));
        }

        if !(self.base_fraction > 0.0 && self.base_fraction <= 1.0) {
            return Err(DashError::invalid_config(
                "series.base_fraction",
                self.base_fraction,
                "in (0, 1]",
            ));
        }

        if !(self.decay >= 0.0 && self.decay.is_finite()) {
            return Err(DashError::invalid_config("series.decay", self.decay, "at least 0"));
        }

        let jitter_ok = self.jitter_min >= 0.0
            && self.jitter_min <= self.jitter_max
            && self.jitter_max.is_finite();
        if !jitter_ok {
            return Err(DashError::invalid_config(
                "series.jitter_min",
                self.jitter_min,
                "between 0 and series.jitter_max",
            ));
        }

        Ok(())
    }

    /// Generator parameters for the core series builder
    pub fn params(&self) -> SeriesParams {
        SeriesParams {
            base_fraction: self.base_fraction,
            decay: self.decay,
            jitter_min: self.jitter_min,
            jitter_max: self.jitter_max,
        }
    }
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            cache: CacheConfig::default(),
            series: SeriesConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            metadata_max_age_secs: 300, // 5 minutes
        }
    }
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            half_width: SERIES_DEFAULT_HALF_WIDTH,
            base_fraction: SERIES_BASE_FRACTION,
            decay: SERIES_DECAY,
            jitter_min: SERIES_JITTER_MIN,
            jitter_max: SERIES_JITTER_MAX,
            seed: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            pools_path: PathBuf::from("pools.json"),
        }
    }
}
