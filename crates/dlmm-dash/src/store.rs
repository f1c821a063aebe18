//! Local JSON files standing in for the upstream pool and position APIs

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use dlmm_core::adapter::{adapt_position_record, pool_fields, string_field};
use dlmm_core::position::PoolSource;
use dlmm_core::{RawBinReserve, RawPositionRecord};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DashError, DashResult};

/// Raw pool records read from one file, keyed by pool address.
///
/// The file holds either an array of records, each carrying its own address,
/// or an object mapping addresses to records.
#[derive(Debug, Clone, Default)]
pub struct FilePoolSource {
    pools: HashMap<String, Value>,
}

impl FilePoolSource {
    pub fn load(path: impl AsRef<Path>) -> DashResult<Self> {
        let path = path.as_ref();
        let value: Value = read_json(path)?;
        let source = Self::from_value(value).map_err(|message| DashError::parse(path, message))?;
        debug!("Loaded {} pool records from {}", source.len(), path.display());
        Ok(source)
    }

    pub fn from_value(value: Value) -> Result<Self, String> {
        let pools = match value {
            Value::Object(map) => map.into_iter().collect(),
            Value::Array(records) => records
                .into_iter()
                .filter_map(|record| match string_field(&record, pool_fields::ADDRESS) {
                    Some(address) => Some((address, record)),
                    None => {
                        warn!("Skipping pool record without an address");
                        None
                    }
                })
                .collect(),
            _ => return Err("expected an array or object of pool records".to_string()),
        };
        Ok(Self { pools })
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl PoolSource for FilePoolSource {
    fn fetch(&self, pool_address: &str) -> Option<Value> {
        self.pools.get(pool_address).cloned()
    }
}

/// Read a wallet's raw position records and normalize them
pub fn load_positions(path: impl AsRef<Path>) -> DashResult<Vec<RawPositionRecord>> {
    let path = path.as_ref();
    let records: Vec<Value> = read_json(path)?;
    Ok(records.iter().map(adapt_position_record).collect())
}

/// Read per-bin reserves for one pool
pub fn load_reserves(path: impl AsRef<Path>) -> DashResult<Vec<RawBinReserve>> {
    read_json(path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> DashResult<T> {
    let content = fs::read_to_string(path).map_err(|e| DashError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| DashError::parse(path, e))
}
