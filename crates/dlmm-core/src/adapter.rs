//! # Raw Record Adapter
//!
//! Pool and position records arrive from several upstream APIs, each with its
//! own field names and with numbers that may be strings, numbers or absent.
//! Each field is looked up through a fixed priority list of JSON pointers; the
//! first present, non-null value wins. The result is a typed record in which
//! every field has a value, so no alternate shapes leak past this module.

use std::str::FromStr;

use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{PoolMetadata, PositionBinLiquidity, RawPositionRecord};

/// Priority lists for pool metadata fields
pub mod pool_fields {
    pub const ADDRESS: &[&str] = &["/address", "/poolAddress", "/pairAddress", "/lbPair"];
    pub const NAME: &[&str] = &["/name", "/pairName"];
    pub const SYMBOL_X: &[&str] = &[
        "/tokenBase/symbol",
        "/tokenX/symbol",
        "/symbolX",
        "/baseSymbol",
    ];
    pub const SYMBOL_Y: &[&str] = &[
        "/tokenQuote/symbol",
        "/tokenY/symbol",
        "/symbolY",
        "/quoteSymbol",
    ];
    pub const MINT_X: &[&str] = &["/tokenBase/mintAddress", "/tokenMintX", "/tokenA", "/mintX"];
    pub const MINT_Y: &[&str] = &["/tokenQuote/mintAddress", "/tokenMintY", "/tokenB", "/mintY"];
    pub const DECIMALS_X: &[&str] = &["/tokenBase/decimals", "/tokenX/decimals", "/decimalsX"];
    pub const DECIMALS_Y: &[&str] = &["/tokenQuote/decimals", "/tokenY/decimals", "/decimalsY"];
    pub const ACTIVE_BIN_ID: &[&str] = &["/activeBinId", "/activeId", "/activeBin/binId"];
    pub const BIN_STEP: &[&str] = &["/binStep", "/binStepBps", "/pairParameters/binStep"];
    pub const PRICE_X_USD: &[&str] = &["/tokenBase/priceUsd", "/tokenX/price", "/priceXUsd"];
    pub const PRICE_Y_USD: &[&str] = &["/tokenQuote/priceUsd", "/tokenY/price", "/priceYUsd"];
    pub const APY: &[&str] = &["/apy", "/apr", "/stats/apy"];
}

/// Priority lists for position fields
pub mod position_fields {
    pub const POSITION_ID: &[&str] = &["/positionId", "/position", "/publicKey", "/address", "/id"];
    pub const POOL_ADDRESS: &[&str] = &["/poolAddress", "/lbPair", "/pool", "/pairAddress"];
    pub const LOWER_BIN_ID: &[&str] = &["/lowerBinId", "/positionData/lowerBinId", "/minBinId"];
    pub const UPPER_BIN_ID: &[&str] = &["/upperBinId", "/positionData/upperBinId", "/maxBinId"];
    pub const TOKEN_X: &[&str] = &[
        "/tokenXAmount",
        "/totalXAmount",
        "/positionData/totalXAmount",
        "/amountX",
    ];
    pub const TOKEN_Y: &[&str] = &[
        "/tokenYAmount",
        "/totalYAmount",
        "/positionData/totalYAmount",
        "/amountY",
    ];
    pub const FEES_X: &[&str] = &["/feesEarnedX", "/feeX", "/positionData/feeX", "/unclaimedFeeX"];
    pub const FEES_Y: &[&str] = &["/feesEarnedY", "/feeY", "/positionData/feeY", "/unclaimedFeeY"];
    pub const OPENED_AT: &[&str] = &["/openedAt", "/createdAt", "/openTime"];
    pub const BINS: &[&str] = &[
        "/binLiquidity",
        "/positionBinData",
        "/positionData/positionBinData",
    ];
    pub const BIN_ID: &[&str] = &["/binId"];
    pub const BIN_AMOUNT_X: &[&str] = &["/amountX", "/positionXAmount"];
    pub const BIN_AMOUNT_Y: &[&str] = &["/amountY", "/positionYAmount"];
}

// ============================================================================
// Record Adapters
// ============================================================================

/// Normalize a pool metadata record.
///
/// Returns `None` only when no address can be found, since a record without
/// an address cannot be matched to any position. Use
/// [`adapt_pool_metadata_for`] when the address is already known.
pub fn adapt_pool_metadata(record: &Value) -> Option<PoolMetadata> {
    let address = string_field(record, pool_fields::ADDRESS)?;
    Some(adapt_pool_metadata_for(record, &address))
}

/// Normalize a pool metadata record for a known pool address
pub fn adapt_pool_metadata_for(record: &Value, pool_address: &str) -> PoolMetadata {
    let mut metadata = PoolMetadata::unknown(pool_address);

    let (name_x, name_y) = string_field(record, pool_fields::NAME)
        .and_then(|name| split_pair_name(&name))
        .unzip();
    if let Some(symbol) = string_field(record, pool_fields::SYMBOL_X).or(name_x) {
        metadata.symbol_x = symbol;
    }
    if let Some(symbol) = string_field(record, pool_fields::SYMBOL_Y).or(name_y) {
        metadata.symbol_y = symbol;
    }

    metadata.mint_x = string_field(record, pool_fields::MINT_X).unwrap_or_default();
    metadata.mint_y = string_field(record, pool_fields::MINT_Y).unwrap_or_default();
    metadata.decimals_x = int_field(record, pool_fields::DECIMALS_X, "decimalsX").unwrap_or(0);
    metadata.decimals_y = int_field(record, pool_fields::DECIMALS_Y, "decimalsY").unwrap_or(0);
    metadata.active_bin_id = int_field(record, pool_fields::ACTIVE_BIN_ID, "activeBinId");
    metadata.bin_step = int_field(record, pool_fields::BIN_STEP, "binStep");
    metadata.price_x_usd = decimal_field(record, pool_fields::PRICE_X_USD, "priceXUsd");
    metadata.price_y_usd = decimal_field(record, pool_fields::PRICE_Y_USD, "priceYUsd");
    metadata.apy = first_value(record, pool_fields::APY)
        .and_then(coerce_decimal)
        .and_then(|apy| num_traits::ToPrimitive::to_f64(&apy));

    metadata
}

/// Normalize a raw position record.
///
/// Missing amounts become zero. A range given upper-first is swapped so the
/// record always satisfies `lower_bin_id <= upper_bin_id`.
pub fn adapt_position_record(record: &Value) -> RawPositionRecord {
    let position_id = string_field(record, position_fields::POSITION_ID).unwrap_or_default();
    let mut lower_bin_id: i32 =
        int_field(record, position_fields::LOWER_BIN_ID, "lowerBinId").unwrap_or(0);
    let mut upper_bin_id: i32 =
        int_field(record, position_fields::UPPER_BIN_ID, "upperBinId").unwrap_or(lower_bin_id);

    if lower_bin_id > upper_bin_id {
        debug!(
            "Position {} has inverted range [{}, {}], swapping",
            position_id, lower_bin_id, upper_bin_id
        );
        std::mem::swap(&mut lower_bin_id, &mut upper_bin_id);
    }

    let bin_liquidity = first_value(record, position_fields::BINS)
        .and_then(Value::as_array)
        .map(|bins| bins.iter().filter_map(adapt_position_bin).collect())
        .unwrap_or_default();

    RawPositionRecord {
        pool_address: string_field(record, position_fields::POOL_ADDRESS).unwrap_or_default(),
        lower_bin_id,
        upper_bin_id,
        token_x_amount: decimal_field(record, position_fields::TOKEN_X, "tokenXAmount"),
        token_y_amount: decimal_field(record, position_fields::TOKEN_Y, "tokenYAmount"),
        fees_earned_x: decimal_field(record, position_fields::FEES_X, "feesEarnedX"),
        fees_earned_y: decimal_field(record, position_fields::FEES_Y, "feesEarnedY"),
        opened_at: timestamp_field(record, position_fields::OPENED_AT, "openedAt"),
        bin_liquidity,
        position_id,
    }
}

fn adapt_position_bin(record: &Value) -> Option<PositionBinLiquidity> {
    let bin_id = int_field(record, position_fields::BIN_ID, "binId")?;
    Some(PositionBinLiquidity {
        bin_id,
        amount_x: decimal_field(record, position_fields::BIN_AMOUNT_X, "amountX"),
        amount_y: decimal_field(record, position_fields::BIN_AMOUNT_Y, "amountY"),
    })
}

// ============================================================================
// Field Lookup and Coercion
// ============================================================================

/// First value along `paths` that is present and not null or blank
pub fn first_value<'a>(record: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| record.pointer(path))
        .find(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

/// String field; numbers are rendered as text
pub fn string_field(record: &Value, paths: &[&str]) -> Option<String> {
    match first_value(record, paths)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decimal field, zero when absent or unparseable
pub fn decimal_field(record: &Value, paths: &[&str], name: &str) -> Decimal {
    match first_value(record, paths) {
        Some(value) => coerce_decimal(value).unwrap_or_else(|| {
            warn!("Unparseable {} value {}, using 0", name, value);
            Decimal::ZERO
        }),
        None => Decimal::ZERO,
    }
}

/// Integer field converted to the target width; `None` when absent or out of range
pub fn int_field<T>(record: &Value, paths: &[&str], name: &str) -> Option<T>
where
    T: TryFrom<i64>,
{
    let value = first_value(record, paths)?;
    let parsed = coerce_i64(value).and_then(|n| T::try_from(n).ok());
    if parsed.is_none() {
        warn!("Unusable {} value {}, ignoring", name, value);
    }
    parsed
}

/// Unix seconds from an integer or an RFC 3339 string; `None` when absent or unparseable
pub fn timestamp_field(record: &Value, paths: &[&str], name: &str) -> Option<i64> {
    let value = first_value(record, paths)?;
    let parsed = coerce_timestamp(value);
    if parsed.is_none() {
        warn!("Unusable {} value {}, ignoring", name, value);
    }
    parsed
}

/// Parse Unix seconds or an RFC 3339 date such as `2024-01-01T00:00:00Z`
pub fn coerce_timestamp(value: &Value) -> Option<i64> {
    if let Some(seconds) = coerce_i64(value) {
        return Some(seconds);
    }
    let text = value.as_str()?.trim();
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|date| date.timestamp())
}

/// Parse a JSON number or numeric string as a decimal
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parse a JSON number or numeric string as an integer
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Split `SOL-USDC` or `SOL/USDC` into its two symbols
fn split_pair_name(name: &str) -> Option<(String, String)> {
    let (x, y) = name.split_once(['-', '/'])?;
    let (x, y) = (x.trim(), y.trim());
    if x.is_empty() || y.is_empty() {
        return None;
    }
    Some((x.to_string(), y.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_field_priority() {
        let record = json!({
            "tokenBase": { "mintAddress": "MintFromBase" },
            "tokenMintX": "MintFromFlat",
            "tokenA": "MintFromLegacy",
        });
        assert_eq!(
            string_field(&record, pool_fields::MINT_X).as_deref(),
            Some("MintFromBase")
        );

        let record = json!({ "tokenBase": {}, "tokenMintX": "", "tokenA": "MintFromLegacy" });
        assert_eq!(
            string_field(&record, pool_fields::MINT_X).as_deref(),
            Some("MintFromLegacy")
        );
    }

    #[test]
    fn test_pool_metadata_from_api_shape() {
        let record = json!({
            "address": "PoolA",
            "name": "SOL-USDC",
            "activeId": "8388600",
            "binStep": 25,
            "tokenBase": { "mintAddress": "So111", "decimals": 9, "priceUsd": "150.25" },
            "tokenQuote": { "mintAddress": "EPjF", "decimals": 6, "priceUsd": 1 },
            "apr": 12.5,
        });
        let metadata = adapt_pool_metadata(&record).unwrap();
        assert_eq!(metadata.pool_address, "PoolA");
        assert_eq!(metadata.pair_name(), "SOL/USDC");
        assert_eq!(metadata.mint_x, "So111");
        assert_eq!(metadata.decimals_x, 9);
        assert_eq!(metadata.decimals_y, 6);
        assert_eq!(metadata.active_bin_id, Some(8_388_600));
        assert_eq!(metadata.bin_step, Some(25));
        assert_eq!(metadata.price_x_usd, dec!(150.25));
        assert_eq!(metadata.price_y_usd, dec!(1));
        assert_eq!(metadata.apy, Some(12.5));
    }

    #[test]
    fn test_pool_metadata_without_address() {
        assert!(adapt_pool_metadata(&json!({ "binStep": 10 })).is_none());

        let metadata = adapt_pool_metadata_for(&json!({}), "PoolB");
        assert_eq!(metadata, PoolMetadata::unknown("PoolB"));
    }

    #[test]
    fn test_position_defaults() {
        let record = adapt_position_record(&json!({
            "positionId": "Pos1",
            "lbPair": "PoolA",
            "lowerBinId": 100,
            "upperBinId": "110",
            "totalXAmount": "12.5",
            "feeY": null,
        }));
        assert_eq!(record.position_id, "Pos1");
        assert_eq!(record.pool_address, "PoolA");
        assert_eq!((record.lower_bin_id, record.upper_bin_id), (100, 110));
        assert_eq!(record.token_x_amount, dec!(12.5));
        assert_eq!(record.token_y_amount, Decimal::ZERO);
        assert_eq!(record.fees_earned_x, Decimal::ZERO);
        assert_eq!(record.fees_earned_y, Decimal::ZERO);
        assert_eq!(record.opened_at, None);
        assert!(record.bin_liquidity.is_empty());
    }

    #[test]
    fn test_position_nested_shape_and_inverted_range() {
        let record = adapt_position_record(&json!({
            "publicKey": "Pos2",
            "pool": "PoolB",
            "positionData": {
                "lowerBinId": 20,
                "upperBinId": 10,
                "totalYAmount": 1e3,
                "positionBinData": [
                    { "binId": 10, "positionXAmount": "1", "positionYAmount": "2" },
                    { "positionXAmount": "5" },
                    { "binId": 11, "amountY": 3 },
                ],
            },
            "createdAt": 1_700_000_000,
        }));
        assert_eq!((record.lower_bin_id, record.upper_bin_id), (10, 20));
        assert_eq!(record.token_y_amount, dec!(1000));
        assert_eq!(record.opened_at, Some(1_700_000_000));
        assert_eq!(record.bin_liquidity.len(), 2);
        assert_eq!(record.bin_liquidity[0].amount_y, dec!(2));
        assert_eq!(record.bin_liquidity[1].amount_x, Decimal::ZERO);
    }

    #[test]
    fn test_unparseable_values_default_to_zero() {
        let record = adapt_position_record(&json!({
            "tokenXAmount": "not a number",
            "lowerBinId": 1e12,
        }));
        assert_eq!(record.token_x_amount, Decimal::ZERO);
        assert_eq!((record.lower_bin_id, record.upper_bin_id), (0, 0));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(coerce_decimal(&json!("1.5e2")), Some(dec!(150)));
        assert_eq!(coerce_decimal(&json!(true)), None);
        assert_eq!(coerce_i64(&json!(" -42 ")), Some(-42));
        assert_eq!(coerce_i64(&json!(7.0)), Some(7));
        assert_eq!(coerce_i64(&json!(7.5)), None);
    }

    #[test]
    fn test_opened_at_accepts_rfc3339() {
        let record = adapt_position_record(&json!({
            "positionId": "p",
            "createdAt": "2024-01-01T00:00:00Z",
        }));
        assert_eq!(record.opened_at, Some(1_704_067_200));

        let record = adapt_position_record(&json!({ "openTime": "2024-01-01T02:00:00+02:00" }));
        assert_eq!(record.opened_at, Some(1_704_067_200));

        let record = adapt_position_record(&json!({ "openedAt": "1704067200" }));
        assert_eq!(record.opened_at, Some(1_704_067_200));

        let record = adapt_position_record(&json!({ "createdAt": "last tuesday" }));
        assert_eq!(record.opened_at, None);
    }
}
