//! # Portfolio Scenarios
//!
//! A wallet's raw upstream records taken through the adapter, the cached pool
//! directory and the aggregator, then used to plan a range removal.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use approx::assert_relative_eq;
    use dlmm_core::adapter::adapt_position_record;
    use dlmm_core::cache::{ManualClock, TtlCache};
    use dlmm_core::position::{
        plan_removal, BinRange, CachedPoolDirectory, PositionAggregator, RemoveType,
    };
    use dlmm_core::{DlmmError, RawPositionRecord, CENTER_BIN_ID, UNKNOWN_SYMBOL};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    const NOW: i64 = 1_700_000_000;

    fn pool_source() -> HashMap<String, Value> {
        let mut pools = HashMap::new();
        pools.insert(
            "PoolA".to_string(),
            json!({
                "address": "PoolA",
                "name": "SOL-USDC",
                "activeId": CENTER_BIN_ID,
                "binStep": 10,
                "tokenBase": { "mintAddress": "So111", "decimals": 9, "priceUsd": "150" },
                "tokenQuote": { "mintAddress": "EPjF", "decimals": 6, "priceUsd": "1" },
            }),
        );
        // A second upstream with its own field names
        pools.insert(
            "PoolB".to_string(),
            json!({
                "pairAddress": "PoolB",
                "pairName": "JUP/USDC",
                "activeBinId": 100,
                "binStepBps": "20",
                "tokenX": { "decimals": 6, "price": 0.5 },
                "tokenY": { "decimals": 6, "price": 1 },
                "apy": "12.5",
            }),
        );
        pools
    }

    fn wallet_records() -> Vec<RawPositionRecord> {
        let raw = vec![
            json!({
                "positionId": "p1",
                "poolAddress": "PoolA",
                "lowerBinId": CENTER_BIN_ID - 8,
                "upperBinId": CENTER_BIN_ID + 2,
                "tokenXAmount": "1",
                "tokenYAmount": "100",
                "feeY": "0.5",
            }),
            json!({
                "publicKey": "p2",
                "lbPair": "PoolB",
                "minBinId": 200,
                "maxBinId": 150,
                "amountX": 20,
                "amountY": "5",
            }),
            json!({
                "id": "p3",
                "pool": "PoolMissing",
                "lowerBinId": 1,
                "upperBinId": 3,
                "tokenXAmount": "7",
                "tokenYAmount": "not-a-number",
            }),
        ];
        raw.iter().map(adapt_position_record).collect()
    }

    #[test]
    fn test_portfolio_from_mixed_upstream_shapes() {
        let directory = CachedPoolDirectory::new(pool_source(), Duration::from_secs(300));
        let portfolio = PositionAggregator::new(NOW).build_portfolio(&wallet_records(), &directory);

        assert_eq!(portfolio.positions.len(), 3);
        let p1 = &portfolio.positions[0];
        assert_eq!((p1.symbol_x.as_str(), p1.symbol_y.as_str()), ("SOL", "USDC"));
        assert_eq!(p1.total_value, dec!(250));
        assert_eq!(p1.fees_earned_usd, dec!(0.5));
        assert!(p1.is_in_range);
        assert_eq!(p1.utilization_rate, 1.0 / 11.0);

        let p2 = &portfolio.positions[1];
        assert_eq!((p2.lower_bin_id, p2.upper_bin_id), (150, 200));
        assert_eq!(p2.symbol_x, "JUP");
        assert_eq!(p2.total_value, dec!(15));
        assert!(!p2.is_in_range);
        assert_eq!(p2.utilization_rate, 0.0);
        assert_eq!(p2.apy, Some(12.5));

        let p3 = &portfolio.positions[2];
        assert_eq!(p3.symbol_x, UNKNOWN_SYMBOL);
        assert_eq!(p3.token_x_amount, dec!(7));
        assert_eq!(p3.token_y_amount, dec!(0));
        assert_eq!(p3.total_value, dec!(0));
        assert!(!p3.is_in_range);

        let order: Vec<&str> = portfolio.groups.iter().map(|g| g.pool_address.as_str()).collect();
        assert_eq!(order, vec!["PoolA", "PoolB", "PoolMissing"]);

        let summary = &portfolio.summary;
        assert_eq!(summary.total_positions, 3);
        assert_eq!(summary.active_pools, 3);
        assert_eq!(summary.total_value_usd, dec!(265));
        assert_eq!(summary.total_fees_earned_usd, dec!(0.5));
        assert_eq!(summary.in_range_positions, 1);
        assert_eq!(summary.out_of_range_positions, 2);
        assert_eq!(summary.average_apy, Some(12.5));

        // Only resolved pools are cached
        assert_eq!(directory.cached_pools(), 2);
    }

    #[test]
    fn test_pool_without_active_bin_reports_out_of_range() {
        let mut pools = HashMap::new();
        pools.insert(
            "PoolA".to_string(),
            json!({ "address": "PoolA", "name": "SOL-USDC", "binStep": 10 }),
        );
        let directory = CachedPoolDirectory::new(pools, Duration::from_secs(300));
        let records = vec![adapt_position_record(&json!({
            "positionId": "p1",
            "poolAddress": "PoolA",
            "lowerBinId": CENTER_BIN_ID - 3,
            "upperBinId": CENTER_BIN_ID + 3,
        }))];

        let portfolio = PositionAggregator::new(NOW).build_portfolio(&records, &directory);
        let position = &portfolio.positions[0];
        assert_eq!(position.symbol_x, "SOL");
        assert!(!position.is_in_range);
        assert_eq!(position.utilization_rate, 0.0);
        assert_eq!(portfolio.summary.in_range_positions, 0);
    }

    #[test]
    fn test_iso_open_date_drives_fee_apy() {
        let directory = CachedPoolDirectory::new(pool_source(), Duration::from_secs(300));
        let records = vec![adapt_position_record(&json!({
            "positionId": "p1",
            "poolAddress": "PoolA",
            "lowerBinId": CENTER_BIN_ID,
            "upperBinId": CENTER_BIN_ID,
            "tokenXAmount": "1",
            "tokenYAmount": "100",
            "feeY": "2.5",
            "createdAt": "2024-01-01T00:00:00Z",
        }))];

        // 73 days later: 1% of value earned in a fifth of a year
        let as_of = 1_704_067_200 + 73 * 24 * 60 * 60;
        let portfolio = PositionAggregator::new(as_of).build_portfolio(&records, &directory);
        let apy = portfolio.positions[0].apy.unwrap();
        assert_relative_eq!(apy, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stale_metadata_is_refetched() {
        let clock = ManualClock::new();
        let source = std::cell::RefCell::new(pool_source());

        struct Shared<'a>(&'a std::cell::RefCell<HashMap<String, Value>>);
        impl dlmm_core::position::PoolSource for Shared<'_> {
            fn fetch(&self, pool_address: &str) -> Option<Value> {
                self.0.borrow().get(pool_address).cloned()
            }
        }

        let directory = CachedPoolDirectory::with_cache(
            Shared(&source),
            TtlCache::with_clock(&clock),
            Duration::from_secs(60),
        );
        let aggregator = PositionAggregator::new(NOW);
        let records = wallet_records();

        let before = aggregator.build_portfolio(&records, &directory);
        assert!(before.positions[0].is_in_range);

        // The active bin moves out of p1's range upstream
        source.borrow_mut().insert(
            "PoolA".to_string(),
            json!({ "address": "PoolA", "name": "SOL-USDC", "activeId": CENTER_BIN_ID + 50 }),
        );

        clock.advance(Duration::from_secs(30));
        let cached = aggregator.build_portfolio(&records, &directory);
        assert!(cached.positions[0].is_in_range);

        clock.advance(Duration::from_secs(31));
        let refreshed = aggregator.build_portfolio(&records, &directory);
        assert!(!refreshed.positions[0].is_in_range);
        assert_eq!(refreshed.summary.in_range_positions, 0);
    }

    #[test]
    fn test_removal_plan_over_portfolio_positions() {
        let directory = CachedPoolDirectory::new(pool_source(), Duration::from_secs(300));
        let portfolio = PositionAggregator::new(NOW).build_portfolio(&wallet_records(), &directory);

        let range = BinRange::new(175, 250).unwrap();
        let plan = plan_removal(&portfolio.positions, range, RemoveType::Both).unwrap();
        assert_eq!(plan.per_position.len(), 1);

        let removal = &plan.per_position[0];
        assert_eq!(removal.position.position_id, "p2");
        assert_eq!((removal.clipped_start, removal.clipped_end), (175, 200));
        assert_eq!(removal.bin_ids().count(), 26);
        assert!(!removal.closes_position);

        // 26 of p2's 51 bins
        assert_eq!(plan.estimated_x, dec!(20) * dec!(26) / dec!(51));
        assert_eq!(plan.estimated_y, dec!(5) * dec!(26) / dec!(51));

        let y_only = plan_removal(&portfolio.positions, range, RemoveType::YOnly).unwrap();
        assert_eq!(y_only.estimated_x, dec!(0));
        assert_eq!(y_only.estimated_y, plan.estimated_y);

        let nothing = BinRange::new(10_000, 10_001).unwrap();
        assert_eq!(
            plan_removal(&portfolio.positions, nothing, RemoveType::Both),
            Err(DlmmError::EmptySelection)
        );
    }

    #[test]
    fn test_portfolio_serializes_camel_case() {
        let directory = CachedPoolDirectory::new(pool_source(), Duration::from_secs(300));
        let portfolio = PositionAggregator::new(NOW).build_portfolio(&wallet_records(), &directory);

        let json = serde_json::to_value(&portfolio).unwrap();
        let total: Decimal = json["summary"]["totalValueUsd"].as_str().unwrap().parse().unwrap();
        assert_eq!(total, dec!(265));
        assert_eq!(json["positions"][0]["positionId"], "p1");
        assert_eq!(json["positions"][0]["isInRange"], true);
        assert_eq!(json["groups"][0]["poolAddress"], "PoolA");
        assert!(json["positions"][0].get("binLiquidity").is_none());
    }
}
