//! # Bin Series
//!
//! Bin liquidity series for the pool chart. Authoritative series are built
//! from chain reserves; when none are available a synthetic series decaying
//! away from the active bin keeps the chart populated. Synthetic bins are
//! always flagged so they are never mistaken for chain data.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    MAX_SERIES_BINS, SERIES_BASE_FRACTION, SERIES_DECAY, SERIES_JITTER_MAX, SERIES_JITTER_MIN,
};
use crate::errors::{CoreResult, DlmmError};
use crate::math::bin_math::{price_for_bin, validate_bin_step};
use crate::types::{Bin, PoolSnapshot, RawBinReserve};

/// Shape of a synthetic series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesParams {
    /// Fraction of TVL in the active bin before decay and jitter
    pub base_fraction: f64,
    /// Decay rate per bin of distance
    pub decay: f64,
    pub jitter_min: f64,
    pub jitter_max: f64,
}

impl Default for SeriesParams {
    fn default() -> Self {
        Self {
            base_fraction: SERIES_BASE_FRACTION,
            decay: SERIES_DECAY,
            jitter_min: SERIES_JITTER_MIN,
            jitter_max: SERIES_JITTER_MAX,
        }
    }
}

impl SeriesParams {
    pub fn validate(&self) -> CoreResult<()> {
        let finite = [self.base_fraction, self.decay, self.jitter_min, self.jitter_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite
            || self.base_fraction < 0.0
            || self.decay < 0.0
            || self.jitter_min < 0.0
            || self.jitter_min > self.jitter_max
        {
            return Err(DlmmError::InvalidRange);
        }
        Ok(())
    }
}

/// Generator of synthetic bin series driven by an injected random source
pub struct BinSeriesGenerator<R> {
    params: SeriesParams,
    rng: R,
}

impl<R: Rng> BinSeriesGenerator<R> {
    pub fn new(params: SeriesParams, rng: R) -> CoreResult<Self> {
        params.validate()?;
        Ok(Self { params, rng })
    }

    pub fn params(&self) -> &SeriesParams {
        &self.params
    }

    /// Synthetic bins from `active_bin_id - half_width` to `active_bin_id + half_width`.
    ///
    /// Liquidity per bin is `tvl * base_fraction * exp(-decay * |offset|) * jitter`.
    /// Bins left of the active bin hold it as X, bins to the right as Y, and
    /// the active bin holds half of each. Series wider than `MAX_SERIES_BINS`
    /// are rejected.
    pub fn generate(
        &mut self,
        active_bin_id: i32,
        bin_step: u16,
        tvl: f64,
        half_width: u32,
    ) -> CoreResult<Vec<Bin>> {
        validate_bin_step(bin_step)?;
        if !tvl.is_finite() || tvl < 0.0 {
            return Err(DlmmError::InvalidPrice);
        }
        if 2 * half_width as u64 + 1 > MAX_SERIES_BINS {
            return Err(DlmmError::InvalidRange);
        }
        let half_width = i32::try_from(half_width).map_err(|_| DlmmError::InvalidRange)?;
        let first = active_bin_id.checked_sub(half_width).ok_or(DlmmError::InvalidRange)?;
        let last = active_bin_id.checked_add(half_width).ok_or(DlmmError::InvalidRange)?;

        let base = tvl * self.params.base_fraction;
        (first..=last)
            .map(|bin_id| -> CoreResult<Bin> {
                let offset = bin_id - active_bin_id;
                let price = price_for_bin(bin_id, bin_step)?;
                let jitter = self.rng.gen_range(self.params.jitter_min..=self.params.jitter_max);
                let decay = (-self.params.decay * offset.unsigned_abs() as f64).exp();
                let liquidity = base * decay * jitter;

                let bin = match offset {
                    o if o < 0 => Bin::new(bin_id, price, liquidity / price, 0.0, false),
                    0 => Bin::new(bin_id, price, liquidity / 2.0 / price, liquidity / 2.0, true),
                    _ => Bin::new(bin_id, price, 0.0, liquidity, false),
                };
                Ok(bin.into_synthetic())
            })
            .collect()
    }
}

/// Authoritative bins from chain reserves, ordered by bin id.
///
/// Only the snapshot's active bin is marked active; if the reserves do not
/// include it, no bin is.
pub fn bins_from_snapshot(
    snapshot: &PoolSnapshot,
    reserves: &[RawBinReserve],
) -> CoreResult<Vec<Bin>> {
    validate_bin_step(snapshot.bin_step)?;

    let mut sorted: Vec<&RawBinReserve> = reserves.iter().collect();
    sorted.sort_by_key(|reserve| reserve.bin_id);
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].bin_id == pair[1].bin_id) {
        return Err(DlmmError::DuplicateBin(pair[0].bin_id));
    }

    sorted
        .into_iter()
        .map(|reserve| -> CoreResult<Bin> {
            let price = price_for_bin(reserve.bin_id, snapshot.bin_step)?;
            Ok(Bin::new(
                reserve.bin_id,
                price,
                reserve.reserve_x,
                reserve.reserve_y,
                reserve.bin_id == snapshot.active_bin_id,
            ))
        })
        .collect()
}

/// Chain bins when there are any, otherwise a synthetic series around the active bin
pub fn series_or_synthetic<R: Rng>(
    snapshot: &PoolSnapshot,
    reserves: &[RawBinReserve],
    tvl: f64,
    half_width: u32,
    generator: &mut BinSeriesGenerator<R>,
) -> CoreResult<Vec<Bin>> {
    if !reserves.is_empty() {
        return bins_from_snapshot(snapshot, reserves);
    }
    debug!(
        "No bin data for pool {}, generating synthetic series",
        snapshot.pool_address
    );
    generator.generate(snapshot.active_bin_id, snapshot.bin_step, tvl, half_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CENTER_BIN_ID;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    fn generator(seed: u64) -> BinSeriesGenerator<StdRng> {
        BinSeriesGenerator::new(SeriesParams::default(), StdRng::seed_from_u64(seed)).unwrap()
    }

    fn reserve(bin_id: i32, reserve_x: f64, reserve_y: f64) -> RawBinReserve {
        RawBinReserve {
            bin_id,
            reserve_x,
            reserve_y,
        }
    }

    fn snapshot() -> PoolSnapshot {
        PoolSnapshot {
            pool_address: "PoolA".to_string(),
            active_bin_id: CENTER_BIN_ID,
            bin_step: 20,
            reserve_x: Decimal::ZERO,
            reserve_y: Decimal::ZERO,
            decimals_x: 9,
            decimals_y: 6,
        }
    }

    #[test]
    fn test_generated_series_shape() {
        let bins = generator(7).generate(CENTER_BIN_ID, 20, 1_000_000.0, 5).unwrap();
        assert_eq!(bins.len(), 11);
        assert_eq!(bins[0].bin_id, CENTER_BIN_ID - 5);
        assert_eq!(bins[10].bin_id, CENTER_BIN_ID + 5);
        assert!(bins.iter().all(|b| b.is_synthetic));

        let active: Vec<&Bin> = bins.iter().filter(|b| b.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].bin_id, CENTER_BIN_ID);

        assert!(bins[..5].iter().all(|b| b.reserve_y == 0.0 && b.reserve_x > 0.0));
        assert!(bins[6..].iter().all(|b| b.reserve_x == 0.0 && b.reserve_y > 0.0));
    }

    #[test]
    fn test_liquidity_stays_within_jitter_bounds() {
        let tvl = 1_000_000.0;
        let bins = generator(11).generate(CENTER_BIN_ID, 20, tvl, 10).unwrap();
        for bin in bins {
            let offset = (bin.bin_id - CENTER_BIN_ID).abs() as f64;
            let envelope = tvl * SERIES_BASE_FRACTION * (-SERIES_DECAY * offset).exp();
            assert!(bin.total_liquidity <= envelope * SERIES_JITTER_MAX * (1.0 + 1e-9));
            assert!(bin.total_liquidity >= envelope * SERIES_JITTER_MIN * (1.0 - 1e-9));
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = generator(42).generate(CENTER_BIN_ID, 10, 5_000.0, 8).unwrap();
        let b = generator(42).generate(CENTER_BIN_ID, 10, 5_000.0, 8).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        let mut generator = generator(1);
        assert_eq!(
            generator.generate(CENTER_BIN_ID, 0, 1.0, 2),
            Err(DlmmError::InvalidBinStep)
        );
        assert_eq!(
            generator.generate(CENTER_BIN_ID, 10, -1.0, 2),
            Err(DlmmError::InvalidPrice)
        );
        assert_eq!(
            generator.generate(i32::MAX, 10, 1.0, 2),
            Err(DlmmError::InvalidRange)
        );

        let params = SeriesParams {
            jitter_min: 2.0,
            ..SeriesParams::default()
        };
        assert!(BinSeriesGenerator::new(params, StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn test_generate_caps_series_width() {
        let mut generator = generator(1);
        let widest = (MAX_SERIES_BINS as u32 - 1) / 2;
        let bins = generator.generate(CENTER_BIN_ID, 1, 1.0, widest).unwrap();
        assert_eq!(bins.len() as u64, 2 * widest as u64 + 1);

        assert_eq!(
            generator.generate(CENTER_BIN_ID, 1, 1.0, widest + 1),
            Err(DlmmError::InvalidRange)
        );
        assert_eq!(
            generator.generate(CENTER_BIN_ID, 1, 1.0, u32::MAX),
            Err(DlmmError::InvalidRange)
        );
    }

    #[test]
    fn test_snapshot_bins_are_authoritative() {
        let reserves = vec![
            reserve(CENTER_BIN_ID + 1, 0.0, 5.0),
            reserve(CENTER_BIN_ID, 1.0, 1.0),
            reserve(CENTER_BIN_ID - 1, 3.0, 0.0),
        ];
        let bins = bins_from_snapshot(&snapshot(), &reserves).unwrap();
        let ids: Vec<i32> = bins.iter().map(|b| b.bin_id).collect();
        assert_eq!(ids, vec![CENTER_BIN_ID - 1, CENTER_BIN_ID, CENTER_BIN_ID + 1]);
        assert!(bins.iter().all(|b| !b.is_synthetic));
        assert_eq!(bins.iter().filter(|b| b.is_active).count(), 1);
        assert_eq!(bins[1].total_liquidity, 2.0);
    }

    #[test]
    fn test_snapshot_duplicates_rejected() {
        let reserves = vec![
            reserve(5, 1.0, 0.0),
            reserve(5, 2.0, 0.0),
        ];
        assert_eq!(
            bins_from_snapshot(&snapshot(), &reserves),
            Err(DlmmError::DuplicateBin(5))
        );
    }

    #[test]
    fn test_fallback_only_without_chain_data() {
        let mut generator = generator(3);
        let synthetic = series_or_synthetic(&snapshot(), &[], 100.0, 2, &mut generator).unwrap();
        assert_eq!(synthetic.len(), 5);
        assert!(synthetic.iter().all(|b| b.is_synthetic));

        let reserves = [reserve(CENTER_BIN_ID, 1.0, 1.0)];
        let real = series_or_synthetic(&snapshot(), &reserves, 100.0, 2, &mut generator).unwrap();
        assert_eq!(real.len(), 1);
        assert!(!real[0].is_synthetic);
    }
}
