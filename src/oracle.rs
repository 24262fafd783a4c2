// 9.0 oracle.rs: price sources. the base feed is MOCKED (an in-memory table,
// would be a chain oracle in prod); the LP fair-value math is real.
//
// The engine is agnostic to where native-currency prices come from. Anything
// that can answer "one unit of asset X is worth P native" implements
// PriceSource. The LP oracle layers the manipulation-resistant fair-reserves
// valuation on top of such a source.

use crate::types::{AssetId, Price};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query-only price capability: value of one unit of `asset` in the native
/// reference currency. Fails on unsupported assets.
pub trait PriceSource {
    fn price(&self, asset: AssetId) -> Result<Price, OracleError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("No price available for asset {0:?}")]
    UnsupportedAsset(AssetId),

    #[error("No pool registered for LP token {0:?}")]
    UnknownPool(AssetId),

    #[error("Pool for LP token {0:?} has zero supply or reserves")]
    EmptyPool(AssetId),

    #[error("Price arithmetic overflowed")]
    NumericOverflow,
}

/// In-memory pass-through price table. Stands in for the external base oracle;
/// simulations and tests push prices in, the engine only ever reads.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<AssetId, Price>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, asset: AssetId, price: Price) {
        self.prices.insert(asset, price);
    }
}

impl PriceSource for StaticPriceSource {
    fn price(&self, asset: AssetId) -> Result<Price, OracleError> {
        self.prices
            .get(&asset)
            .copied()
            .ok_or(OracleError::UnsupportedAsset(asset))
    }
}

/// One observation of a two-asset pool backing an LP token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub token0: AssetId,
    pub token1: AssetId,
    pub reserve0: Decimal,
    pub reserve1: Decimal,
    pub total_supply: Decimal,
}

impl PoolSnapshot {
    pub fn new(
        token0: AssetId,
        token1: AssetId,
        reserve0: Decimal,
        reserve1: Decimal,
        total_supply: Decimal,
    ) -> Self {
        Self {
            token0,
            token1,
            reserve0,
            reserve1,
            total_supply,
        }
    }
}

/// Fair unit price of an LP token: `2 * sqrt(r0 * p0) * sqrt(r1 * p1) / S`.
///
/// This is the geometric-mean "fair reserves" valuation, not the naive
/// `(r0*p0 + r1*p1) / S`. The naive form is exploitable by a single-block
/// reserve skew; the geometric mean is invariant under constant-product skews
/// because it only sees `r0 * r1`. Multiplying reserve by price before the
/// square root keeps each intermediate at the scale of half the pool's value,
/// well inside Decimal range for realistic pools.
pub fn fair_lp_unit_price(
    reserve0: Decimal,
    price0: Price,
    reserve1: Decimal,
    price1: Price,
    total_supply: Decimal,
) -> Result<Decimal, OracleError> {
    let leg0 = reserve0
        .checked_mul(price0.value())
        .ok_or(OracleError::NumericOverflow)?;
    let leg1 = reserve1
        .checked_mul(price1.value())
        .ok_or(OracleError::NumericOverflow)?;

    // sqrt is None only for negative inputs, which validated pools exclude
    let root0 = leg0.sqrt().ok_or(OracleError::NumericOverflow)?;
    let root1 = leg1.sqrt().ok_or(OracleError::NumericOverflow)?;

    let geometric = root0
        .checked_mul(root1)
        .ok_or(OracleError::NumericOverflow)?;

    geometric
        .checked_mul(dec!(2))
        .and_then(|v| v.checked_div(total_supply))
        .ok_or(OracleError::NumericOverflow)
}

/// Derives native-currency LP token prices from registered pool snapshots and
/// a base price source for the underlying assets.
#[derive(Debug, Clone, Default)]
pub struct LpOracle {
    pools: HashMap<AssetId, PoolSnapshot>,
}

impl LpOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or refresh the pool backing `lp_token`. Rejects empty pools
    /// up front so the pricing path never divides by zero.
    pub fn register_pool(
        &mut self,
        lp_token: AssetId,
        snapshot: PoolSnapshot,
    ) -> Result<(), OracleError> {
        if snapshot.total_supply <= Decimal::ZERO
            || snapshot.reserve0 < Decimal::ZERO
            || snapshot.reserve1 < Decimal::ZERO
        {
            return Err(OracleError::EmptyPool(lp_token));
        }
        self.pools.insert(lp_token, snapshot);
        Ok(())
    }

    pub fn snapshot(&self, lp_token: AssetId) -> Option<&PoolSnapshot> {
        self.pools.get(&lp_token)
    }

    /// Native-currency price of one LP token.
    pub fn lp_price_native(
        &self,
        lp_token: AssetId,
        source: &dyn PriceSource,
    ) -> Result<Price, OracleError> {
        let pool = self
            .pools
            .get(&lp_token)
            .ok_or(OracleError::UnknownPool(lp_token))?;

        let price0 = source.price(pool.token0)?;
        let price1 = source.price(pool.token1)?;

        let unit = fair_lp_unit_price(
            pool.reserve0,
            price0,
            pool.reserve1,
            price1,
            pool.total_supply,
        )?;

        Price::new(unit).ok_or(OracleError::EmptyPool(lp_token))
    }
}
