//! Price adapter: one capability, "value of this LP position in the market's
//! settlement leg", shared by issuance and settlement.
//!
//! Issuance calls it while the market is open and gets a live valuation;
//! settlement calls it after the price freeze and gets the snapshot. Keeping
//! both on one path is what makes the entry benchmark and the terminal
//! valuation directly comparable.

use crate::market::MarketState;
use crate::oracle::{LpOracle, OracleError, PoolSnapshot, PriceSource, StaticPriceSource};
use crate::types::{AssetId, Price};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct PriceAdapter {
    /// Pass-through base oracle: native-currency prices for plain tokens.
    base: StaticPriceSource,
    /// Fair-value oracle for LP tokens.
    lp: LpOracle,
    /// The network's wrapped native asset. Markets settling in it skip the
    /// cross-division.
    native_asset: AssetId,
}

impl PriceAdapter {
    pub fn new(native_asset: AssetId) -> Self {
        Self {
            base: StaticPriceSource::new(),
            lp: LpOracle::new(),
            native_asset,
        }
    }

    pub fn native_asset(&self) -> AssetId {
        self.native_asset
    }

    pub fn set_native_price(&mut self, asset: AssetId, price: Price) {
        self.base.set_price(asset, price);
    }

    pub fn register_pool(
        &mut self,
        lp_token: AssetId,
        snapshot: PoolSnapshot,
    ) -> Result<(), OracleError> {
        self.lp.register_pool(lp_token, snapshot)
    }

    pub fn pool(&self, lp_token: AssetId) -> Option<&PoolSnapshot> {
        self.lp.snapshot(lp_token)
    }

    /// Price of one LP token in `settlement` units.
    ///
    /// Native settlement takes the LP oracle's price directly. Any other
    /// settlement token cross-divides through the native currency:
    /// lp/settlement = (lp/native) / (settlement/native).
    pub fn lp_token_price(
        &self,
        lp_token: AssetId,
        settlement: AssetId,
    ) -> Result<Price, OracleError> {
        let lp_native = self.lp.lp_price_native(lp_token, &self.base)?;

        if settlement == self.native_asset {
            return Ok(lp_native);
        }

        let settlement_native = self.base.price(settlement)?;
        let cross = lp_native
            .value()
            .checked_div(settlement_native.value())
            .ok_or(OracleError::NumericOverflow)?;

        Price::new(cross).ok_or(OracleError::NumericOverflow)
    }

    /// Value of `lp_amount` LP tokens in the market's settlement leg.
    /// Uses the frozen settlement price when the market has one, otherwise
    /// a live valuation.
    pub fn estimate_value(
        &self,
        market: &MarketState,
        lp_amount: Decimal,
    ) -> Result<Decimal, OracleError> {
        let unit_price = match market.settlement_price() {
            Some(frozen) => frozen,
            None => self.lp_token_price(market.config.lp_token, market.config.token_b)?,
        };

        lp_amount
            .checked_mul(unit_price.value())
            .ok_or(OracleError::NumericOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketConfig;
    use crate::types::{MarketId, Timestamp};
    use rust_decimal_macros::dec;

    const NATIVE: AssetId = AssetId(0);
    const ETH: AssetId = AssetId(1);
    const USDX: AssetId = AssetId(2);
    const LP: AssetId = AssetId(10);

    fn adapter() -> PriceAdapter {
        let mut adapter = PriceAdapter::new(NATIVE);
        adapter.set_native_price(ETH, Price::new_unchecked(dec!(1)));
        adapter.set_native_price(USDX, Price::new_unchecked(dec!(0.0005)));
        // balanced pool: 100 native per leg, 1000 LP supply -> 0.2 native/LP
        adapter
            .register_pool(
                LP,
                PoolSnapshot::new(ETH, USDX, dec!(100), dec!(200_000), dec!(1000)),
            )
            .unwrap();
        adapter
    }

    fn market(settlement: AssetId) -> MarketState {
        MarketState::new(
            MarketConfig {
                id: MarketId(1),
                lp_token: LP,
                token_a: ETH,
                token_b: settlement,
                expiration: Timestamp::from_millis(1_000),
                payment_ratio: dec!(100),
                min_amount: dec!(1),
            },
            Timestamp::from_millis(0),
        )
    }

    fn assert_close(a: Decimal, b: Decimal) {
        assert!((a - b).abs() < dec!(0.000000001), "{a} != {b}");
    }

    #[test]
    fn native_settlement_is_direct() {
        let price = adapter().lp_token_price(LP, NATIVE).unwrap();
        assert_close(price.value(), dec!(0.2));
    }

    #[test]
    fn stable_settlement_cross_divides() {
        // 0.2 native per LP / 0.0005 native per USDX = 400 USDX per LP
        let price = adapter().lp_token_price(LP, USDX).unwrap();
        assert_close(price.value(), dec!(400));
    }

    #[test]
    fn live_estimate_uses_oracle() {
        let value = adapter().estimate_value(&market(USDX), dec!(2.5)).unwrap();
        assert_close(value, dec!(1000));
    }

    #[test]
    fn frozen_price_overrides_live() {
        let adapter = adapter();
        let mut market = market(USDX);
        market.freeze_price(Price::new_unchecked(dec!(300)));

        let value = adapter.estimate_value(&market, dec!(2)).unwrap();
        assert_eq!(value, dec!(600));
    }

    #[test]
    fn missing_settlement_price_fails() {
        let err = adapter().lp_token_price(LP, AssetId(77)).unwrap_err();
        assert_eq!(err, OracleError::UnsupportedAsset(AssetId(77)));
    }
}
