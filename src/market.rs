//! Market configuration and lifecycle.
//!
//! A market insures one LP position type: collateral pair, expiration,
//! covered-loss ratio, minimum order size. Configuration is immutable after
//! creation; the only derived mutable field is the frozen settlement price.

use crate::types::{AssetId, MarketId, Price, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle phase, derived from (now, expiration, stored price) rather than
/// scattered timestamp comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketPhase {
    /// Trading and coverage issuance allowed.
    Open,
    /// Past expiration, settlement price not yet frozen.
    Expired,
    /// Settlement price frozen; policies resolve against it.
    Closed,
}

/// Static market configuration (immutable after creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub id: MarketId,
    /// The insured LP token.
    pub lp_token: AssetId,
    /// Volatile leg of the pair.
    pub token_a: AssetId,
    /// Settlement leg: always a designated stable asset or the native-wrapped
    /// asset. Collateral, premiums and payouts all move in this token.
    pub token_b: AssetId,
    /// Coverage ends here; claims and refunds settle against the price frozen
    /// at or after this instant.
    pub expiration: Timestamp,
    /// Percent of the measured loss the seller's collateral covers, base 100.
    pub payment_ratio: Decimal,
    /// Minimum order / purchase amount in token_b units.
    pub min_amount: Decimal,
}

impl MarketConfig {
    pub fn validate_amount(&self, amount: Decimal) -> Result<(), MarketError> {
        if amount < self.min_amount {
            return Err(MarketError::BelowMinimum {
                amount,
                minimum: self.min_amount,
            });
        }
        Ok(())
    }
}

/// Market runtime state: config plus the settle-once price snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketState {
    pub config: MarketConfig,
    /// Set exactly once by the first close-triggering call after expiration.
    /// The single source of truth for every policy's terminal valuation.
    settlement_price: Option<Price>,
    pub created_at: Timestamp,
}

impl MarketState {
    pub fn new(config: MarketConfig, created_at: Timestamp) -> Self {
        Self {
            config,
            settlement_price: None,
            created_at,
        }
    }

    pub fn phase(&self, now: Timestamp) -> MarketPhase {
        if self.settlement_price.is_some() {
            MarketPhase::Closed
        } else if now < self.config.expiration {
            MarketPhase::Open
        } else {
            MarketPhase::Expired
        }
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        self.phase(now) == MarketPhase::Open
    }

    pub fn settlement_price(&self) -> Option<Price> {
        self.settlement_price
    }

    /// Store the settlement snapshot. First write wins; later calls keep the
    /// original price (idempotent snapshot).
    pub fn freeze_price(&mut self, price: Price) -> Price {
        *self.settlement_price.get_or_insert(price)
    }
}

/// Split an LP pair into (volatile leg, settlement leg). Exactly one of the
/// two tokens must be a designated stable or the native-wrapped asset.
pub fn resolve_settlement_leg(
    token0: AssetId,
    token1: AssetId,
    stables: &HashSet<AssetId>,
    native_asset: AssetId,
) -> Result<(AssetId, AssetId), MarketError> {
    let qualifies = |t: AssetId| t == native_asset || stables.contains(&t);

    match (qualifies(token0), qualifies(token1)) {
        (true, false) => Ok((token1, token0)),
        (false, true) => Ok((token0, token1)),
        (false, false) => Err(MarketError::NoSettlementLeg { token0, token1 }),
        (true, true) => Err(MarketError::AmbiguousSettlementLeg { token0, token1 }),
    }
}

/// Valid payment ratios are (0, 100] percent.
pub fn validate_payment_ratio(ratio: Decimal) -> Result<(), MarketError> {
    if ratio <= Decimal::ZERO || ratio > dec!(100) {
        return Err(MarketError::InvalidPaymentRatio(ratio));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("Market {0:?} not found")]
    MarketNotFound(MarketId),

    #[error("Market {0:?} has expired")]
    MarketExpired(MarketId),

    #[error("Market {0:?} has not expired yet")]
    MarketNotExpired(MarketId),

    #[error("Amount {amount} below minimum {minimum}")]
    BelowMinimum { amount: Decimal, minimum: Decimal },

    #[error("Neither {token0:?} nor {token1:?} is a stable or native asset")]
    NoSettlementLeg { token0: AssetId, token1: AssetId },

    #[error("Both {token0:?} and {token1:?} qualify as settlement leg")]
    AmbiguousSettlementLeg { token0: AssetId, token1: AssetId },

    #[error("Payment ratio {0} outside (0, 100]")]
    InvalidPaymentRatio(Decimal),

    #[error("Minimum amount {0} must not be negative")]
    InvalidMinimum(Decimal),
}
