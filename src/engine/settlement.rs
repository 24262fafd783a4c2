//! Settlement: the one-shot price freeze and per-policy resolution.
//!
//! Per market: Open -> Expired (unpriced) -> Closed (price frozen). The
//! Expired->Closed transition runs exactly once, triggered by whichever of
//! close_market / claim / refund arrives first after expiration; everyone
//! after that settles against the same snapshot, so claim ordering never
//! changes the economics, only who pays the triggering cost.

use super::core::Engine;
use super::results::{EngineError, Resolution};
use crate::custody::{Ledger, TransferBatch, VAULT};
use crate::events::{EventPayload, MarketClosedEvent, PolicyResolvedEvent};
use crate::market::{MarketError, MarketPhase, MarketState};
use crate::policy::{Policy, PolicyError};
use crate::pricing::PriceAdapter;
use crate::types::{AccountId, MarketId, PolicyIndex, Price};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

impl Engine {
    /// Force the settlement-price snapshot without resolving any policy.
    /// Callable by anyone once the market has expired; decouples price
    /// discovery from the first claimant's cost.
    pub fn close_market(&mut self, market_id: MarketId) -> Result<Price, EngineError> {
        self.ensure_priced(market_id)
    }

    /// Buyer-side resolution of one policy, addressed by the buyer's local
    /// index. Before expiration this fails unless the engine is configured
    /// to allow early claims.
    pub fn claim(
        &mut self,
        buyer: AccountId,
        market_id: MarketId,
        index: PolicyIndex,
    ) -> Result<Resolution, EngineError> {
        let phase = self.require_market(market_id)?.phase(self.current_time);
        if phase == MarketPhase::Open {
            if self.config.claim_requires_expiry {
                return Err(MarketError::MarketNotExpired(market_id).into());
            }
            // early-claim mode: resolve against the live price, no freeze
        } else {
            self.ensure_priced(market_id)?;
        }

        // direct field borrows: market read-only, policies and ledger mutable
        let market = self
            .markets
            .get(&market_id)
            .ok_or(MarketError::MarketNotFound(market_id))?;
        let policy = self
            .policies
            .for_buyer_mut(market_id, buyer, index)
            .ok_or(PolicyError::PolicyNotFound {
                market: market_id,
                party: buyer,
                index,
            })?;

        let resolution = resolve(market, &self.adapter, &mut self.ledger, policy)?;
        self.emit_resolution(&resolution);
        Ok(resolution)
    }

    /// Seller-side resolution: same split, addressed by the seller's local
    /// index. Only available after expiration.
    pub fn refund(
        &mut self,
        seller: AccountId,
        market_id: MarketId,
        index: PolicyIndex,
    ) -> Result<Resolution, EngineError> {
        let phase = self.require_market(market_id)?.phase(self.current_time);
        if phase == MarketPhase::Open {
            return Err(MarketError::MarketNotExpired(market_id).into());
        }
        self.ensure_priced(market_id)?;

        let market = self
            .markets
            .get(&market_id)
            .ok_or(MarketError::MarketNotFound(market_id))?;
        let policy = self
            .policies
            .for_seller_mut(market_id, seller, index)
            .ok_or(PolicyError::PolicyNotFound {
                market: market_id,
                party: seller,
                index,
            })?;

        let resolution = resolve(market, &self.adapter, &mut self.ledger, policy)?;
        self.emit_resolution(&resolution);
        Ok(resolution)
    }

    /// Freeze the live LP price as the market's permanent settlement price.
    /// Idempotent: once a price is stored, later calls return it unchanged.
    fn ensure_priced(&mut self, market_id: MarketId) -> Result<Price, EngineError> {
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or(MarketError::MarketNotFound(market_id))?;

        match market.phase(self.current_time) {
            MarketPhase::Open => Err(MarketError::MarketNotExpired(market_id).into()),
            MarketPhase::Closed => {
                // settled markets always carry a price
                market
                    .settlement_price()
                    .ok_or_else(|| MarketError::MarketNotExpired(market_id).into())
            }
            MarketPhase::Expired => {
                let live = self
                    .adapter
                    .lp_token_price(market.config.lp_token, market.config.token_b)?;
                let frozen = market.freeze_price(live);
                self.emit_event(EventPayload::MarketClosed(MarketClosedEvent {
                    market_id,
                    settlement_price: frozen,
                }));
                Ok(frozen)
            }
        }
    }

    fn emit_resolution(&mut self, resolution: &Resolution) {
        self.emit_event(EventPayload::PolicyResolved(PolicyResolvedEvent {
            market_id: resolution.market_id,
            buyer: resolution.buyer,
            seller: resolution.seller,
            current_value: resolution.current_value,
            payout: resolution.payout,
            seller_refund: resolution.seller_refund,
            lp_returned: resolution.lp_returned,
        }));
    }
}

/// Resolve one policy against the market's (frozen or, in early-claim mode,
/// live) valuation. One-shot: a resolved policy cannot resolve again.
fn resolve(
    market: &MarketState,
    adapter: &PriceAdapter,
    ledger: &mut Ledger,
    policy: &mut Policy,
) -> Result<Resolution, EngineError> {
    if policy.claimed {
        return Err(PolicyError::AlreadyClaimed.into());
    }

    let current_value = adapter.estimate_value(market, policy.lp_amount)?;

    let (loss, covered_loss, payout) = if current_value < policy.lp_value {
        let loss = policy.lp_value - current_value;
        // loss <= lp_value and payment_ratio <= 100, inside Decimal range
        let covered = loss * market.config.payment_ratio / dec!(100);
        (loss, covered, covered.min(policy.staked_amount))
    } else {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    };
    let seller_refund = policy.staked_amount - payout;

    let token_b = market.config.token_b;
    let mut batch = TransferBatch::new();
    batch.add(token_b, VAULT, policy.buyer, payout);
    batch.add(token_b, VAULT, policy.seller, seller_refund);
    batch.add(market.config.lp_token, VAULT, policy.buyer, policy.lp_amount);

    // the claimed flag flips before funds move; if the batch aborts, the flag
    // rolls back so the whole call is a no-op
    policy.claimed = true;
    if let Err(e) = ledger.execute(&batch) {
        policy.claimed = false;
        return Err(e.into());
    }

    Ok(Resolution {
        market_id: market.config.id,
        buyer: policy.buyer,
        seller: policy.seller,
        current_value,
        loss,
        covered_loss,
        payout,
        seller_refund,
        lp_returned: policy.lp_amount,
    })
}
