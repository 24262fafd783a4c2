//! Buyer-seller matching: consume an order, escrow the buyer's LP stake,
//! benchmark it at the live price, and issue a policy.
//!
//! One call buys from exactly one order. A larger position than one order
//! offers takes multiple calls, each producing its own policy.

use super::core::Engine;
use super::results::{EngineError, PolicyReceipt};
use crate::custody::{TransferBatch, VAULT};
use crate::events::{EventPayload, PolicyIssuedEvent};
use crate::market::{MarketError, MarketPhase};
use crate::order::OrderError;
use crate::policy::Policy;
use crate::rewards::PolicyNotice;
use crate::types::{AccountId, MarketId, OrderIndex};
use rust_decimal::Decimal;

impl Engine {
    /// Buy `amount` of coverage from one of `seller`'s orders, staking
    /// `lp_amount` LP tokens as the insured position.
    ///
    /// Atomic: premium transfer (net of platform fee), fee routing, LP escrow
    /// and the order decrement all land together or not at all.
    pub fn buy(
        &mut self,
        buyer: AccountId,
        market_id: MarketId,
        seller: AccountId,
        order_index: OrderIndex,
        amount: Decimal,
        lp_amount: Decimal,
    ) -> Result<PolicyReceipt, EngineError> {
        let market = self.require_market(market_id)?;
        if market.phase(self.current_time) != MarketPhase::Open {
            return Err(MarketError::MarketExpired(market_id).into());
        }
        // a zero-minimum market would otherwise admit a zero-stake policy
        // spawned from a canceled order
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidCoverageAmount);
        }
        market.config.validate_amount(amount)?;
        if lp_amount <= Decimal::ZERO {
            return Err(EngineError::InvalidLpAmount);
        }

        let token_b = market.config.token_b;
        let lp_token = market.config.lp_token;

        let order = self
            .book
            .get(market_id, seller, order_index)
            .ok_or(OrderError::OrderNotFound {
                market: market_id,
                seller,
                index: order_index,
            })?;
        if amount > order.amount {
            return Err(OrderError::InsufficientLiquidity {
                remaining: order.amount,
                requested: amount,
            }
            .into());
        }
        let rate = order.rate;

        // escrow-bounded operands times bps fractions, far inside Decimal range
        let premium = amount * rate.as_fraction();
        // no fee sink configured means the seller keeps the full premium
        let fee = match self.config.fee_recipient {
            Some(_) => premium * self.config.fee_rate.as_fraction(),
            None => Decimal::ZERO,
        };

        // entry benchmark: live valuation of the staked LP position
        let lp_value = self.adapter.estimate_value(market, lp_amount)?;

        let mut batch = TransferBatch::new();
        batch.add(token_b, buyer, seller, premium - fee);
        if let Some(recipient) = self.config.fee_recipient {
            batch.add(token_b, buyer, recipient, fee);
        }
        batch.add(lp_token, buyer, VAULT, lp_amount);
        self.ledger.execute(&batch)?;

        // transfers cleared; the remaining mutations cannot fail
        self.book
            .get_mut(market_id, seller, order_index)
            .ok_or(OrderError::OrderNotFound {
                market: market_id,
                seller,
                index: order_index,
            })?
            .amount -= amount;

        let (buyer_index, seller_index) = self.policies.issue(Policy {
            market_id,
            buyer,
            seller,
            premium,
            staked_amount: amount,
            lp_amount,
            lp_value,
            claimed: false,
        });

        self.rewards.on_policy_issued(&PolicyNotice {
            market_id,
            buyer,
            seller,
            staked_amount: amount,
            premium,
        });

        self.emit_event(EventPayload::PolicyIssued(PolicyIssuedEvent {
            market_id,
            buyer,
            seller,
            order_index,
            staked_amount: amount,
            lp_amount,
            lp_value,
            premium,
            fee,
        }));

        Ok(PolicyReceipt {
            market_id,
            seller,
            order_index,
            buyer_index,
            seller_index,
            staked_amount: amount,
            lp_amount,
            lp_value,
            premium,
            fee,
        })
    }
}
