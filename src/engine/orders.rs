//! Seller order management: place and amend-or-cancel, with collateral escrow.
//!
//! Escrow discipline: a seller's vault collateral always equals the sum of
//! their live order amounts plus unresolved policy stakes. Every path here
//! moves tokens and mutates the book in one all-or-nothing step: the batch
//! executes first, and only then is the book touched.

use super::core::Engine;
use super::results::EngineError;
use crate::custody::{CustodyError, TransferBatch, VAULT};
use crate::events::{EventPayload, OrderAmendedEvent, OrderPlacedEvent};
use crate::market::{MarketError, MarketPhase};
use crate::order::{Order, OrderError};
use crate::types::{AccountId, Bps, MarketId, OrderIndex};
use rust_decimal::Decimal;

impl Engine {
    /// Open a collateral offer: escrow `amount` of the settlement token and
    /// append an order at `rate`. Returns the order's stable per-seller index.
    pub fn place_order(
        &mut self,
        seller: AccountId,
        market_id: MarketId,
        rate: Bps,
        amount: Decimal,
    ) -> Result<OrderIndex, EngineError> {
        if rate.value() < 0 {
            return Err(EngineError::InvalidRate(rate));
        }

        let market = self.require_market(market_id)?;
        if market.phase(self.current_time) != MarketPhase::Open {
            return Err(MarketError::MarketExpired(market_id).into());
        }
        market.config.validate_amount(amount)?;
        let token_b = market.config.token_b;

        let mut batch = TransferBatch::new();
        batch.add(token_b, seller, VAULT, amount);
        self.ledger.execute(&batch)?;

        let index = self.book.append(market_id, seller, Order::new(rate, amount));

        self.emit_event(EventPayload::OrderPlaced(OrderPlacedEvent {
            market_id,
            seller,
            index,
            rate,
            amount,
        }));

        Ok(index)
    }

    /// Change an order's remaining amount, adjusting escrow by the delta.
    /// `new_amount == 0` is a cancel and stays allowed after expiration;
    /// any positive amount requires an open market and the market minimum.
    /// Setting the current amount again is a no-op.
    pub fn amend_order(
        &mut self,
        seller: AccountId,
        market_id: MarketId,
        index: OrderIndex,
        new_amount: Decimal,
    ) -> Result<(), EngineError> {
        if new_amount < Decimal::ZERO {
            return Err(CustodyError::NegativeAmount.into());
        }

        let market = self.require_market(market_id)?;
        let token_b = market.config.token_b;
        let phase = market.phase(self.current_time);

        if new_amount > Decimal::ZERO {
            if phase != MarketPhase::Open {
                return Err(MarketError::MarketExpired(market_id).into());
            }
            market.config.validate_amount(new_amount)?;
        }

        let old_amount = self
            .book
            .get(market_id, seller, index)
            .ok_or(OrderError::OrderNotFound {
                market: market_id,
                seller,
                index,
            })?
            .amount;

        if new_amount == old_amount {
            return Ok(());
        }

        let mut batch = TransferBatch::new();
        if new_amount > old_amount {
            batch.add(token_b, seller, VAULT, new_amount - old_amount);
        } else {
            batch.add(token_b, VAULT, seller, old_amount - new_amount);
        }
        self.ledger.execute(&batch)?;

        // safe: looked up above
        self.book
            .get_mut(market_id, seller, index)
            .ok_or(OrderError::OrderNotFound {
                market: market_id,
                seller,
                index,
            })?
            .amount = new_amount;

        self.emit_event(EventPayload::OrderAmended(OrderAmendedEvent {
            market_id,
            seller,
            index,
            old_amount,
            new_amount,
        }));

        Ok(())
    }

    /// Cancel an order: amend to zero. The slot stays addressable forever.
    pub fn cancel_order(
        &mut self,
        seller: AccountId,
        market_id: MarketId,
        index: OrderIndex,
    ) -> Result<(), EngineError> {
        self.amend_order(seller, market_id, index, Decimal::ZERO)
    }
}
