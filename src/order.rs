//! Seller order storage.
//!
//! Orders are open collateral offers: a premium rate and a remaining amount of
//! the settlement token. They live in an append-only-by-index vector per
//! (market, seller). Cancellation zeroes the amount and never removes the
//! slot, so an index handed to a buyer stays valid forever.

use crate::types::{AccountId, Bps, MarketId, OrderIndex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A seller's open offer to underwrite coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Premium per unit of staked amount, basis-point scale.
    pub rate: Bps,
    /// Remaining collateral on offer, in the market's settlement token.
    pub amount: Decimal,
}

impl Order {
    pub fn new(rate: Bps, amount: Decimal) -> Self {
        Self { rate, amount }
    }

    pub fn is_live(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order {index:?} of seller {seller:?} in market {market:?} not found")]
    OrderNotFound {
        market: MarketId,
        seller: AccountId,
        index: OrderIndex,
    },

    #[error("Order has {remaining} remaining, {requested} requested")]
    InsufficientLiquidity {
        remaining: Decimal,
        requested: Decimal,
    },
}

/// All sellers' order lists, keyed by (market, seller).
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: HashMap<(MarketId, AccountId), Vec<Order>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new order, returning its stable per-seller index.
    pub fn append(&mut self, market: MarketId, seller: AccountId, order: Order) -> OrderIndex {
        let list = self.orders.entry((market, seller)).or_default();
        list.push(order);
        OrderIndex(list.len() as u32 - 1)
    }

    pub fn get(&self, market: MarketId, seller: AccountId, index: OrderIndex) -> Option<&Order> {
        self.orders
            .get(&(market, seller))
            .and_then(|list| list.get(index.0 as usize))
    }

    pub fn get_mut(
        &mut self,
        market: MarketId,
        seller: AccountId,
        index: OrderIndex,
    ) -> Option<&mut Order> {
        self.orders
            .get_mut(&(market, seller))
            .and_then(|list| list.get_mut(index.0 as usize))
    }

    /// A seller's full order list for a market, canceled slots included.
    pub fn orders_for(&self, market: MarketId, seller: AccountId) -> &[Order] {
        self.orders
            .get(&(market, seller))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of a seller's live order amounts in a market.
    pub fn live_amount(&self, market: MarketId, seller: AccountId) -> Decimal {
        self.orders_for(market, seller)
            .iter()
            .map(|o| o.amount)
            .sum()
    }

    /// Sum of all live order amounts across sellers in a market. Feeds the
    /// collateral-conservation invariant.
    pub fn market_live_amount(&self, market: MarketId) -> Decimal {
        self.orders
            .iter()
            .filter(|((m, _), _)| *m == market)
            .flat_map(|(_, list)| list.iter())
            .map(|o| o.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MKT: MarketId = MarketId(1);
    const SELLER: AccountId = AccountId(7);

    #[test]
    fn indices_are_monotonic_per_seller() {
        let mut book = OrderBook::new();

        let a = book.append(MKT, SELLER, Order::new(Bps::new(100), dec!(500)));
        let b = book.append(MKT, SELLER, Order::new(Bps::new(200), dec!(300)));
        let other = book.append(MKT, AccountId(8), Order::new(Bps::new(50), dec!(100)));

        assert_eq!(a, OrderIndex(0));
        assert_eq!(b, OrderIndex(1));
        // independent sequence per seller
        assert_eq!(other, OrderIndex(0));
    }

    #[test]
    fn canceled_slot_stays_addressable() {
        let mut book = OrderBook::new();
        book.append(MKT, SELLER, Order::new(Bps::new(100), dec!(500)));
        let second = book.append(MKT, SELLER, Order::new(Bps::new(200), dec!(300)));

        book.get_mut(MKT, SELLER, OrderIndex(0)).unwrap().amount = Decimal::ZERO;

        assert!(!book.get(MKT, SELLER, OrderIndex(0)).unwrap().is_live());
        // the later order keeps its index
        assert_eq!(second, OrderIndex(1));
        assert_eq!(
            book.get(MKT, SELLER, OrderIndex(1)).unwrap().amount,
            dec!(300)
        );
    }

    #[test]
    fn live_totals() {
        let mut book = OrderBook::new();
        book.append(MKT, SELLER, Order::new(Bps::new(100), dec!(500)));
        book.append(MKT, SELLER, Order::new(Bps::new(200), dec!(300)));
        book.append(MKT, AccountId(8), Order::new(Bps::new(50), dec!(100)));
        book.append(MarketId(2), SELLER, Order::new(Bps::new(50), dec!(999)));

        assert_eq!(book.live_amount(MKT, SELLER), dec!(800));
        assert_eq!(book.market_live_amount(MKT), dec!(900));
    }

    #[test]
    fn missing_order_is_none() {
        let book = OrderBook::new();
        assert!(book.get(MKT, SELLER, OrderIndex(0)).is_none());
        assert_eq!(book.live_amount(MKT, SELLER), dec!(0));
    }
}
