// 11.0: every state change produces an event. used for audit trails, state
// reconstruction, and notifying external systems. the EventPayload enum lists
// all event types.

use crate::types::{AccountId, AssetId, Bps, MarketId, OrderIndex, Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // market lifecycle
    MarketCreated(MarketCreatedEvent),
    MarketClosed(MarketClosedEvent),

    // seller side
    OrderPlaced(OrderPlacedEvent),
    OrderAmended(OrderAmendedEvent),

    // buyer side
    PolicyIssued(PolicyIssuedEvent),
    PolicyResolved(PolicyResolvedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCreatedEvent {
    pub market_id: MarketId,
    pub lp_token: AssetId,
    pub token_a: AssetId,
    pub token_b: AssetId,
    pub expiration: Timestamp,
    pub payment_ratio: Decimal,
    pub min_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketClosedEvent {
    pub market_id: MarketId,
    pub settlement_price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub market_id: MarketId,
    pub seller: AccountId,
    pub index: OrderIndex,
    pub rate: Bps,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAmendedEvent {
    pub market_id: MarketId,
    pub seller: AccountId,
    pub index: OrderIndex,
    pub old_amount: Decimal,
    pub new_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyIssuedEvent {
    pub market_id: MarketId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub order_index: OrderIndex,
    pub staked_amount: Decimal,
    pub lp_amount: Decimal,
    pub lp_value: Decimal,
    pub premium: Decimal,
    pub fee: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResolvedEvent {
    pub market_id: MarketId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub current_value: Decimal,
    pub payout: Decimal,
    pub seller_refund: Decimal,
    pub lp_returned: Decimal,
}
