// 8.1: main engine struct. all state lives here: market table, order book,
// policy arena, custody ledger, price adapter, event log.

use super::results::EngineError;
use crate::config::EngineConfig;
use crate::custody::{Ledger, VAULT};
use crate::events::{Event, EventId, EventPayload, MarketCreatedEvent};
use crate::market::{
    resolve_settlement_leg, validate_payment_ratio, MarketConfig, MarketError, MarketPhase,
    MarketState,
};
use crate::oracle::{OracleError, PoolSnapshot};
use crate::order::{Order, OrderBook};
use crate::policy::{Policy, PolicyLedger};
use crate::pricing::PriceAdapter;
use crate::rewards::{NoopRewards, RewardHook};
use crate::types::{AccountId, AssetId, Bps, MarketId, PolicyIndex, Price, Timestamp};
use rust_decimal::Decimal;
use std::collections::HashSet;

#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) stables: HashSet<AssetId>,
    pub(super) markets: std::collections::HashMap<MarketId, MarketState>,
    pub(super) book: OrderBook,
    pub(super) policies: PolicyLedger,
    pub(super) ledger: Ledger,
    pub(super) adapter: PriceAdapter,
    pub(super) rewards: Box<dyn RewardHook>,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) next_market_id: u32,
    pub(super) next_account_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let stables = config.stable_assets.iter().copied().collect();
        let adapter = PriceAdapter::new(config.native_asset);
        Self {
            config,
            stables,
            markets: std::collections::HashMap::new(),
            book: OrderBook::new(),
            policies: PolicyLedger::new(),
            ledger: Ledger::new(),
            adapter,
            rewards: Box::new(NoopRewards),
            events: Vec::new(),
            next_event_id: 1,
            next_market_id: 1,
            // account 0 is the vault
            next_account_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    // -- clock ------------------------------------------------------------

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    // -- accounts and balances --------------------------------------------

    pub fn create_account(&mut self) -> AccountId {
        let id = AccountId(self.next_account_id);
        self.next_account_id += 1;
        id
    }

    /// Test/simulation faucet. Real balances would arrive through external
    /// token transfers.
    pub fn fund(&mut self, account: AccountId, asset: AssetId, amount: Decimal) {
        self.ledger.mint(asset, account, amount);
    }

    pub fn balance(&self, asset: AssetId, account: AccountId) -> Decimal {
        self.ledger.balance(asset, account)
    }

    /// Everything the engine custodies in one asset.
    pub fn vault_balance(&self, asset: AssetId) -> Decimal {
        self.ledger.balance(asset, VAULT)
    }

    // -- oracle surface ----------------------------------------------------

    pub fn set_native_price(&mut self, asset: AssetId, price: Price) {
        self.adapter.set_native_price(asset, price);
    }

    pub fn register_pool(
        &mut self,
        lp_token: AssetId,
        snapshot: PoolSnapshot,
    ) -> Result<(), EngineError> {
        self.adapter.register_pool(lp_token, snapshot)?;
        Ok(())
    }

    // -- market registry ---------------------------------------------------

    /// Create a market insuring `lp_token`. The pool must be registered
    /// first; its pair determines the volatile and settlement legs.
    pub fn add_market(
        &mut self,
        lp_token: AssetId,
        expiration: Timestamp,
        payment_ratio: Decimal,
        min_amount: Decimal,
    ) -> Result<MarketId, EngineError> {
        validate_payment_ratio(payment_ratio)?;
        if min_amount < Decimal::ZERO {
            return Err(MarketError::InvalidMinimum(min_amount).into());
        }

        let pool = self
            .adapter
            .pool(lp_token)
            .ok_or(OracleError::UnknownPool(lp_token))?;
        let (token_a, token_b) = resolve_settlement_leg(
            pool.token0,
            pool.token1,
            &self.stables,
            self.config.native_asset,
        )?;

        let id = MarketId(self.next_market_id);
        self.next_market_id += 1;

        let config = MarketConfig {
            id,
            lp_token,
            token_a,
            token_b,
            expiration,
            payment_ratio,
            min_amount,
        };
        self.markets
            .insert(id, MarketState::new(config.clone(), self.current_time));

        self.emit_event(EventPayload::MarketCreated(MarketCreatedEvent {
            market_id: id,
            lp_token,
            token_a,
            token_b,
            expiration,
            payment_ratio,
            min_amount,
        }));

        Ok(id)
    }

    pub fn market(&self, market_id: MarketId) -> Option<&MarketState> {
        self.markets.get(&market_id)
    }

    pub fn market_phase(&self, market_id: MarketId) -> Result<MarketPhase, EngineError> {
        Ok(self.require_market(market_id)?.phase(self.current_time))
    }

    pub(super) fn require_market(&self, market_id: MarketId) -> Result<&MarketState, EngineError> {
        self.markets
            .get(&market_id)
            .ok_or_else(|| MarketError::MarketNotFound(market_id).into())
    }

    // -- queries -----------------------------------------------------------

    pub fn orders(&self, market_id: MarketId, seller: AccountId) -> &[Order] {
        self.book.orders_for(market_id, seller)
    }

    pub fn seller_open_amount(&self, market_id: MarketId, seller: AccountId) -> Decimal {
        self.book.live_amount(market_id, seller)
    }

    pub fn market_open_amount(&self, market_id: MarketId) -> Decimal {
        self.book.market_live_amount(market_id)
    }

    pub fn buyer_policy(
        &self,
        market_id: MarketId,
        buyer: AccountId,
        index: PolicyIndex,
    ) -> Option<&Policy> {
        self.policies.for_buyer(market_id, buyer, index)
    }

    pub fn seller_policy(
        &self,
        market_id: MarketId,
        seller: AccountId,
        index: PolicyIndex,
    ) -> Option<&Policy> {
        self.policies.for_seller(market_id, seller, index)
    }

    pub fn buyer_policy_count(&self, market_id: MarketId, buyer: AccountId) -> usize {
        self.policies.buyer_count(market_id, buyer)
    }

    pub fn seller_policy_count(&self, market_id: MarketId, seller: AccountId) -> usize {
        self.policies.seller_count(market_id, seller)
    }

    /// Staked collateral locked in unresolved policies of a market.
    pub fn unresolved_staked(&self, market_id: MarketId) -> Decimal {
        self.policies.unresolved_staked(market_id)
    }

    // -- administrative surface --------------------------------------------

    /// Set the platform fee rate. The new rate is validated, not the old one.
    pub fn set_fee_rate(&mut self, rate: Bps) -> Result<(), EngineError> {
        if rate.value() < 0 || rate >= Bps::one() {
            return Err(EngineError::InvalidFeeRate(rate));
        }
        self.config.fee_rate = rate;
        Ok(())
    }

    pub fn set_fee_recipient(&mut self, recipient: Option<AccountId>) {
        self.config.fee_recipient = recipient;
    }

    pub fn allow_stable(&mut self, asset: AssetId) {
        self.stables.insert(asset);
    }

    pub fn revoke_stable(&mut self, asset: AssetId) {
        self.stables.remove(&asset);
    }

    pub fn set_claim_requires_expiry(&mut self, required: bool) {
        self.config.claim_requires_expiry = required;
    }

    pub fn set_reward_hook(&mut self, hook: Box<dyn RewardHook>) {
        self.rewards = hook;
    }

    // -- events ------------------------------------------------------------

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
