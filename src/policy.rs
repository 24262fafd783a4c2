//! Policy ledger: the matched coverage contracts.
//!
//! Policies live in one global append-only arena. Buyers and sellers each get
//! an ordered list of local indices mapping to arena slots, so lookups are
//! O(1) and callers only ever see their own local numbering. Raw arena slots
//! never leave this module.

use crate::types::{AccountId, MarketId, PolicyIndex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A matched buyer/seller coverage contract. Immutable once issued except for
/// the one-shot `claimed` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub market_id: MarketId,
    pub buyer: AccountId,
    pub seller: AccountId,
    /// Premium the buyer paid at issuance, settlement-token units.
    pub premium: Decimal,
    /// Seller collateral backing this policy; the payout ceiling.
    pub staked_amount: Decimal,
    /// LP tokens the buyer escrowed.
    pub lp_amount: Decimal,
    /// Settlement-token valuation of lp_amount at issuance. The entry
    /// benchmark loss is measured against.
    pub lp_value: Decimal,
    /// false -> true exactly once, at resolution.
    pub claimed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Policy {index:?} of {party:?} in market {market:?} not found")]
    PolicyNotFound {
        market: MarketId,
        party: AccountId,
        index: PolicyIndex,
    },

    #[error("Policy already claimed")]
    AlreadyClaimed,
}

/// Global policy arena plus per-party local index lists.
#[derive(Debug, Clone, Default)]
pub struct PolicyLedger {
    policies: Vec<Policy>,
    buyer_index: HashMap<(MarketId, AccountId), Vec<usize>>,
    seller_index: HashMap<(MarketId, AccountId), Vec<usize>>,
}

impl PolicyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy, wiring both parties' local index lists. Returns the
    /// buyer's and seller's local indices for the new policy.
    pub fn issue(&mut self, policy: Policy) -> (PolicyIndex, PolicyIndex) {
        let slot = self.policies.len();
        let market = policy.market_id;
        let buyer = policy.buyer;
        let seller = policy.seller;
        self.policies.push(policy);

        let buyer_list = self.buyer_index.entry((market, buyer)).or_default();
        buyer_list.push(slot);
        let buyer_local = PolicyIndex(buyer_list.len() as u32 - 1);

        let seller_list = self.seller_index.entry((market, seller)).or_default();
        seller_list.push(slot);
        let seller_local = PolicyIndex(seller_list.len() as u32 - 1);

        (buyer_local, seller_local)
    }

    fn slot(
        index: &HashMap<(MarketId, AccountId), Vec<usize>>,
        market: MarketId,
        party: AccountId,
        local: PolicyIndex,
    ) -> Option<usize> {
        index
            .get(&(market, party))
            .and_then(|list| list.get(local.0 as usize))
            .copied()
    }

    pub fn for_buyer(
        &self,
        market: MarketId,
        buyer: AccountId,
        local: PolicyIndex,
    ) -> Option<&Policy> {
        Self::slot(&self.buyer_index, market, buyer, local).map(|s| &self.policies[s])
    }

    pub fn for_buyer_mut(
        &mut self,
        market: MarketId,
        buyer: AccountId,
        local: PolicyIndex,
    ) -> Option<&mut Policy> {
        Self::slot(&self.buyer_index, market, buyer, local).map(move |s| &mut self.policies[s])
    }

    pub fn for_seller(
        &self,
        market: MarketId,
        seller: AccountId,
        local: PolicyIndex,
    ) -> Option<&Policy> {
        Self::slot(&self.seller_index, market, seller, local).map(|s| &self.policies[s])
    }

    pub fn for_seller_mut(
        &mut self,
        market: MarketId,
        seller: AccountId,
        local: PolicyIndex,
    ) -> Option<&mut Policy> {
        Self::slot(&self.seller_index, market, seller, local).map(move |s| &mut self.policies[s])
    }

    pub fn buyer_count(&self, market: MarketId, buyer: AccountId) -> usize {
        self.buyer_index
            .get(&(market, buyer))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn seller_count(&self, market: MarketId, seller: AccountId) -> usize {
        self.seller_index
            .get(&(market, seller))
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Staked collateral still locked in unresolved policies of a market.
    /// Feeds the collateral-conservation invariant.
    pub fn unresolved_staked(&self, market: MarketId) -> Decimal {
        self.policies
            .iter()
            .filter(|p| p.market_id == market && !p.claimed)
            .map(|p| p.staked_amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MKT: MarketId = MarketId(1);
    const BUYER: AccountId = AccountId(1);
    const SELLER: AccountId = AccountId(2);

    fn policy(staked: Decimal) -> Policy {
        Policy {
            market_id: MKT,
            buyer: BUYER,
            seller: SELLER,
            premium: dec!(5),
            staked_amount: staked,
            lp_amount: dec!(1),
            lp_value: dec!(400),
            claimed: false,
        }
    }

    #[test]
    fn local_indices_start_at_zero_per_party() {
        let mut ledger = PolicyLedger::new();

        let (b0, s0) = ledger.issue(policy(dec!(100)));
        let (b1, s1) = ledger.issue(policy(dec!(200)));

        assert_eq!((b0, s0), (PolicyIndex(0), PolicyIndex(0)));
        assert_eq!((b1, s1), (PolicyIndex(1), PolicyIndex(1)));

        // a different buyer starts its own sequence against the same seller
        let mut other = policy(dec!(50));
        other.buyer = AccountId(9);
        let (b_other, s2) = ledger.issue(other);
        assert_eq!(b_other, PolicyIndex(0));
        assert_eq!(s2, PolicyIndex(2));
    }

    #[test]
    fn both_parties_reach_the_same_policy() {
        let mut ledger = PolicyLedger::new();
        let (b, s) = ledger.issue(policy(dec!(100)));

        ledger.for_buyer_mut(MKT, BUYER, b).unwrap().claimed = true;
        assert!(ledger.for_seller(MKT, SELLER, s).unwrap().claimed);
    }

    #[test]
    fn foreign_index_is_none() {
        let mut ledger = PolicyLedger::new();
        let (b, _) = ledger.issue(policy(dec!(100)));

        // the buyer's local index means nothing to another account
        assert!(ledger.for_buyer(MKT, AccountId(42), b).is_none());
        assert!(ledger.for_seller(MKT, BUYER, b).is_none());
    }

    #[test]
    fn unresolved_staked_tracks_claims() {
        let mut ledger = PolicyLedger::new();
        let (b, _) = ledger.issue(policy(dec!(100)));
        ledger.issue(policy(dec!(200)));

        assert_eq!(ledger.unresolved_staked(MKT), dec!(300));

        ledger.for_buyer_mut(MKT, BUYER, b).unwrap().claimed = true;
        assert_eq!(ledger.unresolved_staked(MKT), dec!(200));
    }
}
