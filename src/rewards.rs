// 9.3 rewards.rs: insurance-mining hook. fire and forget: the engine notifies
// an external incentive program about each issued policy and moves on. the
// hook has no way to abort issuance.

use crate::types::{AccountId, MarketId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// What an incentive program learns about a freshly issued policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyNotice {
    pub market_id: MarketId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub staked_amount: Decimal,
    pub premium: Decimal,
}

pub trait RewardHook: std::fmt::Debug {
    fn on_policy_issued(&mut self, notice: &PolicyNotice);
}

/// Default hook: no incentive program attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRewards;

impl RewardHook for NoopRewards {
    fn on_policy_issued(&mut self, _notice: &PolicyNotice) {}
}

/// Records every notice. Clones share the same log, so a test can hand one
/// clone to the engine and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingRewards {
    notices: Rc<RefCell<Vec<PolicyNotice>>>,
}

impl RecordingRewards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<PolicyNotice> {
        self.notices.borrow().clone()
    }
}

impl RewardHook for RecordingRewards {
    fn on_policy_issued(&mut self, notice: &PolicyNotice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn recording_clones_share_the_log() {
        let hook = RecordingRewards::new();
        let mut engine_side = hook.clone();

        engine_side.on_policy_issued(&PolicyNotice {
            market_id: MarketId(1),
            buyer: AccountId(1),
            seller: AccountId(2),
            staked_amount: dec!(400),
            premium: dec!(4),
        });

        assert_eq!(hook.notices().len(), 1);
        assert_eq!(hook.notices()[0].staked_amount, dec!(400));
    }
}
