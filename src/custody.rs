// 9.2 custody.rs: MOCKED. in-memory fungible-asset ledger, would be token
// contracts in prod. same failure contract: a transfer that cannot be funded
// aborts, and an aborted batch applies nothing.

use crate::types::{AccountId, AssetId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The engine's own custody account. All escrowed collateral and LP stakes
/// sit here; only the settlement path moves funds out.
pub const VAULT: AccountId = AccountId(0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("Account {account:?} has {available} of asset {asset:?}, needs {required}")]
    InsufficientBalance {
        asset: AssetId,
        account: AccountId,
        available: Decimal,
        required: Decimal,
    },

    #[error("Transfer amount must not be negative")]
    NegativeAmount,
}

/// One leg of a transfer batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferLeg {
    pub asset: AssetId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
}

/// A group of transfers that apply atomically: every leg is funded under the
/// batch's net flows, or nothing moves.
#[derive(Debug, Clone, Default)]
pub struct TransferBatch {
    legs: Vec<TransferLeg>,
}

impl TransferBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leg. Zero-amount legs are dropped so callers can pass computed
    /// amounts without special-casing (the no-op transfer of an unchanged
    /// amend, a zero payout, a zero fee).
    pub fn add(&mut self, asset: AssetId, from: AccountId, to: AccountId, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        self.legs.push(TransferLeg {
            asset,
            from,
            to,
            amount,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn legs(&self) -> &[TransferLeg] {
        &self.legs
    }

    /// Net balance change per (asset, account) across the batch.
    pub fn net_flows(&self) -> HashMap<(AssetId, AccountId), Decimal> {
        let mut flows: HashMap<(AssetId, AccountId), Decimal> = HashMap::new();
        for leg in &self.legs {
            *flows.entry((leg.asset, leg.from)).or_insert(Decimal::ZERO) -= leg.amount;
            *flows.entry((leg.asset, leg.to)).or_insert(Decimal::ZERO) += leg.amount;
        }
        flows
    }
}

/// In-memory balances per (asset, account).
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<(AssetId, AccountId), Decimal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faucet for simulations and tests. Real balances would arrive through
    /// external token transfers.
    pub fn mint(&mut self, asset: AssetId, account: AccountId, amount: Decimal) {
        *self.balances.entry((asset, account)).or_insert(Decimal::ZERO) += amount;
    }

    pub fn balance(&self, asset: AssetId, account: AccountId) -> Decimal {
        self.balances
            .get(&(asset, account))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Single transfer; fails without effect on shortfall.
    pub fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), CustodyError> {
        let mut batch = TransferBatch::new();
        batch.add(asset, from, to, amount);
        self.execute(&batch)
    }

    /// Execute a batch atomically: validate every leg and every net outflow
    /// first, then apply. A failed batch leaves all balances untouched.
    pub fn execute(&mut self, batch: &TransferBatch) -> Result<(), CustodyError> {
        for leg in batch.legs() {
            if leg.amount < Decimal::ZERO {
                return Err(CustodyError::NegativeAmount);
            }
        }

        let flows = batch.net_flows();
        for ((asset, account), flow) in &flows {
            if *flow < Decimal::ZERO {
                let available = self.balance(*asset, *account);
                if available + flow < Decimal::ZERO {
                    return Err(CustodyError::InsufficientBalance {
                        asset: *asset,
                        account: *account,
                        available,
                        required: flow.abs(),
                    });
                }
            }
        }

        for ((asset, account), flow) in flows {
            *self.balances.entry((asset, account)).or_insert(Decimal::ZERO) += flow;
        }
        Ok(())
    }
}
