// 8.0.2: result types and errors for engine operations.

use crate::custody::CustodyError;
use crate::market::MarketError;
use crate::oracle::OracleError;
use crate::order::OrderError;
use crate::policy::PolicyError;
use crate::types::{AccountId, Bps, MarketId, OrderIndex, PolicyIndex};
use rust_decimal::Decimal;

/// What a buyer walks away with after `buy`.
#[derive(Debug, Clone)]
pub struct PolicyReceipt {
    pub market_id: MarketId,
    pub seller: AccountId,
    pub order_index: OrderIndex,
    /// The buyer's handle for claim().
    pub buyer_index: PolicyIndex,
    /// The seller's handle for refund().
    pub seller_index: PolicyIndex,
    pub staked_amount: Decimal,
    pub lp_amount: Decimal,
    pub lp_value: Decimal,
    pub premium: Decimal,
    pub fee: Decimal,
}

/// Outcome of resolving one policy.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub market_id: MarketId,
    pub buyer: AccountId,
    pub seller: AccountId,
    /// Terminal valuation of the insured LP stake.
    pub current_value: Decimal,
    /// Measured depreciation against the entry benchmark (zero if none).
    pub loss: Decimal,
    /// loss scaled by the market's payment ratio, before the stake cap.
    pub covered_loss: Decimal,
    /// What the buyer received from seller collateral.
    pub payout: Decimal,
    /// What went back to the seller: staked_amount - payout, exactly.
    pub seller_refund: Decimal,
    /// LP tokens returned to the buyer, unconditionally.
    pub lp_returned: Decimal,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Transfer failed: {0}")]
    Custody(#[from] CustodyError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Premium rate {0} is invalid")]
    InvalidRate(Bps),

    #[error("Fee rate {0} must be below 10000 bps")]
    InvalidFeeRate(Bps),

    #[error("Coverage amount must be positive")]
    InvalidCoverageAmount,

    #[error("LP amount must be positive")]
    InvalidLpAmount,
}
