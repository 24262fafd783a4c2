// lpcover-core: peer-to-peer insurance market for LP position depreciation.
// settlement-first architecture: the frozen close price and the one-shot
// policy resolution take priority. all computation is deterministic with no
// external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: MarketId, AccountId, AssetId, Bps, Price
//   2.x  market.rs: market config, lifecycle phases, settlement-leg rules
//   3.x  order.rs: per-(market, seller) order list with stable indices
//   4.x  policy.rs: policy arena + per-party local index lists
//   8.x  engine/: core engine: orders, matching, settlement
//   9.x  oracle.rs: base price source + LP fair-value oracle (mocked feed)
//   9.1  pricing.rs: price adapter, cross-rate LP valuation per market
//   9.2  custody.rs: fungible-asset ledger + atomic transfer batches (mocked)
//   9.3  rewards.rs: insurance-mining hook (fire and forget)
//   10.x config.rs: fee, allowlist, claim-timing options
//   11.x events.rs: state transition events for audit

// core market modules
pub mod engine;
pub mod events;
pub mod market;
pub mod order;
pub mod policy;
pub mod types;

// pricing modules
pub mod oracle;
pub mod pricing;

// integration modules
pub mod config;
pub mod custody;
pub mod rewards;

// re exports for convenience
pub use engine::*;
pub use events::*;
pub use market::*;
pub use order::*;
pub use policy::*;
pub use types::*;
pub use config::EngineConfig;
pub use custody::{CustodyError, Ledger, TransferBatch, VAULT};
pub use oracle::{fair_lp_unit_price, LpOracle, OracleError, PoolSnapshot, PriceSource, StaticPriceSource};
pub use pricing::PriceAdapter;
pub use rewards::{NoopRewards, PolicyNotice, RecordingRewards, RewardHook};
