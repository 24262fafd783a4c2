//! Engine configuration options.

use crate::types::{AccountId, AssetId, Bps};

/// Engine configuration. The fee parameters, asset allowlist and claim-timing
/// mode stay mutable through the engine's administrative setters; everything
/// here is read by the core paths, never by external callers directly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Platform cut of each premium, basis points of the premium.
    pub fee_rate: Bps,
    /// Where the platform cut goes. None means sellers keep the full premium.
    pub fee_recipient: Option<AccountId>,
    /// When true (default), buyers cannot claim before market expiration.
    pub claim_requires_expiry: bool,
    /// The network's wrapped native asset; the oracle reference currency and
    /// a valid settlement leg.
    pub native_asset: AssetId,
    /// Stable assets accepted as a market's settlement leg.
    pub stable_assets: Vec<AssetId>,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate: Bps::new(200), // 2% of premium
            fee_recipient: None,
            claim_requires_expiry: true,
            native_asset: AssetId(0),
            stable_assets: Vec::new(),
            max_events: 100_000,
            verbose: false,
        }
    }
}
