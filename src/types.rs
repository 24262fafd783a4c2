// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, rates, prices, timestamps. each is a newtype so the compiler catches type mixups.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

// Token identity. LP tokens, stables and the native-wrapped asset all share
// this id space; the oracle and the custody ledger key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

// 1.1: per-seller order slot within one market. slots are append-only and
// stay stable forever: a canceled order keeps its slot with amount zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIndex(pub u32);

// 1.2: a party's local policy index. maps to a global arena slot inside the
// policy ledger; the global slot never crosses the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyIndex(pub u32);

// 1.3: basis points. 100 bps = 1%. premium quotes and the platform fee rate
// use this; the 10_000 denominator of the settlement arithmetic is baked into
// as_fraction().
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bps(i32);

impl Bps {
    pub fn new(bps: i32) -> Self {
        Self(bps)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }

    /// A whole unit: 10_000 bps = 100%.
    pub fn one() -> Self {
        Self(10_000)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

// 1.4: unit price of an asset in the reference (native-wrapped) currency or,
// after cross-division, in a market's settlement leg. must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(value > Decimal::ZERO);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.5: millisecond timestamp. the engine's clock is set by the caller, never
// read from the wall implicitly, so lifecycle phases are testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn elapsed_hours(&self, other: &Timestamp) -> Decimal {
        let diff_ms = (other.0 - self.0).abs();
        Decimal::new(diff_ms, 0) / dec!(3_600_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bps_conversion() {
        let hundred_bps = Bps::new(100);
        assert_eq!(hundred_bps.as_fraction(), dec!(0.01)); // 1%

        let fifty_bps = Bps::new(50);
        assert_eq!(fifty_bps.as_fraction(), dec!(0.005)); // 0.5%

        assert_eq!(Bps::one().as_fraction(), dec!(1));
    }

    #[test]
    fn price_rejects_non_positive() {
        assert!(Price::new(dec!(0)).is_none());
        assert!(Price::new(dec!(-1)).is_none());
        assert_eq!(Price::new(dec!(1.5)).unwrap().value(), dec!(1.5));
    }

    #[test]
    fn timestamp_elapsed() {
        let a = Timestamp::from_millis(0);
        let b = Timestamp::from_millis(3_600_000);
        assert_eq!(a.elapsed_hours(&b), dec!(1));
    }
}
