//! Per-faction season statistics and the wide counter used for kills/deaths.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::FactionId;

/// Largest integer an IEEE double represents exactly (2^53).
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// A non-negative counter wide enough that season-long sums never lose precision.
///
/// Deserializes from a JSON integer or a decimal string. Always serializes as a
/// decimal string so that JavaScript consumers cannot truncate it to a double.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigCount(pub u128);

impl BigCount {
    pub const ZERO: BigCount = BigCount(0);

    pub fn get(self) -> u128 {
        self.0
    }

    pub fn saturating_add(self, other: BigCount) -> BigCount {
        BigCount(self.0.saturating_add(other.0))
    }
}

impl From<u64> for BigCount {
    fn from(v: u64) -> Self {
        BigCount(u128::from(v))
    }
}

impl std::iter::Sum for BigCount {
    fn sum<I: Iterator<Item = BigCount>>(iter: I) -> Self {
        iter.fold(BigCount::ZERO, BigCount::saturating_add)
    }
}

impl fmt::Display for BigCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for BigCount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u128>().map(BigCount)
    }
}

impl Serialize for BigCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct BigCountVisitor;

impl<'de> Visitor<'de> for BigCountVisitor {
    type Value = BigCount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigCount, E> {
        Ok(BigCount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<BigCount, E> {
        Ok(BigCount(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigCount, E> {
        u64::try_from(v)
            .map(BigCount::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigCount, E> {
        // Only integral values a double can carry exactly.
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= MAX_EXACT_F64 {
            Ok(BigCount(v as u128))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigCount, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for BigCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BigCountVisitor)
    }
}

/// One faction's statistics for a season.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct FactionStats {
    pub faction_id: FactionId,
    pub players: u64,
    pub successful_missions: u64,
    #[ts(type = "string")]
    pub deaths: BigCount,
    #[ts(type = "string")]
    pub kills: BigCount,
    /// Seconds since the season started.
    pub season_duration: u64,
}
