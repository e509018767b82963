//! Multi-denomination balances.
//!
//! `Coins` is the unit both the bank module and spend-limited capabilities
//! count in. Zero entries are never stored, so an empty map is the only
//! zero value and `is_zero()` is a plain emptiness check.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single denomination and amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u64,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u64) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

/// A non-negative, denomination-sorted balance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct Coins(BTreeMap<String, u64>);

impl Coins {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a balance from individual coins, merging repeated denominations.
    ///
    /// Returns `None` if merging would overflow a `u64`.
    pub fn new(coins: impl IntoIterator<Item = Coin>) -> Option<Self> {
        let mut inner = BTreeMap::new();
        for coin in coins {
            if coin.amount == 0 {
                continue;
            }
            let entry = inner.entry(coin.denom).or_insert(0u64);
            *entry = entry.checked_add(coin.amount)?;
        }
        Some(Self(inner))
    }

    /// A balance holding a single denomination.
    pub fn of(denom: impl Into<String>, amount: u64) -> Self {
        let mut inner = BTreeMap::new();
        if amount > 0 {
            inner.insert(denom.into(), amount);
        }
        Self(inner)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn amount_of(&self, denom: &str) -> u64 {
        self.0.get(denom).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coin> + '_ {
        self.0.iter().map(|(denom, amount)| Coin::new(denom.clone(), *amount))
    }

    /// Subtract `other`, returning `None` if any denomination would go
    /// negative (including denominations `self` does not hold at all).
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut inner = self.0.clone();
        for (denom, amount) in &other.0 {
            let held = inner.get(denom).copied().unwrap_or(0);
            let left = held.checked_sub(*amount)?;
            if left == 0 {
                inner.remove(denom);
            } else {
                inner.insert(denom.clone(), left);
            }
        }
        Some(Self(inner))
    }

    /// Add `other`, returning `None` on overflow.
    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut inner = self.0.clone();
        for (denom, amount) in &other.0 {
            let entry = inner.entry(denom.clone()).or_insert(0u64);
            *entry = entry.checked_add(*amount)?;
        }
        Some(Self(inner))
    }
}

impl From<BTreeMap<String, u64>> for Coins {
    fn from(map: BTreeMap<String, u64>) -> Self {
        Self(map.into_iter().filter(|(_, amount)| *amount > 0).collect())
    }
}

impl From<Coins> for BTreeMap<String, u64> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("0");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(denom, amount)| format!("{}{}", amount, denom))
            .collect();
        f.write_str(&parts.join(","))
    }
}
