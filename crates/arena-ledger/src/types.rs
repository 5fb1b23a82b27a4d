//! Ledger data model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LedgerError, Result};
use crate::rules::FULL_BATTERY;

/// 32-byte account identity. The all-zero value means "empty".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    /// Parses 64 hex characters, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| LedgerError::InvalidAddress)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| LedgerError::InvalidAddress)?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Host-supplied context for a single call: who is calling, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    pub caller: Address,
    pub tick: u64,
}

impl Call {
    pub fn new(caller: Address, tick: u64) -> Self {
        Self { caller, tick }
    }
}

/// A game session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    pub start_tick: u64,
    /// 0..=6, only ever incremented by one
    pub phase: u8,
    pub terminated: bool,
    /// Cumulative bounty paid out of this arena
    pub bounty_claimed: u128,
}

impl Arena {
    pub fn launched_at(tick: u64) -> Self {
        Self {
            start_tick: tick,
            phase: 0,
            terminated: false,
            bounty_claimed: 0,
        }
    }
}

/// A manned platoon slot. Slots are never vacated once filled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatoonMember {
    pub unit: Address,
    pub enlisted_at_tick: u64,
    pub active: bool,
    pub battery_level: u64,
    /// 0 until the first shot
    pub last_fire_tick: u64,
}

impl PlatoonMember {
    pub fn enlist(unit: Address, tick: u64) -> Self {
        Self {
            unit,
            enlisted_at_tick: tick,
            active: true,
            battery_level: FULL_BATTERY,
            last_fire_tick: 0,
        }
    }
}

/// Lifetime statistics for a unit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChassisStats {
    pub damage_dealt: u128,
    /// Carried for indexers; no operation increments it.
    pub battles_won: u64,
    pub last_fire_tick: u64,
}
