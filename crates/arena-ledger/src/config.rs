//! Deployment configuration

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::types::Address;

/// The authority triple, fixed for the lifetime of a ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Only caller allowed to run gated operations
    pub operator: Address,
    /// Receives deploy fees and the 82% bounty share
    pub vault: Address,
    /// Receives the 18% bounty share
    pub sentinel: Address,
}

impl LedgerConfig {
    pub fn new(operator: Address, vault: Address, sentinel: Address) -> Result<Self> {
        let config = Self { operator, vault, sentinel };
        config.validate()?;
        Ok(config)
    }

    /// Parse `{"operator": "0x..", "vault": "0x..", "sentinel": "0x.."}`.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        config
            .validate()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.operator.is_zero() || self.vault.is_zero() || self.sentinel.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(())
    }
}
