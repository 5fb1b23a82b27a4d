//! Arena Ledger for Turret Arena
//!
//! The state-transition engine behind Turret Arena: arenas advancing through
//! phases, platoon slots with draining batteries, and bounty pools split
//! between vault and sentinel on a cooldown.
//! This crate is compiled to:
//! - Native (for the on-chain program and off-chain simulation)
//! - WASM (for frontend previews)

mod config;
mod error;
mod events;
mod ledger;
mod ports;
pub mod rules;
mod salt;
mod types;

#[cfg(feature = "wasm")]
mod wasm;

pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError, Result};
pub use events::LedgerEvent;
pub use ledger::{Ledger, LedgerState};
pub use ports::{FundTransfer, RecordFactory, TokenRequest};
#[cfg(any(test, feature = "testing"))]
pub use ports::mock;
pub use rules::{phase_label, split_bounty};
pub use salt::{derive_salt, salt_preimage, DEPLOY_SALT_DOMAIN, SALT_PREIMAGE_LEN};
pub use types::{Address, Arena, Call, ChassisStats, PlatoonMember};
