//! Deterministic salt for chassis token records
//!
//! The same preimage layout is hashed on-chain with the runtime's SHA-256
//! syscall, so both hosts agree on every token id.

use sha2::{Digest, Sha256};

use crate::types::Address;

/// Domain tag appended to every preimage
pub const DEPLOY_SALT_DOMAIN: &[u8] = b"turret-arena/chassis/v1";

pub const SALT_PREIMAGE_LEN: usize = 8 + 32 + 8 + DEPLOY_SALT_DOMAIN.len();

/// `tick LE || caller || deploy_count LE || domain`
pub fn salt_preimage(tick: u64, caller: &Address, deploy_count: u64) -> [u8; SALT_PREIMAGE_LEN] {
    let mut preimage = [0u8; SALT_PREIMAGE_LEN];
    preimage[..8].copy_from_slice(&tick.to_le_bytes());
    preimage[8..40].copy_from_slice(&caller.0);
    preimage[40..48].copy_from_slice(&deploy_count.to_le_bytes());
    preimage[48..].copy_from_slice(DEPLOY_SALT_DOMAIN);
    preimage
}

pub fn derive_salt(tick: u64, caller: &Address, deploy_count: u64) -> [u8; 32] {
    Sha256::digest(salt_preimage(tick, caller, deploy_count)).into()
}
