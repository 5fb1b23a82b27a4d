//! WASM bindings for frontend previews

#![cfg(feature = "wasm")]

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::rules::{discharge, phase_label, split_bounty};
use crate::salt::derive_salt;
use crate::types::Address;

#[derive(Serialize)]
struct BountySplit {
    vault: String,
    sentinel: String,
}

/// Preview a bounty payout
///
/// `pool` is a decimal string so values above 2^53 survive the JS boundary.
/// Returns `{vault, sentinel}` as decimal strings.
#[wasm_bindgen]
pub fn bounty_split(pool: &str) -> Result<JsValue, JsError> {
    let pool: u128 = pool
        .parse()
        .map_err(|e| JsError::new(&format!("Invalid pool amount: {}", e)))?;
    let (vault, sentinel) = split_bounty(pool);

    serde_wasm_bindgen::to_value(&BountySplit {
        vault: vault.to_string(),
        sentinel: sentinel.to_string(),
    })
    .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Display name for a phase index
#[wasm_bindgen]
pub fn phase_name(phase: u8) -> Result<String, JsError> {
    phase_label(phase)
        .map(str::to_string)
        .ok_or_else(|| JsError::new(&format!("Unknown phase: {}", phase)))
}

#[derive(Serialize)]
struct FireReadiness {
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    battery_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Check whether a unit could fire at `now`
///
/// Returns `{ready: true, battery_after}` or `{ready: false, error: "..."}`.
#[wasm_bindgen]
pub fn fire_readiness(battery_level: u64, last_fire_tick: u64, now: u64) -> Result<JsValue, JsError> {
    let readiness = match discharge(battery_level, last_fire_tick, now) {
        Ok(after) => FireReadiness { ready: true, battery_after: Some(after), error: None },
        Err(e) => FireReadiness { ready: false, battery_after: None, error: Some(e.to_string()) },
    };

    serde_wasm_bindgen::to_value(&readiness)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Predict the salt (and mock token id) of a chassis deployment, as hex
#[wasm_bindgen]
pub fn chassis_salt(tick: u64, caller: &str, deploy_count: u64) -> Result<String, JsError> {
    let caller: Address = caller
        .parse()
        .map_err(|_| JsError::new("Caller must be 32 bytes of hex"))?;
    Ok(hex::encode(derive_salt(tick, &caller, deploy_count)))
}
