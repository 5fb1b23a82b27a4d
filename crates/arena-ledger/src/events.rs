//! Notifications appended to the ledger's event log

use serde::{Deserialize, Serialize};

use crate::types::Address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    ArenaLaunched {
        arena_id: u64,
        start_tick: u64,
        unlock_tick: u64,
    },
    SlotFilled {
        arena_id: u64,
        unit: Address,
        slot: u8,
    },
    PhaseAdvanced {
        arena_id: u64,
        phase: u8,
    },
    PhaseGateOpened {
        arena_id: u64,
        phase: u8,
        tick: u64,
    },
    TurretFired {
        arena_id: u64,
        unit: Address,
        damage: u128,
        battery_level: u64,
    },
    ChassisSpawned {
        token: Address,
        owner: Address,
        index: u64,
        name: String,
        symbol: String,
        supply: u128,
    },
    /// Emitted without touching the battery.
    BatteryCharged {
        unit: Address,
        amount: u64,
    },
    CortexLinked {
        unit: Address,
        cortex_id: u64,
    },
    BountyPaid {
        arena_id: u64,
        vault_amount: u128,
        sentinel_amount: u128,
    },
    CooldownElapsed {
        arena_id: u64,
        next_unlock_tick: u64,
    },
    /// Emitted without reassigning the operator.
    OperatorRelayed {
        current: Address,
        proposed: Address,
    },
    PauseFlipped {
        paused: bool,
    },
}
