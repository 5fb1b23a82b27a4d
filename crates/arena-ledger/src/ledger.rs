//! The ledger engine
//!
//! Owns every arena, platoon slot, chassis record and bounty pool, and applies
//! operations one at a time. Each mutating operation runs against a
//! checkpoint of [`LedgerState`]: if any precondition or external call fails
//! the checkpoint is restored, so callers only ever observe whole operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::ports::{FundTransfer, RecordFactory, TokenRequest};
use crate::rules::{self, DEPLOY_FEE};
use crate::salt::derive_salt;
use crate::types::{Address, Arena, Call, ChassisStats, PlatoonMember};

/// Everything the ledger persists between calls
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub arena_counter: u64,
    pub total_bounties_paid: u128,
    pub paused: bool,
    pub deploy_count: u64,
    /// Value held by the ledger (seeded bounties not yet claimed)
    pub balance: u128,
    pub arenas: BTreeMap<u64, Arena>,
    /// arena id -> slot -> member
    pub platoons: BTreeMap<u64, BTreeMap<u8, PlatoonMember>>,
    /// Global unit -> slot index. Last assignment wins, across all arenas.
    pub unit_slots: BTreeMap<Address, u8>,
    pub chassis: BTreeMap<Address, ChassisStats>,
    pub bounty_pools: BTreeMap<u64, u128>,
    /// arena id -> tick at which the next claim unlocks
    pub cooldowns: BTreeMap<u64, u64>,
    /// 1-based deploy index -> token record id
    pub deployed_tokens: BTreeMap<u64, Address>,
    pub events: Vec<LedgerEvent>,
}

impl LedgerState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

pub struct Ledger<B, F> {
    config: LedgerConfig,
    state: LedgerState,
    bank: B,
    factory: F,
}

impl<B: FundTransfer, F: RecordFactory> Ledger<B, F> {
    pub fn new(config: LedgerConfig, bank: B, factory: F) -> Self {
        Self::restore(config, LedgerState::default(), bank, factory)
    }

    /// Rebuild an engine from previously persisted state
    pub fn restore(config: LedgerConfig, state: LedgerState, bank: B, factory: F) -> Self {
        Self { config, state, bank, factory }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    // ------------------------------------------------------------------
    // Operator + unpaused
    // ------------------------------------------------------------------

    /// Open a new arena at phase 0 and start its claim cooldown.
    pub fn launch_arena(&mut self, call: &Call) -> Result<u64> {
        self.transact("launch_arena", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;

            let arena_id = ledger.state.arena_counter.checked_add(1).ok_or(LedgerError::Overflow)?;
            let unlock_tick = rules::next_unlock(call.tick)?;

            ledger.state.arena_counter = arena_id;
            ledger.state.arenas.insert(arena_id, Arena::launched_at(call.tick));
            ledger.state.cooldowns.insert(arena_id, unlock_tick);

            ledger.emit(LedgerEvent::ArenaLaunched {
                arena_id,
                start_tick: call.tick,
                unlock_tick,
            });
            info!(arena_id, unlock_tick, "arena launched");
            Ok(arena_id)
        })
    }

    /// Man an empty platoon slot with a fully charged unit.
    pub fn assign_slot(&mut self, call: &Call, arena_id: u64, unit: Address, slot: u8) -> Result<()> {
        self.transact("assign_slot", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            ledger.live_arena(arena_id)?;
            if unit.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            rules::check_slot(slot)?;

            let platoon = ledger.state.platoons.entry(arena_id).or_default();
            if platoon.get(&slot).is_some_and(|member| !member.unit.is_zero()) {
                return Err(LedgerError::SlotOccupied { arena_id, slot });
            }
            platoon.insert(slot, PlatoonMember::enlist(unit, call.tick));
            ledger.state.unit_slots.insert(unit, slot);

            ledger.emit(LedgerEvent::SlotFilled { arena_id, unit, slot });
            info!(arena_id, slot, unit = %unit, "slot filled");
            Ok(())
        })
    }

    /// Move an arena forward by exactly one phase.
    pub fn advance_phase(&mut self, call: &Call, arena_id: u64) -> Result<u8> {
        self.transact("advance_phase", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            let arena = ledger.arena_mut(arena_id)?;
            let phase = rules::next_phase(arena.phase, arena.terminated)?;
            arena.phase = phase;

            ledger.emit(LedgerEvent::PhaseAdvanced { arena_id, phase });
            ledger.emit(LedgerEvent::PhaseGateOpened {
                arena_id,
                phase,
                tick: call.tick,
            });
            info!(arena_id, phase, "phase advanced");
            Ok(phase)
        })
    }

    /// Fire a unit's turret. `damage` is recorded as given.
    pub fn fire(&mut self, call: &Call, arena_id: u64, unit: Address, damage: u128) -> Result<()> {
        self.transact("fire", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            if unit.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            ledger.arena(arena_id)?;

            let slot = *ledger
                .state
                .unit_slots
                .get(&unit)
                .ok_or(LedgerError::UnitNotEnlisted)?;
            // The index may point at a slot the unit holds in another arena.
            let member = ledger
                .state
                .platoons
                .get_mut(&arena_id)
                .and_then(|platoon| platoon.get_mut(&slot))
                .filter(|member| member.unit == unit)
                .ok_or(LedgerError::UnitNotEnlisted)?;

            let battery_level = rules::discharge(member.battery_level, member.last_fire_tick, call.tick)?;
            member.battery_level = battery_level;
            member.last_fire_tick = call.tick;

            let stats = ledger.state.chassis.entry(unit).or_default();
            stats.damage_dealt = stats
                .damage_dealt
                .checked_add(damage)
                .ok_or(LedgerError::Overflow)?;
            stats.last_fire_tick = call.tick;

            ledger.emit(LedgerEvent::TurretFired {
                arena_id,
                unit,
                damage,
                battery_level,
            });
            info!(arena_id, slot, unit = %unit, battery_level, "turret fired");
            Ok(())
        })
    }

    /// Validates the unit and emits a notification. The battery is left as is.
    pub fn charge_battery(&mut self, call: &Call, unit: Address, amount: u64) -> Result<()> {
        self.transact("charge_battery", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            if unit.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            if !ledger.is_known_unit(&unit) {
                return Err(LedgerError::ChassisNotFound);
            }
            ledger.emit(LedgerEvent::BatteryCharged { unit, amount });
            info!(unit = %unit, amount, "battery charge requested");
            Ok(())
        })
    }

    pub fn link_cortex(&mut self, call: &Call, unit: Address, cortex_id: u64) -> Result<()> {
        self.transact("link_cortex", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            if unit.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            ledger.emit(LedgerEvent::CortexLinked { unit, cortex_id });
            info!(unit = %unit, cortex_id, "cortex linked");
            Ok(())
        })
    }

    /// Pay out an arena's whole pool, 82% to the vault and the rest to the sentinel.
    pub fn claim_bounty(&mut self, call: &Call, arena_id: u64) -> Result<(u128, u128)> {
        self.transact("claim_bounty", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            ledger.live_arena(arena_id)?;

            let unlock_tick = ledger.get_cooldown_until(arena_id);
            if !rules::claim_window_open(call.tick, unlock_tick) {
                return Err(LedgerError::ClaimCooldownActive { unlock_tick });
            }
            let pool = ledger.get_bounty_pool(arena_id);
            if pool == 0 {
                return Err(LedgerError::BountyPoolEmpty);
            }

            let (vault_amount, sentinel_amount) = rules::split_bounty(pool);
            let next_unlock_tick = rules::next_unlock(call.tick)?;

            ledger.state.bounty_pools.insert(arena_id, 0);
            ledger.state.balance = ledger
                .state
                .balance
                .checked_sub(pool)
                .ok_or(LedgerError::Overflow)?;
            ledger.state.total_bounties_paid = ledger
                .state
                .total_bounties_paid
                .checked_add(pool)
                .ok_or(LedgerError::Overflow)?;
            let arena = ledger.arena_mut(arena_id)?;
            arena.bounty_claimed = arena
                .bounty_claimed
                .checked_add(pool)
                .ok_or(LedgerError::Overflow)?;
            ledger.state.cooldowns.insert(arena_id, next_unlock_tick);

            let vault = ledger.config.vault;
            let sentinel = ledger.config.sentinel;
            if !ledger
                .bank
                .transfer_all(&[(vault_amount, vault), (sentinel_amount, sentinel)])
            {
                return Err(LedgerError::TransferFailed);
            }

            ledger.emit(LedgerEvent::BountyPaid {
                arena_id,
                vault_amount,
                sentinel_amount,
            });
            ledger.emit(LedgerEvent::CooldownElapsed {
                arena_id,
                next_unlock_tick,
            });
            info!(arena_id, vault_amount, sentinel_amount, next_unlock_tick, "bounty paid");
            Ok((vault_amount, sentinel_amount))
        })
    }

    /// Add `payment` to an arena's pool. The value stays in the ledger.
    pub fn seed_bounty_pool(&mut self, call: &Call, arena_id: u64, payment: u128) -> Result<u128> {
        self.transact("seed_bounty_pool", |ledger| {
            ledger.only_operator(call)?;
            ledger.when_live()?;
            ledger.arena(arena_id)?;
            if payment == 0 {
                return Err(LedgerError::ZeroAmount);
            }

            let pool = ledger
                .get_bounty_pool(arena_id)
                .checked_add(payment)
                .ok_or(LedgerError::Overflow)?;
            ledger.state.balance = ledger
                .state
                .balance
                .checked_add(payment)
                .ok_or(LedgerError::Overflow)?;
            ledger.state.bounty_pools.insert(arena_id, pool);

            info!(arena_id, payment, pool, "bounty pool seeded");
            Ok(pool)
        })
    }

    // ------------------------------------------------------------------
    // Operator, regardless of pause
    // ------------------------------------------------------------------

    /// Permanently close an arena. A second call fails.
    pub fn terminate(&mut self, call: &Call, arena_id: u64) -> Result<()> {
        self.transact("terminate", |ledger| {
            ledger.only_operator(call)?;
            let arena = ledger.arena_mut(arena_id)?;
            if arena.terminated {
                return Err(LedgerError::InvalidPhase);
            }
            arena.terminated = true;
            info!(arena_id, "arena terminated");
            Ok(())
        })
    }

    /// Announces a proposed operator. The configured operator does not change.
    pub fn relay_operator(&mut self, call: &Call, new_operator: Address) -> Result<()> {
        self.transact("relay_operator", |ledger| {
            ledger.only_operator(call)?;
            if new_operator.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            let current = ledger.config.operator;
            ledger.emit(LedgerEvent::OperatorRelayed {
                current,
                proposed: new_operator,
            });
            info!(current = %current, proposed = %new_operator, "operator relay announced");
            Ok(())
        })
    }

    pub fn flip_pause(&mut self, call: &Call) -> Result<bool> {
        self.transact("flip_pause", |ledger| {
            ledger.only_operator(call)?;
            let paused = !ledger.state.paused;
            ledger.state.paused = paused;
            ledger.emit(LedgerEvent::PauseFlipped { paused });
            info!(paused, "pause flipped");
            Ok(paused)
        })
    }

    // ------------------------------------------------------------------
    // Public
    // ------------------------------------------------------------------

    /// Create a chassis token record for the caller and forward the payment to the vault.
    pub fn deploy_chassis(
        &mut self,
        call: &Call,
        name: &str,
        symbol: &str,
        supply: u128,
        payment: u128,
    ) -> Result<Address> {
        self.transact("deploy_chassis", |ledger| {
            ledger.when_live()?;
            rules::validate_deploy(payment, DEPLOY_FEE, name, symbol, supply)?;

            let request = TokenRequest {
                name: name.to_string(),
                symbol: symbol.to_string(),
                supply,
                owner: call.caller,
                salt: derive_salt(call.tick, &call.caller, ledger.state.deploy_count),
            };
            let token = ledger
                .factory
                .create(&request)
                .ok_or(LedgerError::RecordCreationFailed)?;

            let index = ledger.state.deploy_count.checked_add(1).ok_or(LedgerError::Overflow)?;
            ledger.state.deploy_count = index;
            ledger.state.deployed_tokens.insert(index, token);
            ledger.state.chassis.entry(call.caller).or_default();

            let vault = ledger.config.vault;
            if !ledger.bank.transfer(payment, &vault) {
                ledger.factory.discard(&token);
                return Err(LedgerError::TransferFailed);
            }

            ledger.emit(LedgerEvent::ChassisSpawned {
                token,
                owner: call.caller,
                index,
                name: request.name,
                symbol: request.symbol,
                supply,
            });
            info!(index, token = %token, owner = %call.caller, "chassis spawned");
            Ok(token)
        })
    }

    /// Direct payments outside deploy and seeding are always refused.
    pub fn receive_payment(&self, call: &Call, amount: u128) -> Result<()> {
        debug!(caller = %call.caller, amount, "unsolicited payment refused");
        Err(LedgerError::UnsolicitedPayment)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_arena(&self, arena_id: u64) -> Option<&Arena> {
        self.state.arenas.get(&arena_id)
    }

    pub fn get_platoon_member(&self, arena_id: u64, slot: u8) -> Option<&PlatoonMember> {
        self.state.platoons.get(&arena_id)?.get(&slot)
    }

    pub fn get_chassis_stats(&self, unit: &Address) -> Option<&ChassisStats> {
        self.state.chassis.get(unit)
    }

    pub fn get_bounty_pool(&self, arena_id: u64) -> u128 {
        self.state.bounty_pools.get(&arena_id).copied().unwrap_or(0)
    }

    pub fn get_cooldown_until(&self, arena_id: u64) -> u64 {
        self.state.cooldowns.get(&arena_id).copied().unwrap_or(0)
    }

    pub fn slot_of(&self, unit: &Address) -> Option<u8> {
        self.state.unit_slots.get(unit).copied()
    }

    pub fn arena_counter(&self) -> u64 {
        self.state.arena_counter
    }

    pub fn total_bounties_paid(&self) -> u128 {
        self.state.total_bounties_paid
    }

    pub fn paused(&self) -> bool {
        self.state.paused
    }

    pub fn deploy_count(&self) -> u64 {
        self.state.deploy_count
    }

    pub fn ledger_balance(&self) -> u128 {
        self.state.balance
    }

    pub fn token_at_index(&self, index: u64) -> Option<Address> {
        self.state.deployed_tokens.get(&index).copied()
    }

    /// Whether `claim_bounty` would pass its arena checks at tick `now`.
    /// Authorization and pause are not considered.
    pub fn can_claim_bounty(&self, arena_id: u64, now: u64) -> bool {
        match self.get_arena(arena_id) {
            Some(arena) => {
                !arena.terminated
                    && rules::claim_window_open(now, self.get_cooldown_until(arena_id))
                    && self.get_bounty_pool(arena_id) > 0
            }
            None => false,
        }
    }

    pub fn phase_label(&self, arena_id: u64) -> Option<&'static str> {
        self.get_arena(arena_id).and_then(|arena| rules::phase_label(arena.phase))
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.state.events
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn transact<T>(&mut self, op: &'static str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.state.clone();
        let result = f(self);
        if let Err(error) = &result {
            self.state = checkpoint;
            debug!(op, %error, "operation reverted");
        }
        result
    }

    fn only_operator(&self, call: &Call) -> Result<()> {
        if call.caller != self.config.operator {
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    fn when_live(&self) -> Result<()> {
        if self.state.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    fn arena(&self, arena_id: u64) -> Result<&Arena> {
        rules::check_arena_id(arena_id, self.state.arena_counter)?;
        self.state
            .arenas
            .get(&arena_id)
            .ok_or(LedgerError::ArenaNotFound(arena_id))
    }

    fn arena_mut(&mut self, arena_id: u64) -> Result<&mut Arena> {
        rules::check_arena_id(arena_id, self.state.arena_counter)?;
        self.state
            .arenas
            .get_mut(&arena_id)
            .ok_or(LedgerError::ArenaNotFound(arena_id))
    }

    /// Existing and not terminated
    fn live_arena(&self, arena_id: u64) -> Result<&Arena> {
        let arena = self.arena(arena_id)?;
        if arena.terminated {
            return Err(LedgerError::InvalidPhase);
        }
        Ok(arena)
    }

    fn is_known_unit(&self, unit: &Address) -> bool {
        self.state.unit_slots.contains_key(unit) || self.state.chassis.contains_key(unit)
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.state.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ports::mock::{MockBank, MockFactory};
    use crate::rules::{CLAIM_COOLDOWN_TICKS, FIRE_COOLDOWN_TICKS, MAX_PHASE, MIN_SUPPLY};
    use proptest::prelude::*;

    const OPERATOR: Address = Address([1u8; 32]);
    const VAULT: Address = Address([2u8; 32]);
    const SENTINEL: Address = Address([3u8; 32]);
    const OUTSIDER: Address = Address([9u8; 32]);
    const UNIT_A: Address = Address([10u8; 32]);
    const UNIT_B: Address = Address([11u8; 32]);

    type TestLedger = Ledger<MockBank, MockFactory>;

    fn ledger() -> TestLedger {
        let config = LedgerConfig::new(OPERATOR, VAULT, SENTINEL).unwrap();
        Ledger::new(config, MockBank::default(), MockFactory::default())
    }

    fn op(tick: u64) -> Call {
        Call::new(OPERATOR, tick)
    }

    /// Ledger with one arena launched at tick 1 and UNIT_A in slot 0
    fn manned_ledger() -> TestLedger {
        let mut ledger = ledger();
        ledger.launch_arena(&op(1)).unwrap();
        ledger.assign_slot(&op(1), 1, UNIT_A, 0).unwrap();
        ledger
    }

    #[test]
    fn test_launch_assigns_sequential_ids() {
        let mut ledger = ledger();
        assert_eq!(ledger.launch_arena(&op(5)).unwrap(), 1);
        assert_eq!(ledger.launch_arena(&op(6)).unwrap(), 2);
        assert_eq!(ledger.arena_counter(), 2);

        let arena = ledger.get_arena(1).unwrap();
        assert_eq!(arena.phase, 0);
        assert_eq!(arena.start_tick, 5);
        assert!(!arena.terminated);
        assert_eq!(arena.bounty_claimed, 0);
        assert_eq!(ledger.get_cooldown_until(1), 5 + CLAIM_COOLDOWN_TICKS);
        assert_eq!(ledger.phase_label(1), Some("Idle"));
    }

    #[test]
    fn test_operator_only() {
        let mut ledger = manned_ledger();
        let outsider = Call::new(OUTSIDER, 10);
        assert_eq!(ledger.launch_arena(&outsider), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.assign_slot(&outsider, 1, UNIT_B, 1), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.advance_phase(&outsider, 1), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.terminate(&outsider, 1), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.fire(&outsider, 1, UNIT_A, 5), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.seed_bounty_pool(&outsider, 1, 5), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.claim_bounty(&outsider, 1), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.flip_pause(&outsider), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.relay_operator(&outsider, OUTSIDER), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.charge_battery(&outsider, UNIT_A, 5), Err(LedgerError::Unauthorized));
        assert_eq!(ledger.link_cortex(&outsider, UNIT_A, 5), Err(LedgerError::Unauthorized));
    }

    #[test]
    fn test_pause_gates_pausable_operations_only() {
        let mut ledger = manned_ledger();
        assert_eq!(ledger.flip_pause(&op(2)), Ok(true));
        assert!(ledger.paused());

        assert_eq!(ledger.launch_arena(&op(3)), Err(LedgerError::Paused));
        assert_eq!(ledger.assign_slot(&op(3), 1, UNIT_B, 1), Err(LedgerError::Paused));
        assert_eq!(ledger.advance_phase(&op(3), 1), Err(LedgerError::Paused));
        assert_eq!(ledger.fire(&op(3), 1, UNIT_A, 1), Err(LedgerError::Paused));
        assert_eq!(ledger.seed_bounty_pool(&op(3), 1, 1), Err(LedgerError::Paused));
        assert_eq!(ledger.claim_bounty(&op(3), 1), Err(LedgerError::Paused));
        assert_eq!(ledger.charge_battery(&op(3), UNIT_A, 1), Err(LedgerError::Paused));
        assert_eq!(ledger.link_cortex(&op(3), UNIT_A, 1), Err(LedgerError::Paused));
        assert_eq!(
            ledger.deploy_chassis(&Call::new(OUTSIDER, 3), "Mk1", "MK", MIN_SUPPLY, DEPLOY_FEE),
            Err(LedgerError::Paused)
        );

        // Unaffected by pause
        assert!(ledger.relay_operator(&op(3), UNIT_B).is_ok());
        assert!(ledger.terminate(&op(3), 1).is_ok());
        assert_eq!(ledger.flip_pause(&op(4)), Ok(false));
        assert!(ledger.launch_arena(&op(5)).is_ok());
    }

    #[test]
    fn test_advance_stops_at_terminal_phase() {
        let mut ledger = manned_ledger();
        for expected in 1..=MAX_PHASE {
            assert_eq!(ledger.advance_phase(&op(2), 1), Ok(expected));
        }
        assert_eq!(ledger.phase_label(1), Some("Terminal"));

        let before = ledger.state().clone();
        let err = ledger.advance_phase(&op(3), 1).unwrap_err();
        assert_eq!(err, LedgerError::InvalidPhase);
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(ledger.state(), &before);
    }

    #[test]
    fn test_advance_emits_both_notifications() {
        let mut ledger = manned_ledger();
        ledger.advance_phase(&op(7), 1).unwrap();
        let tail = &ledger.events()[ledger.events().len() - 2..];
        assert_eq!(
            tail,
            &[
                LedgerEvent::PhaseAdvanced { arena_id: 1, phase: 1 },
                LedgerEvent::PhaseGateOpened { arena_id: 1, phase: 1, tick: 7 },
            ]
        );
    }

    #[test]
    fn test_unknown_arena() {
        let mut ledger = ledger();
        assert_eq!(ledger.advance_phase(&op(1), 1), Err(LedgerError::ArenaNotFound(1)));
        ledger.launch_arena(&op(1)).unwrap();
        assert_eq!(ledger.advance_phase(&op(1), 0), Err(LedgerError::ArenaNotFound(0)));
        assert_eq!(ledger.assign_slot(&op(1), 2, UNIT_A, 0), Err(LedgerError::ArenaNotFound(2)));
        assert_eq!(ledger.seed_bounty_pool(&op(1), 2, 10), Err(LedgerError::ArenaNotFound(2)));
        assert_eq!(ledger.claim_bounty(&op(100), 2), Err(LedgerError::ArenaNotFound(2)));
        assert_eq!(ledger.terminate(&op(1), 2), Err(LedgerError::ArenaNotFound(2)));
        assert_eq!(ledger.fire(&op(1), 2, UNIT_A, 1), Err(LedgerError::ArenaNotFound(2)));
    }

    #[test]
    fn test_terminate_is_final_and_not_idempotent() {
        let mut ledger = manned_ledger();
        ledger.seed_bounty_pool(&op(2), 1, 500).unwrap();
        ledger.terminate(&op(2), 1).unwrap();
        assert!(ledger.get_arena(1).unwrap().terminated);

        assert_eq!(ledger.terminate(&op(3), 1), Err(LedgerError::InvalidPhase));
        assert_eq!(ledger.advance_phase(&op(3), 1), Err(LedgerError::InvalidPhase));
        assert_eq!(ledger.assign_slot(&op(3), 1, UNIT_B, 1), Err(LedgerError::InvalidPhase));
        assert_eq!(ledger.claim_bounty(&op(500), 1), Err(LedgerError::InvalidPhase));
        assert!(!ledger.can_claim_bounty(1, 500));
    }

    #[test]
    fn test_slot_accepts_exactly_one_assignment() {
        let mut ledger = manned_ledger();
        for unit in [UNIT_A, UNIT_B] {
            let err = ledger.assign_slot(&op(2), 1, unit, 0).unwrap_err();
            assert_eq!(err, LedgerError::SlotOccupied { arena_id: 1, slot: 0 });
            assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        }
        assert_eq!(ledger.get_platoon_member(1, 0).unwrap().unit, UNIT_A);
    }

    #[test]
    fn test_assign_slot_validation() {
        let mut ledger = manned_ledger();
        assert_eq!(ledger.assign_slot(&op(2), 1, Address::ZERO, 1), Err(LedgerError::ZeroAddress));
        let err = ledger.assign_slot(&op(2), 1, UNIT_B, 24).unwrap_err();
        assert_eq!(err, LedgerError::PlatoonFull(24));
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert!(ledger.assign_slot(&op(2), 1, UNIT_B, 23).is_ok());
    }

    #[test]
    fn test_assign_slot_initializes_member() {
        let mut ledger = ledger();
        ledger.launch_arena(&op(1)).unwrap();
        ledger.assign_slot(&op(12), 1, UNIT_B, 7).unwrap();

        let member = ledger.get_platoon_member(1, 7).unwrap();
        assert_eq!(member, &PlatoonMember::enlist(UNIT_B, 12));
        assert_eq!(ledger.slot_of(&UNIT_B), Some(7));
        assert_eq!(
            ledger.events().last(),
            Some(&LedgerEvent::SlotFilled { arena_id: 1, unit: UNIT_B, slot: 7 })
        );
    }

    #[test]
    fn test_fire_drains_battery_to_floor() {
        let mut ledger = manned_ledger();
        let mut tick = 10;
        let mut levels = Vec::new();
        while ledger.fire(&op(tick), 1, UNIT_A, 3).is_ok() {
            levels.push(ledger.get_platoon_member(1, 0).unwrap().battery_level);
            tick += FIRE_COOLDOWN_TICKS;
        }
        assert_eq!(levels, vec![85, 70, 55, 40, 25, 10, 0]);

        let err = ledger.fire(&op(tick), 1, UNIT_A, 3).unwrap_err();
        assert_eq!(err, LedgerError::BatteryDepleted(0));
        assert_eq!(err.kind(), ErrorKind::ResourceDepleted);
        assert_eq!(ledger.get_chassis_stats(&UNIT_A).unwrap().damage_dealt, 21);
    }

    #[test]
    fn test_fire_cooldown_window() {
        let mut ledger = manned_ledger();
        ledger.fire(&op(100), 1, UNIT_A, 1).unwrap();

        let before = ledger.state().clone();
        assert_eq!(
            ledger.fire(&op(122), 1, UNIT_A, 1),
            Err(LedgerError::FireCooldownActive { ready_tick: 123 })
        );
        assert_eq!(ledger.state(), &before);

        ledger.fire(&op(123), 1, UNIT_A, 1).unwrap();
        let member = ledger.get_platoon_member(1, 0).unwrap();
        assert_eq!(member.battery_level, 70);
        assert_eq!(member.last_fire_tick, 123);
    }

    #[test]
    fn test_fire_records_unbounded_damage() {
        let mut ledger = manned_ledger();
        ledger.fire(&op(50), 1, UNIT_A, u64::MAX as u128 * 4).unwrap();

        let stats = ledger.get_chassis_stats(&UNIT_A).unwrap();
        assert_eq!(stats.damage_dealt, u64::MAX as u128 * 4);
        assert_eq!(stats.last_fire_tick, 50);
        assert_eq!(stats.battles_won, 0);
        assert_eq!(
            ledger.events().last(),
            Some(&LedgerEvent::TurretFired {
                arena_id: 1,
                unit: UNIT_A,
                damage: u64::MAX as u128 * 4,
                battery_level: 85,
            })
        );
    }

    #[test]
    fn test_fire_rejects_unenlisted_units() {
        let mut ledger = manned_ledger();
        assert_eq!(ledger.fire(&op(5), 1, UNIT_B, 1), Err(LedgerError::UnitNotEnlisted));
        assert_eq!(ledger.fire(&op(5), 1, Address::ZERO, 1), Err(LedgerError::ZeroAddress));
    }

    #[test]
    fn test_reverse_index_last_assignment_wins() {
        let mut ledger = manned_ledger();
        ledger.launch_arena(&op(2)).unwrap();
        ledger.assign_slot(&op(2), 2, UNIT_A, 5).unwrap();
        assert_eq!(ledger.slot_of(&UNIT_A), Some(5));

        // Arena 1 slot 0 still holds UNIT_A, but the index now points at slot 5.
        assert_eq!(ledger.get_platoon_member(1, 0).unwrap().unit, UNIT_A);
        assert_eq!(ledger.fire(&op(10), 1, UNIT_A, 1), Err(LedgerError::UnitNotEnlisted));
        assert!(ledger.fire(&op(10), 2, UNIT_A, 1).is_ok());
    }

    #[test]
    fn test_fire_allowed_after_termination() {
        let mut ledger = manned_ledger();
        ledger.terminate(&op(2), 1).unwrap();
        assert!(ledger.fire(&op(3), 1, UNIT_A, 9).is_ok());
    }

    #[test]
    fn test_claim_splits_and_resets_cooldown() {
        let mut ledger = manned_ledger();
        ledger.seed_bounty_pool(&op(2), 1, 101).unwrap();
        assert_eq!(ledger.ledger_balance(), 101);

        let claim_tick = 1 + CLAIM_COOLDOWN_TICKS;
        assert!(ledger.can_claim_bounty(1, claim_tick));
        assert_eq!(ledger.claim_bounty(&op(claim_tick), 1), Ok((82, 19)));

        assert_eq!(ledger.get_bounty_pool(1), 0);
        assert_eq!(ledger.ledger_balance(), 0);
        assert_eq!(ledger.get_cooldown_until(1), claim_tick + CLAIM_COOLDOWN_TICKS);
        assert_eq!(ledger.get_arena(1).unwrap().bounty_claimed, 101);
        assert_eq!(ledger.bank().received(&VAULT), 82);
        assert_eq!(ledger.bank().received(&SENTINEL), 19);
        assert_eq!(
            &ledger.events()[ledger.events().len() - 2..],
            &[
                LedgerEvent::BountyPaid { arena_id: 1, vault_amount: 82, sentinel_amount: 19 },
                LedgerEvent::CooldownElapsed {
                    arena_id: 1,
                    next_unlock_tick: claim_tick + CLAIM_COOLDOWN_TICKS,
                },
            ]
        );
    }

    #[test]
    fn test_claim_preconditions() {
        let mut ledger = manned_ledger();
        ledger.seed_bounty_pool(&op(2), 1, 100).unwrap();

        let err = ledger.claim_bounty(&op(CLAIM_COOLDOWN_TICKS), 1).unwrap_err();
        assert_eq!(err, LedgerError::ClaimCooldownActive { unlock_tick: 1 + CLAIM_COOLDOWN_TICKS });
        assert_eq!(err.kind(), ErrorKind::CooldownActive);
        assert!(!ledger.can_claim_bounty(1, CLAIM_COOLDOWN_TICKS));

        let tick = 1 + CLAIM_COOLDOWN_TICKS;
        ledger.claim_bounty(&op(tick), 1).unwrap();

        // Empty pool after the cooldown passes again
        let later = tick + CLAIM_COOLDOWN_TICKS;
        let err = ledger.claim_bounty(&op(later), 1).unwrap_err();
        assert_eq!(err, LedgerError::BountyPoolEmpty);
        assert_eq!(err.kind(), ErrorKind::EmptyPool);
        assert!(!ledger.can_claim_bounty(1, later));
    }

    #[test]
    fn test_claim_transfer_failure_reverts_everything() {
        let mut ledger = manned_ledger();
        ledger.seed_bounty_pool(&op(2), 1, 1000).unwrap();
        ledger.bank_mut().reject = Some(SENTINEL);

        let before = ledger.state().clone();
        let err = ledger.claim_bounty(&op(200), 1).unwrap_err();
        assert_eq!(err, LedgerError::TransferFailed);
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.get_bounty_pool(1), 1000);
        assert_eq!(ledger.total_bounties_paid(), 0);

        assert!(ledger.bank().transfers.is_empty());

        ledger.bank_mut().reject = None;
        assert!(ledger.claim_bounty(&op(200), 1).is_ok());
    }

    #[test]
    fn test_claim_retry_pays_each_recipient_once() {
        let mut ledger = manned_ledger();
        ledger.seed_bounty_pool(&op(2), 1, 1000).unwrap();

        for rejected in [SENTINEL, VAULT] {
            ledger.bank_mut().reject = Some(rejected);
            assert_eq!(ledger.claim_bounty(&op(200), 1), Err(LedgerError::TransferFailed));
        }
        ledger.bank_mut().reject = None;
        assert_eq!(ledger.claim_bounty(&op(200), 1), Ok((820, 180)));

        assert_eq!(ledger.bank().received(&VAULT), 820);
        assert_eq!(ledger.bank().received(&SENTINEL), 180);
        assert_eq!(
            ledger.bank().received(&VAULT) + ledger.bank().received(&SENTINEL),
            ledger.total_bounties_paid()
        );
    }

    #[test]
    fn test_seed_requires_payment() {
        let mut ledger = manned_ledger();
        let err = ledger.seed_bounty_pool(&op(2), 1, 0).unwrap_err();
        assert_eq!(err, LedgerError::ZeroAmount);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(ledger.seed_bounty_pool(&op(2), 1, 40), Ok(40));
        assert_eq!(ledger.seed_bounty_pool(&op(3), 1, 2), Ok(42));
    }

    #[test]
    fn test_end_to_end_bounty_cycle() {
        let mut ledger = ledger();
        assert_eq!(ledger.launch_arena(&op(0)), Ok(1));
        ledger.seed_bounty_pool(&op(0), 1, 1000).unwrap();

        let tick = CLAIM_COOLDOWN_TICKS;
        assert_eq!(ledger.claim_bounty(&op(tick), 1), Ok((820, 180)));
        assert_eq!(ledger.get_bounty_pool(1), 0);
        assert_eq!(ledger.total_bounties_paid(), 1000);
        assert_eq!(ledger.get_cooldown_until(1), tick + CLAIM_COOLDOWN_TICKS);
    }

    #[test]
    fn test_deploy_chassis() {
        let mut ledger = ledger();
        let deployer = Call::new(OUTSIDER, 77);
        let token = ledger
            .deploy_chassis(&deployer, "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE + 5)
            .unwrap();

        assert_eq!(token, Address(derive_salt(77, &OUTSIDER, 0)));
        assert_eq!(ledger.deploy_count(), 1);
        assert_eq!(ledger.token_at_index(1), Some(token));
        assert_eq!(ledger.token_at_index(0), None);
        assert_eq!(ledger.bank().received(&VAULT), DEPLOY_FEE + 5);
        assert_eq!(ledger.get_chassis_stats(&OUTSIDER), Some(&ChassisStats::default()));

        let created = &ledger.factory().created[0];
        assert_eq!(created.owner, OUTSIDER);
        assert_eq!(created.name, "Warhound");
        assert_eq!(created.symbol, "WHD");

        // Same caller and tick, next count: a different salt
        let second = ledger
            .deploy_chassis(&deployer, "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE)
            .unwrap();
        assert_ne!(second, token);
        assert_eq!(ledger.token_at_index(2), Some(second));
    }

    #[test]
    fn test_deploy_underpaid_changes_nothing() {
        let mut ledger = ledger();
        let before = ledger.state().clone();
        let err = ledger
            .deploy_chassis(&Call::new(OUTSIDER, 1), "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE - 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PaymentInsufficient);
        assert_eq!(ledger.deploy_count(), 0);
        assert_eq!(ledger.state(), &before);
        assert!(ledger.factory().created.is_empty());
    }

    #[test]
    fn test_deploy_failures_revert() {
        let mut ledger = ledger();
        let call = Call::new(OUTSIDER, 1);

        ledger.factory_mut().fail = true;
        assert_eq!(
            ledger.deploy_chassis(&call, "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE),
            Err(LedgerError::RecordCreationFailed)
        );

        ledger.factory_mut().fail = false;
        ledger.bank_mut().reject = Some(VAULT);
        assert_eq!(
            ledger.deploy_chassis(&call, "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE),
            Err(LedgerError::TransferFailed)
        );
        assert_eq!(ledger.deploy_count(), 0);
        assert_eq!(ledger.token_at_index(1), None);
        assert!(ledger.get_chassis_stats(&OUTSIDER).is_none());
        assert!(ledger.factory().created.is_empty());

        // The retry creates exactly one record
        ledger.bank_mut().reject = None;
        let token = ledger
            .deploy_chassis(&call, "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE)
            .unwrap();
        assert_eq!(ledger.factory().created.len(), 1);
        assert_eq!(ledger.token_at_index(1), Some(token));
    }

    #[test]
    fn test_notification_only_operations_leave_state_alone() {
        let mut ledger = manned_ledger();
        ledger.fire(&op(5), 1, UNIT_A, 10).unwrap();

        let before = ledger.state().clone();
        let events_before = before.events.len();

        ledger.charge_battery(&op(40), UNIT_A, 50).unwrap();
        ledger.link_cortex(&op(41), UNIT_A, 7).unwrap();
        ledger.relay_operator(&op(42), UNIT_B).unwrap();

        let mut after = ledger.state().clone();
        assert_eq!(after.events.len(), events_before + 3);
        assert_eq!(
            &after.events[events_before..],
            &[
                LedgerEvent::BatteryCharged { unit: UNIT_A, amount: 50 },
                LedgerEvent::CortexLinked { unit: UNIT_A, cortex_id: 7 },
                LedgerEvent::OperatorRelayed { current: OPERATOR, proposed: UNIT_B },
            ]
        );
        after.events.truncate(events_before);
        assert_eq!(after, before);
        assert_eq!(ledger.get_platoon_member(1, 0).unwrap().battery_level, 85);

        // The relayed identity gains nothing
        assert_eq!(ledger.config().operator, OPERATOR);
        assert_eq!(ledger.launch_arena(&Call::new(UNIT_B, 50)), Err(LedgerError::Unauthorized));
    }

    #[test]
    fn test_charge_battery_requires_known_unit() {
        let mut ledger = manned_ledger();
        assert_eq!(ledger.charge_battery(&op(2), UNIT_B, 5), Err(LedgerError::ChassisNotFound));
        assert_eq!(ledger.charge_battery(&op(2), Address::ZERO, 5), Err(LedgerError::ZeroAddress));

        // A deployed chassis owner counts as known
        ledger
            .deploy_chassis(&Call::new(UNIT_B, 3), "Warhound", "WHD", MIN_SUPPLY, DEPLOY_FEE)
            .unwrap();
        assert!(ledger.charge_battery(&op(4), UNIT_B, 5).is_ok());
    }

    #[test]
    fn test_link_cortex_and_relay_reject_zero() {
        let mut ledger = manned_ledger();
        assert_eq!(ledger.link_cortex(&op(2), Address::ZERO, 1), Err(LedgerError::ZeroAddress));
        assert_eq!(ledger.relay_operator(&op(2), Address::ZERO), Err(LedgerError::ZeroAddress));
    }

    #[test]
    fn test_unsolicited_payment_rejected() {
        let ledger = manned_ledger();
        let err = ledger.receive_payment(&Call::new(OUTSIDER, 3), 10).unwrap_err();
        assert_eq!(err, LedgerError::UnsolicitedPayment);
        assert_eq!(ledger.ledger_balance(), 0);
    }

    #[test]
    fn test_state_survives_json_restore() {
        let mut ledger = manned_ledger();
        ledger.seed_bounty_pool(&op(2), 1, 300).unwrap();
        ledger.fire(&op(3), 1, UNIT_A, 12).unwrap();
        ledger.advance_phase(&op(4), 1).unwrap();

        let json = ledger.state().to_json().unwrap();
        let state = LedgerState::from_json(&json).unwrap();
        assert_eq!(&state, ledger.state());

        let mut restored = Ledger::restore(
            ledger.config().clone(),
            state,
            MockBank::default(),
            MockFactory::default(),
        );
        assert_eq!(restored.claim_bounty(&op(500), 1), Ok((246, 54)));
        assert_eq!(restored.get_arena(1).unwrap().phase, 1);
    }

    #[derive(Clone, Debug)]
    enum Action {
        Launch,
        Assign { arena: u64, unit: u8, slot: u8 },
        Advance { arena: u64 },
        Terminate { arena: u64 },
        Fire { arena: u64, unit: u8, damage: u32 },
        Seed { arena: u64, amount: u32 },
        Claim { arena: u64 },
        Pause,
        Wait { ticks: u8 },
        RejectSentinel { on: bool },
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Launch),
            (0u64..4, 10u8..14, 0u8..26).prop_map(|(arena, unit, slot)| Action::Assign { arena, unit, slot }),
            (0u64..4).prop_map(|arena| Action::Advance { arena }),
            (0u64..4).prop_map(|arena| Action::Terminate { arena }),
            (0u64..4, 10u8..14, any::<u32>()).prop_map(|(arena, unit, damage)| Action::Fire { arena, unit, damage }),
            (0u64..4, 0u32..10_000).prop_map(|(arena, amount)| Action::Seed { arena, amount }),
            (0u64..4).prop_map(|arena| Action::Claim { arena }),
            Just(Action::Pause),
            any::<u8>().prop_map(|ticks| Action::Wait { ticks }),
            any::<bool>().prop_map(|on| Action::RejectSentinel { on }),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_over_random_sequences(actions in prop::collection::vec(action(), 1..60)) {
            let mut ledger = ledger();
            let mut tick = 1u64;

            for action in actions {
                let before = ledger.state().clone();
                let result = match action {
                    Action::Launch => ledger.launch_arena(&op(tick)).map(|_| ()),
                    Action::Assign { arena, unit, slot } => {
                        ledger.assign_slot(&op(tick), arena, Address([unit; 32]), slot)
                    }
                    Action::Advance { arena } => ledger.advance_phase(&op(tick), arena).map(|_| ()),
                    Action::Terminate { arena } => ledger.terminate(&op(tick), arena),
                    Action::Fire { arena, unit, damage } => {
                        ledger.fire(&op(tick), arena, Address([unit; 32]), damage as u128)
                    }
                    Action::Seed { arena, amount } => {
                        ledger.seed_bounty_pool(&op(tick), arena, amount as u128).map(|_| ())
                    }
                    Action::Claim { arena } => ledger.claim_bounty(&op(tick), arena).map(|_| ()),
                    Action::Pause => ledger.flip_pause(&op(tick)).map(|_| ()),
                    Action::Wait { ticks } => {
                        tick += ticks as u64;
                        Ok(())
                    }
                    Action::RejectSentinel { on } => {
                        ledger.bank_mut().reject = on.then_some(SENTINEL);
                        Ok(())
                    }
                };

                let after = ledger.state();
                if result.is_err() {
                    prop_assert_eq!(after, &before);
                }
                for (id, arena) in &after.arenas {
                    prop_assert!(arena.phase <= MAX_PHASE);
                    if let Some(old) = before.arenas.get(id) {
                        prop_assert!(arena.phase >= old.phase);
                        prop_assert!(arena.terminated || !old.terminated);
                    }
                }
                for platoon in after.platoons.values() {
                    for member in platoon.values() {
                        prop_assert!(member.battery_level <= 100);
                    }
                }
                let pooled: u128 = after.bounty_pools.values().sum();
                prop_assert_eq!(pooled, after.balance);
                let claimed: u128 = after.arenas.values().map(|a| a.bounty_claimed).sum();
                prop_assert_eq!(claimed, after.total_bounties_paid);
                prop_assert_eq!(
                    ledger.bank().received(&VAULT) + ledger.bank().received(&SENTINEL),
                    after.total_bounties_paid
                );
            }
        }
    }
}
