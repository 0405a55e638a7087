//! The aggregate game state.
//!
//! [`GameState`] is a plain value. Public transitions take `&GameState` and
//! return a [`Transition`] carrying a new value; internally each subsystem
//! mutates a working copy. Every map is a `BTreeMap` so iteration order, binary
//! snapshots and state hashes are stable across runs.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::alchemy::{ActiveBuff, AlchemyState};
use crate::ascension::AscensionState;
use crate::automation::AutomationSettings;
use crate::catalog::{catalog, EquipSlot};
use crate::contracts::{ContractStatus, ContractsState};
use crate::disciples::DisciplesState;
use crate::equipment::{EquipmentInventory, EquippedState};
use crate::error::{GameError, Result};
use crate::expeditions::ExpeditionState;
use crate::facilities::FacilityState;
use crate::forging::ForgingState;
use crate::production::ProductionState;
use crate::realm::RealmState;
use crate::research::ResearchNodeState;
use crate::resources::{ResourceBundle, ResourceId, Resources};

/// Per-run counters, reset on ascension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunStats {
    /// Every positive essence gain this run.
    pub essence_earned: f64,
    /// Contracts claimed this run.
    pub contracts_completed: u64,
}

/// The single aggregate root of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Resource balances.
    pub resources: Resources,
    /// Cached production snapshot.
    pub production: ProductionState,
    /// Run-scoped counters.
    pub run_stats: RunStats,
    /// Upgrade id to owned level.
    pub upgrades: BTreeMap<String, u32>,
    /// Research id to purchase state.
    pub research: BTreeMap<String, ResearchNodeState>,
    /// Facility id to level.
    pub facilities: BTreeMap<String, FacilityState>,
    /// Contract slots.
    pub contracts: ContractsState,
    /// Forge queue.
    pub forging: ForgingState,
    /// Alchemy queue and discovered recipes.
    pub alchemy: AlchemyState,
    /// Expedition queue and unlocks.
    pub expeditions: ExpeditionState,
    /// Owned equipment.
    pub equipment: EquipmentInventory,
    /// Equipped instance per slot.
    pub equipped: EquippedState,
    /// Consumable id to count owned.
    pub consumables: BTreeMap<String, u32>,
    /// Active consumable buffs.
    pub buffs: Vec<ActiveBuff>,
    /// Disciple roster.
    pub disciples: DisciplesState,
    /// Player automation settings.
    pub automation: AutomationSettings,
    /// Realm ladder position and accumulated unlocks.
    pub realm: RealmState,
    /// Ascension counters.
    pub ascension: AscensionState,
    /// Wall-clock time of the last focus action.
    pub last_focus_ms: Option<u64>,
    /// RNG cursor.
    pub seed: u32,
}

impl GameState {
    /// Create a fresh game seeded from a wall-clock timestamp.
    #[must_use]
    pub fn new(now_ms: u64) -> Self {
        let catalog = catalog();
        let balance = &catalog.balance;

        let seed = match now_ms as u32 {
            0 => 1,
            s => s,
        };

        Self {
            resources: Resources::default(),
            production: ProductionState::from_base(balance.base_essence_per_second),
            run_stats: RunStats::default(),
            upgrades: catalog.upgrades.iter().map(|u| (u.id.clone(), 0)).collect(),
            research: catalog
                .research
                .iter()
                .map(|r| (r.id.clone(), ResearchNodeState::default()))
                .collect(),
            facilities: catalog
                .facilities
                .iter()
                .map(|f| (f.id.clone(), FacilityState::default()))
                .collect(),
            contracts: ContractsState::fresh(balance.contracts.base_slots),
            forging: ForgingState::default(),
            alchemy: AlchemyState::default(),
            expeditions: ExpeditionState::fresh(),
            equipment: EquipmentInventory::default(),
            equipped: EquippedState::default(),
            consumables: BTreeMap::new(),
            buffs: Vec::new(),
            disciples: DisciplesState::default(),
            automation: AutomationSettings::default(),
            realm: RealmState::initial(),
            ascension: AscensionState::default(),
            last_focus_ms: None,
            seed,
        }
    }

    /// Add positive essence income and count it toward this run.
    pub fn earn_essence(&mut self, amount: f64) {
        if amount > 0.0 {
            self.resources.essence += amount;
            self.run_stats.essence_earned += amount;
        }
    }

    /// Grant a reward bundle, counting its essence as earned.
    pub fn grant(&mut self, reward: &ResourceBundle) {
        for (id, amount) in reward.iter() {
            if id == ResourceId::Essence {
                self.earn_essence(amount);
            } else {
                *self.resources.get_mut(id) += amount;
            }
        }
    }

    /// Serialize to a compact binary snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Snapshot(format!("Failed to serialize state: {e}")))
    }

    /// Restore from a binary snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid snapshot.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::Snapshot(format!("Failed to deserialize state: {e}")))
    }

    /// Hash of the binary snapshot, used for replay verification.
    ///
    /// Two states hash equal exactly when they serialize to the same bytes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match self.to_bytes() {
            Ok(bytes) => bytes.hash(&mut hasher),
            // Unreachable for in-memory states; keep the hash total anyway.
            Err(_) => 0u8.hash(&mut hasher),
        }
        hasher.finish()
    }

    /// Check structural invariants, returning a description of each violation.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let p = &self.production;
        let expected = (p.base_per_second + p.additive_bonus) * p.multiplier;
        if (p.per_second - expected).abs() > 1e-9 * expected.abs().max(1.0) {
            violations.push(format!(
                "production.perSecond {} != (base + additive) * multiplier {expected}",
                p.per_second
            ));
        }

        let active = self.contracts.active_count();
        if active > self.contracts.max_slots as usize {
            violations.push(format!(
                "{active} active contracts exceed maxSlots {}",
                self.contracts.max_slots
            ));
        }
        for slot in &self.contracts.slots {
            if slot.elapsed_ms < 0.0 || slot.elapsed_ms > slot.duration_ms as f64 {
                violations.push(format!(
                    "contract '{}' elapsed {} outside [0, {}]",
                    slot.id, slot.elapsed_ms, slot.duration_ms
                ));
            }
            if slot.status == ContractStatus::Idle && slot.elapsed_ms != 0.0 {
                violations.push(format!("idle contract '{}' has elapsed time", slot.id));
            }
        }

        for slot in EquipSlot::ALL {
            let Some(id) = self.equipped.get(slot) else {
                continue;
            };
            match self.equipment.items.get(id) {
                None => violations.push(format!("equipped {slot:?} item '{id}' not in inventory")),
                Some(item) if item.slot != slot => violations.push(format!(
                    "item '{id}' of slot {:?} equipped as {slot:?}",
                    item.slot
                )),
                Some(_) => {}
            }
        }

        for id in self.equipment.items.keys() {
            match id.parse::<u64>() {
                Ok(n) if n < self.equipment.next_id => {}
                _ => violations.push(format!(
                    "instance id '{id}' not below nextId {}",
                    self.equipment.next_id
                )),
            }
        }

        for buff in &self.buffs {
            if buff.remaining_ms <= 0.0 {
                violations.push(format!("expired buff '{}' still active", buff.consumable_id));
            }
        }

        violations
    }
}

/// Outcome of a public transition.
///
/// `changed == false` means `state` equals the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The resulting state.
    pub state: GameState,
    /// Whether anything happened.
    pub changed: bool,
}

impl Transition {
    /// A transition that leaves `state` as it was.
    #[must_use]
    pub fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            changed: false,
        }
    }

    /// Compare a candidate result against the input.
    #[must_use]
    pub fn compare(before: &GameState, after: GameState) -> Self {
        let changed = after != *before;
        Self {
            state: after,
            changed,
        }
    }

    /// Consume the transition, keeping only the state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
