//! Contract board.
//!
//! Every contract definition owns exactly one slot. A slot cycles
//! `idle -> active -> completed -> idle`; completion does not pay out, the
//! reward is granted by [`complete_contract`] so that manual claiming and
//! auto-claim share one path.

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, ContractData};
use crate::error::{reject, Rejection, Result};
use crate::modifiers::Modifiers;
use crate::resources::{ResourceBundle, ResourceId};
use crate::state::GameState;

/// Lifecycle of a contract slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractStatus {
    /// Available to accept.
    Idle,
    /// In progress.
    Active,
    /// Finished, reward not yet claimed.
    Completed,
}

/// One contract's slot on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSlot {
    /// Contract id.
    pub id: String,
    /// Reward granted on claim.
    pub reward: ResourceBundle,
    /// Total duration at speed 1.
    pub duration_ms: u64,
    /// Progress, clamped to `[0, duration_ms]`.
    pub elapsed_ms: f64,
    /// Lifecycle state.
    pub status: ContractStatus,
}

impl ContractSlot {
    fn idle(def: &ContractData) -> Self {
        Self {
            id: def.id.clone(),
            reward: def.reward.clone(),
            duration_ms: def.duration_ms,
            elapsed_ms: 0.0,
            status: ContractStatus::Idle,
        }
    }
}

/// The contract board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractsState {
    /// One slot per contract definition, in catalog order.
    pub slots: Vec<ContractSlot>,
    /// Most contracts that may be active at once.
    pub max_slots: u32,
}

impl ContractsState {
    /// A board with an idle slot for every contract.
    #[must_use]
    pub fn fresh(max_slots: u32) -> Self {
        Self {
            slots: catalog().contracts.iter().map(ContractSlot::idle).collect(),
            max_slots,
        }
    }

    /// Number of slots currently in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.status == ContractStatus::Active)
            .count()
    }

    /// Slot for a contract id.
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<&ContractSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn slot_mut(&mut self, id: &str) -> Option<&mut ContractSlot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }
}

/// Raise `max_slots` to the current target and add slots for new contracts.
///
/// Slots are never removed and `max_slots` never shrinks, so in-progress
/// contracts survive any change to the bonuses.
pub fn sync_slots(state: &mut GameState) -> Result<()> {
    let mods = Modifiers::for_state(state)?;
    let target = catalog().balance.contracts.base_slots + mods.contract_slot_bonus();
    state.contracts.max_slots = state.contracts.max_slots.max(target);

    for def in &catalog().contracts {
        if state.contracts.slot(&def.id).is_none() {
            state.contracts.slots.push(ContractSlot::idle(def));
        }
    }
    Ok(())
}

fn check_accept(state: &GameState, def: &ContractData) -> std::result::Result<(), Rejection> {
    let Some(slot) = state.contracts.slot(&def.id) else {
        return Err(Rejection::NotFound(def.id.clone()));
    };
    if slot.status != ContractStatus::Idle {
        return Err(Rejection::QueueBusy);
    }
    if !state.realm.unlocked_contract_ids.contains(&def.id) {
        return Err(Rejection::Locked(def.id.clone()));
    }
    if state.contracts.active_count() >= state.contracts.max_slots as usize {
        return Err(Rejection::CapacityReached);
    }

    let req = &def.requirements;
    let meets = req
        .min_reputation
        .map_or(true, |min| state.resources.reputation >= min)
        && req
            .min_essence_per_second
            .map_or(true, |min| state.production.per_second >= min)
        && req
            .min_essence
            .map_or(true, |min| state.resources.essence >= min);
    if !meets {
        return Err(Rejection::RequirementsNotMet);
    }

    let cost = ResourceBundle::new().with(ResourceId::Essence, def.essence_cost);
    if !state.resources.can_afford(&cost) {
        return Err(Rejection::InsufficientResources);
    }
    Ok(())
}

/// Accept a contract into its slot, paying the upfront essence cost.
pub fn accept_contract(state: &mut GameState, id: &str) -> Result<()> {
    let def = catalog().contract(id)?;
    check_accept(state, def)?;

    state
        .resources
        .spend(&ResourceBundle::new().with(ResourceId::Essence, def.essence_cost));
    if let Some(slot) = state.contracts.slot_mut(id) {
        *slot = ContractSlot {
            status: ContractStatus::Active,
            ..ContractSlot::idle(def)
        };
    }
    Ok(())
}

/// Advance every active contract; finished ones become `Completed`.
pub fn progress_contracts(state: &mut GameState, dt_ms: f64, speed: f64) {
    if dt_ms <= 0.0 {
        return;
    }
    for slot in &mut state.contracts.slots {
        if slot.status != ContractStatus::Active {
            continue;
        }
        let duration = slot.duration_ms as f64;
        slot.elapsed_ms = (slot.elapsed_ms + dt_ms * speed).min(duration);
        if slot.elapsed_ms >= duration {
            slot.status = ContractStatus::Completed;
            tracing::debug!(contract = %slot.id, "Contract completed");
        }
    }
}

/// Claim a completed contract: grant its reward and reset the slot.
pub fn complete_contract(state: &mut GameState, id: &str) -> Result<()> {
    let def = catalog().contract(id)?;
    let Some(slot) = state.contracts.slot(id) else {
        return reject(Rejection::NotFound(id.to_string()));
    };
    if slot.status != ContractStatus::Completed {
        return reject(Rejection::NothingToDo);
    }

    let reward = slot.reward.clone();
    if let Some(slot) = state.contracts.slot_mut(id) {
        *slot = ContractSlot::idle(def);
    }
    state.grant(&reward);
    state.run_stats.contracts_completed += 1;
    Ok(())
}

/// Value per second of a contract under the balance weights.
#[must_use]
pub fn score_contract(def: &ContractData) -> f64 {
    let weights = &catalog().balance.contracts;
    let value = weights.research_weight * def.reward.get(ResourceId::Research)
        + weights.reputation_weight * def.reward.get(ResourceId::Reputation)
        + weights.essence_weight * def.net_essence();
    let seconds = (def.duration_ms.max(1) as f64) / 1000.0;
    value / seconds
}

/// Best contract that could be accepted right now.
///
/// With `prefer_progression`, contracts paying research or reputation get the
/// recommended bias. Equal scores resolve to the smallest id.
#[must_use]
pub fn recommend_contract(state: &GameState, prefer_progression: bool) -> Option<&'static ContractData> {
    let bias = catalog().balance.contracts.recommended_bias;
    let mut best: Option<(&'static ContractData, f64)> = None;

    for def in &catalog().contracts {
        if check_accept(state, def).is_err() {
            continue;
        }
        let mut score = score_contract(def);
        if prefer_progression && def.grants_progression() {
            score *= bias;
        }
        let better = match best {
            None => true,
            Some((current, current_score)) => {
                score > current_score || (score == current_score && def.id < current.id)
            }
        };
        if better {
            best = Some((def, score));
        }
    }
    best.map(|(def, _)| def)
}
