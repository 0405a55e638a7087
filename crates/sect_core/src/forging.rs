//! Forge queue.
//!
//! One task at a time. Rarity and affixes are rolled when the task starts and
//! travel with it, so the finished item is independent of tick granularity.

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, Rarity};
use crate::equipment::{roll_loot, EquipmentInstance, RolledAffix};
use crate::error::{reject, Rejection, Result};
use crate::research::is_purchased;
use crate::state::GameState;

/// An in-progress forge task with its pre-rolled outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeTask {
    /// Blueprint being forged.
    pub blueprint_id: String,
    /// Rolled rarity.
    pub rarity: Rarity,
    /// Rolled affixes.
    #[serde(default)]
    pub affixes: Vec<RolledAffix>,
    /// Duration at speed 1.
    pub total_ms: f64,
    /// Time left at speed 1.
    pub remaining_ms: f64,
}

/// The forge queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForgingState {
    /// Current task.
    pub active: Option<ForgeTask>,
    /// Most recent item produced.
    pub last_finished: Option<EquipmentInstance>,
}

/// Start forging a blueprint.
pub fn start_forge(state: &mut GameState, blueprint_id: &str) -> Result<()> {
    let blueprint = catalog().blueprint(blueprint_id)?;
    if state.forging.active.is_some() {
        return reject(Rejection::QueueBusy);
    }
    if let Some(research_id) = &blueprint.requires_research {
        if !is_purchased(state, research_id) {
            return reject(Rejection::Locked(blueprint.id.clone()));
        }
    }
    if !state.resources.can_afford(&blueprint.cost) {
        return reject(Rejection::InsufficientResources);
    }

    state.resources.spend(&blueprint.cost);
    let (rarity, affixes) = roll_loot(&mut state.seed)?;
    let total_ms = blueprint.duration_ms as f64;
    state.forging.active = Some(ForgeTask {
        blueprint_id: blueprint.id.clone(),
        rarity,
        affixes,
        total_ms,
        remaining_ms: total_ms,
    });
    Ok(())
}

/// Advance the forge; a finished task becomes an inventory item.
pub fn progress_forging(state: &mut GameState, dt_ms: f64, speed: f64) -> Result<()> {
    if dt_ms <= 0.0 {
        return Ok(());
    }
    let Some(task) = state.forging.active.as_mut() else {
        return Ok(());
    };
    task.remaining_ms = (task.remaining_ms - dt_ms * speed).max(0.0);
    if task.remaining_ms > 0.0 {
        return Ok(());
    }

    let Some(task) = state.forging.active.take() else {
        return Ok(());
    };
    let slot = catalog().blueprint(&task.blueprint_id)?.slot;
    let instance_id = state
        .equipment
        .insert(&task.blueprint_id, slot, task.rarity, task.affixes);
    tracing::debug!(blueprint = %task.blueprint_id, rarity = ?task.rarity, %instance_id, "Forge finished");
    state.forging.last_finished = state.equipment.items.get(&instance_id).cloned();
    Ok(())
}
