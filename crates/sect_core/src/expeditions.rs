//! Expeditions.
//!
//! Unlike the other queues an expedition consumes time in sub-steps bounded by
//! its event countdown. Whenever the countdown runs out before the run ends a
//! random event fires. Live ticking and a single large offline delta walk the
//! same boundaries, so both produce identical results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, ExpeditionData, RewardKind};
use crate::equipment::grant_rolled_item;
use crate::error::{reject, GameError, Rejection, Result};
use crate::modifiers::Modifiers;
use crate::resources::{ResourceBundle, ResourceId};
use crate::rng::{pick_index, pick_weighted};
use crate::state::GameState;

/// Log key for a shortcut event.
pub const EVENT_SHORTCUT: &str = "shortcut";
/// Log key for a detour event.
pub const EVENT_DETOUR: &str = "detour";
/// Log key for a detour shortened by a disciple.
pub const EVENT_DETOUR_MITIGATED: &str = "detourMitigated";
/// Log key for a bonus reward roll.
pub const EVENT_BONUS_ROLL: &str = "bonusRoll";
/// Log key for a bonus roll boosted by a disciple.
pub const EVENT_BONUS_ROLL_AMPLIFIED: &str = "bonusRollAmplified";
/// Log key for an uneventful interval.
pub const EVENT_CALM: &str = "calm";

/// An expedition in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionRun {
    /// Expedition id.
    pub expedition_id: String,
    /// Time left, in expedition time.
    pub remaining_ms: f64,
    /// Countdown to the next event.
    pub next_event_ms: f64,
    /// Reward rolls granted on completion.
    pub reward_rolls_remaining: u32,
    /// Event keys in the order they fired.
    #[serde(default)]
    pub log: Vec<String>,
}

/// One reward granted by a finished expedition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpeditionReward {
    /// Resource amount.
    Resource {
        /// Resource granted.
        resource: ResourceId,
        /// Amount granted.
        amount: f64,
    },
    /// Recipe discovered.
    Recipe {
        /// Recipe id.
        recipe_id: String,
    },
    /// Equipment instance added to inventory.
    Equipment {
        /// New instance id.
        instance_id: String,
    },
}

/// Summary of the last finished expedition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionResult {
    /// Expedition id.
    pub expedition_id: String,
    /// Rewards in roll order.
    #[serde(default)]
    pub rewards: Vec<ExpeditionReward>,
    /// Event log of the run.
    #[serde(default)]
    pub log: Vec<String>,
}

/// Expedition queue and unlocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpeditionState {
    /// Current run.
    pub active: Option<ExpeditionRun>,
    /// Last finished run.
    pub last_result: Option<ExpeditionResult>,
    /// Expedition ids that may be started.
    pub unlocked: BTreeSet<String>,
}

impl ExpeditionState {
    /// Initial state with default unlocks.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            unlocked: catalog()
                .expeditions
                .iter()
                .filter(|e| e.unlocked_by_default)
                .map(|e| e.id.clone())
                .collect(),
            ..Self::default()
        }
    }
}

/// Start an expedition.
pub fn start_expedition(state: &mut GameState, expedition_id: &str) -> Result<()> {
    let def = catalog().expedition(expedition_id)?;
    if state.expeditions.active.is_some() {
        return reject(Rejection::QueueBusy);
    }
    if !state.expeditions.unlocked.contains(expedition_id) {
        return reject(Rejection::Locked(def.id.clone()));
    }
    if !state.resources.can_afford(&def.cost) {
        return reject(Rejection::InsufficientResources);
    }

    state.resources.spend(&def.cost);
    state.expeditions.active = Some(ExpeditionRun {
        expedition_id: def.id.clone(),
        remaining_ms: def.duration_ms as f64,
        next_event_ms: def.event_interval_ms as f64,
        reward_rolls_remaining: def.reward_rolls,
        log: Vec::new(),
    });
    Ok(())
}

fn fire_event(run: &mut ExpeditionRun, seed: &mut u32, mods: &Modifiers) {
    let tuning = &catalog().balance.expeditions;
    let key = match pick_index(seed, 4) {
        Some(0) => {
            run.remaining_ms = (run.remaining_ms - tuning.shortcut_ms).max(0.0);
            EVENT_SHORTCUT
        }
        Some(1) => {
            if mods.mitigates_detours {
                run.remaining_ms += (tuning.detour_ms - tuning.detour_mitigation_ms).max(0.0);
                EVENT_DETOUR_MITIGATED
            } else {
                run.remaining_ms += tuning.detour_ms;
                EVENT_DETOUR
            }
        }
        Some(2) => {
            run.reward_rolls_remaining += tuning.bonus_rolls;
            if mods.amplifies_bonus_rolls {
                run.reward_rolls_remaining += tuning.amplified_bonus_rolls;
                EVENT_BONUS_ROLL_AMPLIFIED
            } else {
                EVENT_BONUS_ROLL
            }
        }
        _ => EVENT_CALM,
    };
    run.log.push(key.to_string());
}

fn grant_rewards(
    state: &mut GameState,
    def: &ExpeditionData,
    rolls: u32,
) -> Result<Vec<ExpeditionReward>> {
    let mut rewards = Vec::with_capacity(rolls as usize);
    for _ in 0..rolls {
        let Some(entry) = pick_weighted(&mut state.seed, &def.rewards, |e| e.weight) else {
            return Err(GameError::InvalidCatalog(format!(
                "expedition '{}' has no positive reward weight",
                def.id
            )));
        };
        let reward = match &entry.reward {
            RewardKind::Resource { resource, amount } => {
                state.grant(&ResourceBundle::new().with(*resource, *amount));
                ExpeditionReward::Resource {
                    resource: *resource,
                    amount: *amount,
                }
            }
            RewardKind::Recipe { recipe_id } => {
                state.alchemy.discovered_recipes.insert(recipe_id.clone());
                ExpeditionReward::Recipe {
                    recipe_id: recipe_id.clone(),
                }
            }
            RewardKind::Equipment { blueprint_id } => ExpeditionReward::Equipment {
                instance_id: grant_rolled_item(state, blueprint_id)?,
            },
        };
        rewards.push(reward);
    }
    Ok(rewards)
}

/// Advance the active expedition through event boundaries.
pub fn progress_expedition(state: &mut GameState, dt_ms: f64, mods: &Modifiers) -> Result<()> {
    if dt_ms <= 0.0 {
        return Ok(());
    }
    let Some(mut run) = state.expeditions.active.take() else {
        return Ok(());
    };
    let def = catalog().expedition(&run.expedition_id)?;
    let interval = def.event_interval_ms as f64;

    let mut budget = dt_ms * mods.expedition_speed;
    while budget > 0.0 && run.remaining_ms > 0.0 {
        let step = budget.min(run.remaining_ms).min(run.next_event_ms);
        budget -= step;
        run.remaining_ms -= step;
        run.next_event_ms -= step;

        if run.next_event_ms <= 0.0 && run.remaining_ms > 0.0 {
            fire_event(&mut run, &mut state.seed, mods);
            run.next_event_ms = interval;
        }
    }

    if run.remaining_ms > 0.0 {
        state.expeditions.active = Some(run);
        return Ok(());
    }

    let rewards = grant_rewards(state, def, run.reward_rolls_remaining)?;
    tracing::debug!(
        expedition = %def.id,
        rewards = rewards.len(),
        events = run.log.len(),
        "Expedition finished"
    );
    state.expeditions.last_result = Some(ExpeditionResult {
        expedition_id: run.expedition_id,
        rewards,
        log: run.log,
    });
    Ok(())
}
