//! Alchemy queue, consumables and buffs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, BuffEffect};
use crate::error::{reject, Rejection, Result};
use crate::modifiers::Modifiers;
use crate::production::calculate_production;
use crate::state::GameState;

/// An in-progress brew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlchemyTask {
    /// Recipe being brewed.
    pub recipe_id: String,
    /// Duration at speed 1.
    pub total_ms: f64,
    /// Time left at speed 1.
    pub remaining_ms: f64,
}

/// The alchemy queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlchemyState {
    /// Current brew.
    pub active: Option<AlchemyTask>,
    /// Consumable id of the most recent brew.
    pub last_finished: Option<String>,
    /// Recipes found on expeditions. Kept across ascension.
    pub discovered_recipes: BTreeSet<String>,
}

/// A time-limited consumable effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBuff {
    /// Consumable that granted the buff.
    pub consumable_id: String,
    /// Effect while active.
    pub effect: BuffEffect,
    /// Time left. Removed at or below zero.
    pub remaining_ms: f64,
}

/// Whether `recipe_id` may be brewed.
#[must_use]
pub fn recipe_unlocked(state: &GameState, recipe_id: &str) -> bool {
    state.realm.unlocked_recipe_ids.contains(recipe_id)
        || state.alchemy.discovered_recipes.contains(recipe_id)
}

/// Start brewing a recipe.
pub fn start_alchemy(state: &mut GameState, recipe_id: &str) -> Result<()> {
    let recipe = catalog().recipe(recipe_id)?;
    if state.alchemy.active.is_some() {
        return reject(Rejection::QueueBusy);
    }
    if !recipe_unlocked(state, recipe_id) {
        return reject(Rejection::Locked(recipe.id.clone()));
    }
    if !state.resources.can_afford(&recipe.cost) {
        return reject(Rejection::InsufficientResources);
    }

    state.resources.spend(&recipe.cost);
    let total_ms = recipe.duration_ms as f64;
    state.alchemy.active = Some(AlchemyTask {
        recipe_id: recipe.id.clone(),
        total_ms,
        remaining_ms: total_ms,
    });
    Ok(())
}

/// Advance the brew; a finished one adds its consumables to inventory.
pub fn progress_alchemy(state: &mut GameState, dt_ms: f64, speed: f64) -> Result<()> {
    if dt_ms <= 0.0 {
        return Ok(());
    }
    let Some(task) = state.alchemy.active.as_mut() else {
        return Ok(());
    };
    task.remaining_ms = (task.remaining_ms - dt_ms * speed).max(0.0);
    if task.remaining_ms > 0.0 {
        return Ok(());
    }

    let Some(task) = state.alchemy.active.take() else {
        return Ok(());
    };
    let recipe = catalog().recipe(&task.recipe_id)?;
    *state.consumables.entry(recipe.output.clone()).or_insert(0) += recipe.output_count;
    state.alchemy.last_finished = Some(recipe.output.clone());
    tracing::debug!(recipe = %recipe.id, count = recipe.output_count, "Brew finished");
    Ok(())
}

/// Consume one unit and start or refresh its buff.
///
/// Refreshing keeps the longer of the remaining and the new duration.
pub fn use_consumable(state: &mut GameState, consumable_id: &str, mods: &Modifiers) -> Result<()> {
    let consumable = catalog().consumable(consumable_id)?;
    let owned = state.consumables.get(consumable_id).copied().unwrap_or(0);
    if owned == 0 {
        return reject(Rejection::InsufficientResources);
    }

    state.consumables.insert(consumable.id.clone(), owned - 1);
    let duration = consumable.duration_ms as f64 * (1.0 + mods.buff_duration);
    match state
        .buffs
        .iter_mut()
        .find(|b| b.consumable_id == consumable.id)
    {
        Some(buff) => buff.remaining_ms = buff.remaining_ms.max(duration),
        None => state.buffs.push(ActiveBuff {
            consumable_id: consumable.id.clone(),
            effect: consumable.effect,
            remaining_ms: duration,
        }),
    }

    if consumable.effect.affects_production() {
        calculate_production(state)?;
    }
    Ok(())
}

/// Count every buff down, dropping expired ones.
///
/// Returns whether any buff expired.
pub fn decay_buffs(state: &mut GameState, dt_ms: f64) -> bool {
    if dt_ms <= 0.0 || state.buffs.is_empty() {
        return false;
    }
    let before = state.buffs.len();
    for buff in &mut state.buffs {
        buff.remaining_ms -= dt_ms;
    }
    state.buffs.retain(|b| b.remaining_ms > 0.0);
    state.buffs.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    fn create_test_state() -> GameState {
        let mut state = GameState::new(1);
        state.resources.herb = 100.0;
        state.resources.essence = 100.0;
        state.resources.ore = 100.0;
        state
            .realm
            .unlocked_recipe_ids
            .insert("qi_pill".to_string());
        state
    }

    fn neutral() -> Modifiers {
        Modifiers::base(&catalog().balance)
    }

    #[test]
    fn test_brew_cycle() {
        let mut state = create_test_state();
        start_alchemy(&mut state, "qi_pill").unwrap();
        assert_eq!(state.resources.herb, 90.0);

        progress_alchemy(&mut state, 10_000.0, 2.0).unwrap();
        assert!(state.alchemy.active.is_none());
        assert_eq!(state.consumables.get("qi_pill"), Some(&1));
        assert_eq!(state.alchemy.last_finished.as_deref(), Some("qi_pill"));
    }

    #[test]
    fn test_locked_recipe() {
        let mut state = create_test_state();
        let err = start_alchemy(&mut state, "forge_oil").unwrap_err();
        assert!(matches!(err, GameError::Rejected(Rejection::Locked(_))));

        state
            .alchemy
            .discovered_recipes
            .insert("forge_oil".to_string());
        start_alchemy(&mut state, "forge_oil").unwrap();
        progress_alchemy(&mut state, 30_000.0, 1.0).unwrap();
        assert_eq!(state.consumables.get("forge_oil"), Some(&2));
    }

    #[test]
    fn test_queue_busy() {
        let mut state = create_test_state();
        start_alchemy(&mut state, "qi_pill").unwrap();
        let err = start_alchemy(&mut state, "qi_pill").unwrap_err();
        assert!(matches!(err, GameError::Rejected(Rejection::QueueBusy)));
    }

    #[test]
    fn test_use_consumable_buffs_production() {
        let mut state = create_test_state();
        state.consumables.insert("qi_pill".to_string(), 1);
        use_consumable(&mut state, "qi_pill", &neutral()).unwrap();

        assert_eq!(state.consumables.get("qi_pill"), Some(&0));
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.production.multiplier, 1.5);

        let err = use_consumable(&mut state, "qi_pill", &neutral()).unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_refresh_keeps_longer_duration() {
        let mut state = create_test_state();
        state.consumables.insert("qi_pill".to_string(), 2);
        use_consumable(&mut state, "qi_pill", &neutral()).unwrap();
        state.buffs[0].remaining_ms = 90_000.0;
        use_consumable(&mut state, "qi_pill", &neutral()).unwrap();
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].remaining_ms, 90_000.0);

        state.buffs[0].remaining_ms = 10.0;
        state.consumables.insert("qi_pill".to_string(), 1);
        use_consumable(&mut state, "qi_pill", &neutral()).unwrap();
        assert_eq!(state.buffs[0].remaining_ms, 60_000.0);
    }

    #[test]
    fn test_buff_duration_bonus() {
        let mut state = create_test_state();
        state.consumables.insert("vigor_draught".to_string(), 1);
        let mut mods = neutral();
        mods.buff_duration = 0.5;
        use_consumable(&mut state, "vigor_draught", &mods).unwrap();
        assert_eq!(state.buffs[0].remaining_ms, 180_000.0);
    }

    #[test]
    fn test_decay_removes_expired() {
        let mut state = create_test_state();
        state.buffs.push(ActiveBuff {
            consumable_id: "qi_pill".to_string(),
            effect: BuffEffect::ProductionMult(1.5),
            remaining_ms: 500.0,
        });
        assert!(!decay_buffs(&mut state, 499.0));
        assert_eq!(state.buffs.len(), 1);
        assert!(decay_buffs(&mut state, 1.0));
        assert!(state.buffs.is_empty());
    }
}
