//! Essence upgrade purchases.

use crate::catalog::catalog;
use crate::error::{reject, Rejection, Result};
use crate::production::calculate_production;
use crate::resources::{ResourceBundle, ResourceId};
use crate::state::GameState;

/// Owned level of an upgrade, zero if never bought.
#[must_use]
pub fn level_of(state: &GameState, id: &str) -> u32 {
    state.upgrades.get(id).copied().unwrap_or(0)
}

/// Essence cost of the next level of `id`.
pub fn next_cost(state: &GameState, id: &str) -> Result<f64> {
    Ok(catalog().upgrade(id)?.cost_at(level_of(state, id)))
}

/// Buy one level of an upgrade.
pub fn buy_upgrade(state: &mut GameState, id: &str) -> Result<()> {
    let upgrade = catalog().upgrade(id)?;
    let level = level_of(state, id);
    if upgrade.is_maxed(level) {
        return reject(Rejection::MaxLevel);
    }

    let cost = ResourceBundle::new().with(ResourceId::Essence, upgrade.cost_at(level));
    if !state.resources.can_afford(&cost) {
        return reject(Rejection::InsufficientResources);
    }

    state.resources.spend(&cost);
    state.upgrades.insert(upgrade.id.clone(), level + 1);
    calculate_production(state)
}
