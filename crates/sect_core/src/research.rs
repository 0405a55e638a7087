//! Research tree purchases.

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, ResearchData, ResearchEffect};
use crate::contracts;
use crate::error::{reject, Rejection, Result};
use crate::production::calculate_production;
use crate::resources::{ResourceBundle, ResourceId};
use crate::state::GameState;

/// Purchase state of one research node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchNodeState {
    /// Whether the node has been bought.
    pub purchased: bool,
}

/// Whether `id` has been purchased. Unknown ids count as unpurchased.
#[must_use]
pub fn is_purchased(state: &GameState, id: &str) -> bool {
    state.research.get(id).is_some_and(|node| node.purchased)
}

fn check_purchasable(state: &GameState, node: &ResearchData) -> Result<()> {
    if is_purchased(state, &node.id) {
        return reject(Rejection::AlreadyPurchased);
    }
    if !state.realm.unlocked_research_ids.contains(&node.id) {
        return reject(Rejection::Locked(node.id.clone()));
    }
    if !node.prerequisites.iter().all(|p| is_purchased(state, p)) {
        return reject(Rejection::PrerequisitesMissing);
    }
    let cost = ResourceBundle::new().with(ResourceId::Research, node.cost);
    if !state.resources.can_afford(&cost) {
        return reject(Rejection::InsufficientResources);
    }
    Ok(())
}

/// Buy a research node, then resync contract slots and production.
pub fn buy_research(state: &mut GameState, id: &str) -> Result<()> {
    let node = catalog().research_node(id)?;
    check_purchasable(state, node)?;

    state
        .resources
        .spend(&ResourceBundle::new().with(ResourceId::Research, node.cost));
    state.research.entry(node.id.clone()).or_default().purchased = true;

    for effect in &node.effects {
        if let ResearchEffect::UnlockExpedition(expedition_id) = effect {
            state.expeditions.unlocked.insert(expedition_id.clone());
        }
    }

    contracts::sync_slots(state)?;
    calculate_production(state)
}

/// Nodes currently purchasable, in catalog order.
#[must_use]
pub fn available_research(state: &GameState) -> Vec<&'static ResearchData> {
    catalog()
        .research
        .iter()
        .filter(|node| check_purchasable(state, node).is_ok())
        .collect()
}
