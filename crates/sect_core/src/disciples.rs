//! Disciple roster.
//!
//! Archetypes are handed out round-robin in catalog order. Role effects
//! scale with the archetype's aptitude and are aggregated in
//! [`Modifiers::with_disciples`](crate::modifiers::Modifiers::with_disciples).

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, DiscipleRole};
use crate::error::{reject, Rejection, Result};
use crate::modifiers::Modifiers;
use crate::resources::{ResourceBundle, ResourceId};
use crate::state::GameState;

/// One recruited disciple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disciple {
    /// Roster id.
    pub id: u32,
    /// Archetype assigned at recruitment.
    pub archetype_id: String,
    /// Current job, if any.
    pub role: Option<DiscipleRole>,
}

/// The roster and its counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisciplesState {
    /// Recruited disciples.
    pub roster: Vec<Disciple>,
    /// Next roster id.
    pub next_id: u32,
    /// Position in the archetype rotation.
    pub next_archetype_index: u32,
}

impl Default for DisciplesState {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            next_id: 1,
            next_archetype_index: 0,
        }
    }
}

/// Essence cost of the next recruit.
#[must_use]
pub fn recruit_cost(state: &GameState) -> f64 {
    let rates = &catalog().balance.disciples;
    let size = state.disciples.roster.len() as i32;
    (rates.recruit_base_cost * rates.recruit_cost_growth.powi(size)).floor()
}

/// Recruit a disciple with the next archetype in rotation.
pub fn recruit_disciple(state: &mut GameState) -> Result<()> {
    let catalog = catalog();
    if state.disciples.roster.len() >= catalog.balance.disciples.max_roster as usize {
        return reject(Rejection::CapacityReached);
    }
    let cost = ResourceBundle::new().with(ResourceId::Essence, recruit_cost(state));
    if !state.resources.can_afford(&cost) {
        return reject(Rejection::InsufficientResources);
    }

    let rotation = catalog.archetypes.len() as u32;
    let index = state.disciples.next_archetype_index % rotation;
    let archetype = &catalog.archetypes[index as usize];

    state.resources.spend(&cost);
    let disciples = &mut state.disciples;
    disciples.roster.push(Disciple {
        id: disciples.next_id,
        archetype_id: archetype.id.clone(),
        role: None,
    });
    disciples.next_id += 1;
    disciples.next_archetype_index = (index + 1) % rotation;
    Ok(())
}

/// Assign a role, or clear it with `None`.
pub fn assign_disciple(
    state: &mut GameState,
    disciple_id: u32,
    role: Option<DiscipleRole>,
) -> Result<()> {
    let Some(disciple) = state
        .disciples
        .roster
        .iter_mut()
        .find(|d| d.id == disciple_id)
    else {
        return reject(Rejection::NotFound(format!("disciple {disciple_id}")));
    };
    if disciple.role == role {
        return reject(Rejection::NothingToDo);
    }
    if let Some(role) = role {
        if !catalog().archetype(&disciple.archetype_id)?.allows(role) {
            return reject(Rejection::RoleNotAllowed);
        }
    }
    disciple.role = role;
    Ok(())
}

/// Add passive disciple income for `dt_ms`.
pub fn gather_resources(state: &mut GameState, mods: &Modifiers, dt_ms: f64) {
    if dt_ms <= 0.0 {
        return;
    }
    let seconds = dt_ms / 1000.0;
    let gathered = mods.gather_mult * seconds;
    state.resources.herb += mods.herb_per_second * gathered;
    state.resources.ore += mods.ore_per_second * gathered;
    state.resources.research += mods.research_per_second * gathered;
}
