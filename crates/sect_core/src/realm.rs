//! Realm ladder and breakthroughs.
//!
//! Realms are strictly ordered. Breaking through to the next realm requires
//! every threshold it sets; unlock sets only ever grow until ascension resets
//! them to the initial realm's.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, RealmData, RealmRequirements};
use crate::error::{reject, Rejection, Result};
use crate::state::GameState;

/// Current realm and accumulated unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmState {
    /// Current realm id.
    pub current: String,
    /// UI tabs unlocked.
    pub unlocked_tabs: BTreeSet<String>,
    /// Contract ids that may be accepted.
    pub unlocked_contract_ids: BTreeSet<String>,
    /// Research ids that may be purchased.
    pub unlocked_research_ids: BTreeSet<String>,
    /// Recipe ids that may be brewed.
    pub unlocked_recipe_ids: BTreeSet<String>,
}

impl RealmState {
    /// Realm state at the start of a run.
    #[must_use]
    pub fn initial() -> Self {
        let initial = catalog().initial_realm();
        let mut state = Self {
            current: initial.id.clone(),
            unlocked_tabs: BTreeSet::new(),
            unlocked_contract_ids: BTreeSet::new(),
            unlocked_research_ids: BTreeSet::new(),
            unlocked_recipe_ids: BTreeSet::new(),
        };
        state.absorb(initial);
        state
    }

    fn absorb(&mut self, realm: &RealmData) {
        let unlocks = &realm.unlocks;
        self.unlocked_tabs.extend(unlocks.tabs.iter().cloned());
        self.unlocked_contract_ids
            .extend(unlocks.contracts.iter().cloned());
        self.unlocked_research_ids
            .extend(unlocks.research.iter().cloned());
        self.unlocked_recipe_ids.extend(unlocks.recipes.iter().cloned());
    }
}

/// Whether every present threshold holds for `state`.
#[must_use]
pub fn requirements_met(state: &GameState, req: &RealmRequirements) -> bool {
    req.essence_earned
        .map_or(true, |min| state.run_stats.essence_earned >= min)
        && req
            .contracts_completed
            .map_or(true, |min| state.run_stats.contracts_completed >= min)
        && req
            .reputation
            .map_or(true, |min| state.resources.reputation >= min)
}

/// The realm after the current one, if any.
pub fn next_realm(state: &GameState) -> Result<Option<&'static RealmData>> {
    let catalog = catalog();
    let index = catalog.realm_index(&state.realm.current)?;
    Ok(catalog.realms.get(index + 1))
}

/// Advance to the next realm.
pub fn breakthrough(state: &mut GameState) -> Result<()> {
    let Some(next) = next_realm(state)? else {
        return reject(Rejection::NothingToDo);
    };
    if !requirements_met(state, &next.requirements) {
        return reject(Rejection::RequirementsNotMet);
    }

    tracing::info!(from = %state.realm.current, to = %next.id, "Breakthrough");
    state.realm.current = next.id.clone();
    state.realm.absorb(next);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    fn create_qualified_state() -> GameState {
        let mut state = GameState::new(1);
        state.run_stats.essence_earned = 1e9;
        state.run_stats.contracts_completed = 1_000;
        state.resources.reputation = 1e6;
        state
    }

    #[test]
    fn test_initial_unlocks() {
        let realm = RealmState::initial();
        assert!(realm.unlocked_contract_ids.contains("sweep_courtyard"));
        assert!(!realm.unlocked_contract_ids.contains("hunt_beasts"));
    }

    #[test]
    fn test_breakthrough_requires_all_thresholds() {
        let mut state = GameState::new(1);
        state.run_stats.essence_earned = 5_000.0;
        // contracts_completed still short
        let err = breakthrough(&mut state).unwrap_err();
        assert!(matches!(
            err,
            GameError::Rejected(Rejection::RequirementsNotMet)
        ));
        assert_eq!(state.realm.current, "mortal");
    }

    #[test]
    fn test_breakthrough_accumulates_unlocks() {
        let mut state = create_qualified_state();
        breakthrough(&mut state).unwrap();
        breakthrough(&mut state).unwrap();
        assert_eq!(state.realm.current, "foundation");
        assert!(state.realm.unlocked_contract_ids.contains("sweep_courtyard"));
        assert!(state.realm.unlocked_contract_ids.contains("hunt_beasts"));
        assert!(state.realm.unlocked_contract_ids.contains("guard_caravan"));
        assert!(state.realm.unlocked_recipe_ids.contains("vigor_draught"));
    }

    #[test]
    fn test_breakthrough_past_last_realm_is_noop() {
        let mut state = create_qualified_state();
        let realms = catalog().realms.len();
        for _ in 1..realms {
            breakthrough(&mut state).unwrap();
        }
        let before = state.clone();
        assert!(breakthrough(&mut state).unwrap_err().is_rejection());
        assert_eq!(state, before);
    }

    #[test]
    fn test_omitted_requirements_pass() {
        let state = GameState::new(1);
        assert!(requirements_met(&state, &RealmRequirements::default()));
    }
}
