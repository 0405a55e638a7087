//! Facility upgrades.
//!
//! Levels are linear. Reaching level `n` grants the effects of every tier up
//! to `n`; see [`Modifiers::with_facilities`](crate::modifiers::Modifiers::with_facilities).

use serde::{Deserialize, Serialize};

use crate::catalog::catalog;
use crate::contracts;
use crate::error::{reject, Rejection, Result};
use crate::production::calculate_production;
use crate::resources::ResourceBundle;
use crate::state::GameState;

/// Level of one facility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilityState {
    /// Levels gained.
    pub level: u32,
}

/// Level of a facility, zero if absent.
#[must_use]
pub fn level_of(state: &GameState, id: &str) -> u32 {
    state.facilities.get(id).map_or(0, |f| f.level)
}

/// Raise a facility by one level.
pub fn upgrade_facility(state: &mut GameState, id: &str) -> Result<()> {
    let facility = catalog().facility(id)?;
    let level = level_of(state, id);
    if level >= facility.max_level() {
        return reject(Rejection::MaxLevel);
    }

    let cost = ResourceBundle::new().with(facility.cost_resource, facility.cost_at(level));
    if !state.resources.can_afford(&cost) {
        return reject(Rejection::InsufficientResources);
    }

    state.resources.spend(&cost);
    state.facilities.entry(facility.id.clone()).or_default().level = level + 1;

    contracts::sync_slots(state)?;
    calculate_production(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[test]
    fn test_upgrade_spends_cost_resource() {
        let mut state = GameState::new(1);
        state.resources.ore = 120.0;

        upgrade_facility(&mut state, "forge_hall").unwrap();
        assert_eq!(level_of(&state, "forge_hall"), 1);
        assert_eq!(state.resources.ore, 80.0);

        upgrade_facility(&mut state, "forge_hall").unwrap();
        assert_eq!(state.resources.ore, 0.0);
    }

    #[test]
    fn test_contract_hall_adds_slot() {
        let mut state = GameState::new(1);
        state.resources.essence = 200.0;
        let before = state.contracts.max_slots;
        upgrade_facility(&mut state, "contract_hall").unwrap();
        assert_eq!(state.contracts.max_slots, before + 1);
    }

    #[test]
    fn test_production_facility_recomputes() {
        let mut state = GameState::new(1);
        state.resources.essence = 300.0;
        upgrade_facility(&mut state, "spirit_garden").unwrap();
        assert!((state.production.multiplier - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_max_level() {
        let mut state = GameState::new(1);
        state.facilities.get_mut("alchemy_lab").unwrap().level = 3;
        state.resources.herb = 1e9;
        let err = upgrade_facility(&mut state, "alchemy_lab").unwrap_err();
        assert!(matches!(err, GameError::Rejected(Rejection::MaxLevel)));
    }

    #[test]
    fn test_unaffordable() {
        let mut state = GameState::new(1);
        let err = upgrade_facility(&mut state, "alchemy_lab").unwrap_err();
        assert!(matches!(
            err,
            GameError::Rejected(Rejection::InsufficientResources)
        ));
    }
}
