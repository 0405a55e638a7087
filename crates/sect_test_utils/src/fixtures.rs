//! Test fixtures and helpers.
//!
//! Pre-built game states and save payloads for consistent testing.

use sect_core::actions::{apply_action, Action};
use sect_core::catalog::{catalog, DiscipleRole};
use sect_core::disciples::Disciple;
use sect_core::error::Result;
use sect_core::research::ResearchNodeState;
use sect_core::state::GameState;

/// A fresh game seeded with `seed`.
pub fn fresh_state(seed: u64) -> GameState {
    GameState::new(seed)
}

/// A fresh game with enough of every resource to afford anything early.
pub fn funded_state(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    state.resources.essence = 1_000_000.0;
    state.resources.research = 10_000.0;
    state.resources.reputation = 1_000.0;
    state.resources.herb = 10_000.0;
    state.resources.ore = 10_000.0;
    state
}

/// A funded game with a disciple in each of the given roles.
///
/// Each disciple gets the first archetype allowed to take its role.
pub fn staffed_state(seed: u64, roles: &[DiscipleRole]) -> GameState {
    let mut state = funded_state(seed);
    for (index, role) in roles.iter().enumerate() {
        let Some(archetype) = catalog().archetypes.iter().find(|a| a.allows(*role)) else {
            continue;
        };
        let id = index as u32 + 1;
        state.disciples.roster.push(Disciple {
            id,
            archetype_id: archetype.id.clone(),
            role: Some(*role),
        });
        state.disciples.next_id = id + 1;
    }
    state
}

/// A funded game with every research node purchased.
pub fn researched_state(seed: u64) -> GameState {
    let mut state = funded_state(seed);
    for node in &catalog().research {
        state
            .research
            .insert(node.id.clone(), ResearchNodeState { purchased: true });
    }
    state
}

/// A game whose run has earned exactly the ascension threshold.
pub fn ascendable_state(seed: u64, contracts_completed: u64) -> GameState {
    let mut state = GameState::new(seed);
    state.run_stats.essence_earned = catalog().balance.ascension.essence_threshold;
    state.run_stats.contracts_completed = contracts_completed;
    state
}

/// A funded game with a contract, a forge task and an expedition in flight.
///
/// # Errors
///
/// Returns an error if any setup action fails fatally.
pub fn busy_state(seed: u64) -> Result<GameState> {
    let setup = [
        Action::AcceptContract {
            contract_id: "sweep_courtyard".to_string(),
        },
        Action::StartForge {
            blueprint_id: "iron_sword".to_string(),
        },
        Action::StartExpedition {
            expedition_id: "bamboo_grove".to_string(),
        },
    ];
    setup
        .iter()
        .try_fold(funded_state(seed), |state, action| {
            apply_action(&state, action, 0).map(|t| t.into_state())
        })
}

/// A legacy save from before schema versioning.
///
/// It has no envelope and lacks `research` and `runStats`.
pub fn legacy_save_json() -> String {
    serde_json::json!({
        "resources": { "essence": 250.0, "reputation": 4.0 },
        "production": {
            "basePerSecond": 1.0,
            "additiveBonus": 0.0,
            "multiplier": 1.0,
            "perSecond": 1.0
        },
        "upgrades": { "spirit_well": 3, "meditation_mat": 1 },
        "contracts": { "slots": [], "maxSlots": 1 }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funded_state_is_valid() {
        let state = funded_state(1);
        assert!(state.validate().is_empty());
        assert_eq!(state.seed, 1);
    }

    #[test]
    fn test_staffed_state_roles_allowed() {
        let roles = [DiscipleRole::ContractClerk, DiscipleRole::Smith];
        let state = staffed_state(1, &roles);
        assert_eq!(state.disciples.roster.len(), 2);
        for disciple in &state.disciples.roster {
            let archetype = catalog().archetype(&disciple.archetype_id).unwrap();
            assert!(archetype.allows(disciple.role.unwrap()));
        }
        assert_eq!(state.disciples.next_id, 3);
    }

    #[test]
    fn test_busy_state() {
        let state = busy_state(1).unwrap();
        assert_eq!(state.contracts.active_count(), 1);
        assert!(state.forging.active.is_some());
        assert!(state.expeditions.active.is_some());
    }
}
