//! Player actions and the single dispatch entry point.
//!
//! Actions arrive as JSON objects tagged by `type`:
//!
//! ```
//! use sect_core::actions::Action;
//!
//! let action: Action =
//!     serde_json::from_str(r#"{"type":"buyUpgrade","upgradeId":"spirit_well"}"#).unwrap();
//! assert_eq!(action, Action::BuyUpgrade { upgrade_id: "spirit_well".into() });
//!
//! let unknown: Action = serde_json::from_str(r#"{"type":"danceWildly"}"#).unwrap();
//! assert_eq!(unknown, Action::Unknown);
//! ```

use serde::{Deserialize, Serialize};

use crate::alchemy;
use crate::ascension;
use crate::automation::AutomationSettings;
use crate::catalog::{catalog, DiscipleRole, EquipSlot};
use crate::contracts;
use crate::disciples;
use crate::equipment;
use crate::error::{reject, Rejection, Result};
use crate::expeditions;
use crate::facilities;
use crate::forging;
use crate::modifiers::Modifiers;
use crate::realm;
use crate::research;
use crate::state::{GameState, Transition};
use crate::upgrades;

/// A player-issued action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Flat essence bump, gated by a cooldown.
    Focus,
    /// Buy one level of an upgrade.
    BuyUpgrade {
        /// Upgrade id.
        upgrade_id: String,
    },
    /// Buy a research node.
    BuyResearch {
        /// Research id.
        research_id: String,
    },
    /// Accept a contract into its slot.
    AcceptContract {
        /// Contract id.
        contract_id: String,
    },
    /// Claim a completed contract.
    CompleteContract {
        /// Contract id.
        contract_id: String,
    },
    /// Raise a facility by one level.
    UpgradeFacility {
        /// Facility id.
        facility_id: String,
    },
    /// Equip an owned item.
    Equip {
        /// Inventory instance id.
        instance_id: String,
    },
    /// Empty an equipment slot.
    Unequip {
        /// Slot to empty.
        slot: EquipSlot,
    },
    /// Salvage an owned item for ore.
    Disassemble {
        /// Inventory instance id.
        instance_id: String,
    },
    /// Start forging a blueprint.
    StartForge {
        /// Blueprint id.
        blueprint_id: String,
    },
    /// Start brewing a recipe.
    StartAlchemy {
        /// Recipe id.
        recipe_id: String,
    },
    /// Consume one unit and start its buff.
    UseConsumable {
        /// Consumable id.
        consumable_id: String,
    },
    /// Set out on an expedition.
    StartExpedition {
        /// Expedition id.
        expedition_id: String,
    },
    /// Recruit the next disciple.
    RecruitDisciple,
    /// Assign or clear a disciple's role.
    AssignDisciple {
        /// Roster id.
        disciple_id: u32,
        /// New role, or `None` to idle.
        role: Option<DiscipleRole>,
    },
    /// Replace the automation settings.
    SetAutomation {
        /// New settings.
        settings: AutomationSettings,
    },
    /// Prestige reset for insight.
    Ascend,
    /// Advance to the next realm.
    Breakthrough,
    /// Any unrecognized action type. Always a no-op.
    #[serde(other)]
    Unknown,
}

fn focus(state: &mut GameState, now_ms: u64) -> Result<()> {
    let balance = &catalog().balance;
    if let Some(last) = state.last_focus_ms {
        let since = now_ms.saturating_sub(last);
        if since < balance.focus_cooldown_ms {
            return reject(Rejection::OnCooldown {
                remaining_ms: balance.focus_cooldown_ms - since,
            });
        }
    }
    state.earn_essence(balance.focus_essence);
    state.last_focus_ms = Some(now_ms);
    Ok(())
}

fn dispatch(state: &mut GameState, action: &Action, now_ms: u64) -> Result<()> {
    match action {
        Action::Focus => focus(state, now_ms),
        Action::BuyUpgrade { upgrade_id } => upgrades::buy_upgrade(state, upgrade_id),
        Action::BuyResearch { research_id } => research::buy_research(state, research_id),
        Action::AcceptContract { contract_id } => contracts::accept_contract(state, contract_id),
        Action::CompleteContract { contract_id } => {
            contracts::complete_contract(state, contract_id)
        }
        Action::UpgradeFacility { facility_id } => {
            facilities::upgrade_facility(state, facility_id)
        }
        Action::Equip { instance_id } => equipment::equip(state, instance_id),
        Action::Unequip { slot } => equipment::unequip(state, *slot),
        Action::Disassemble { instance_id } => equipment::disassemble(state, instance_id),
        Action::StartForge { blueprint_id } => forging::start_forge(state, blueprint_id),
        Action::StartAlchemy { recipe_id } => alchemy::start_alchemy(state, recipe_id),
        Action::UseConsumable { consumable_id } => {
            let mods = Modifiers::for_state(state)?;
            alchemy::use_consumable(state, consumable_id, &mods)
        }
        Action::StartExpedition { expedition_id } => {
            expeditions::start_expedition(state, expedition_id)
        }
        Action::RecruitDisciple => disciples::recruit_disciple(state),
        Action::AssignDisciple { disciple_id, role } => {
            disciples::assign_disciple(state, *disciple_id, *role)
        }
        Action::SetAutomation { settings } => {
            state.automation = settings.clone();
            Ok(())
        }
        Action::Ascend => ascension::ascend(state),
        Action::Breakthrough => realm::breakthrough(state),
        Action::Unknown => reject(Rejection::NothingToDo),
    }
}

/// Apply `action` to `state` at wall-clock time `now_ms`.
///
/// Unmet preconditions produce an unchanged [`Transition`]. Only defects such
/// as an id missing from the catalog are returned as errors.
///
/// # Errors
///
/// Returns an error for unknown definition ids or corrupt state.
pub fn apply_action(state: &GameState, action: &Action, now_ms: u64) -> Result<Transition> {
    let mut next = state.clone();
    match dispatch(&mut next, action, now_ms) {
        Ok(()) => Ok(Transition::compare(state, next)),
        Err(e) if e.is_rejection() => {
            tracing::debug!(?action, reason = %e, "Action rejected");
            Ok(Transition::unchanged(state))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::AutoAcceptMode;
    use crate::contracts::ContractStatus;
    use crate::error::{DefinitionKind, GameError};

    fn focus_at(state: &GameState, now_ms: u64) -> Transition {
        apply_action(state, &Action::Focus, now_ms).unwrap()
    }

    #[test]
    fn test_focus_cooldown() {
        let balance = &catalog().balance;
        let state = GameState::new(1);

        let first = focus_at(&state, 10_000);
        assert!(first.changed);
        assert_eq!(first.state.resources.essence, balance.focus_essence);
        assert_eq!(first.state.run_stats.essence_earned, balance.focus_essence);

        let early = focus_at(&first.state, 10_000 + balance.focus_cooldown_ms - 1);
        assert!(!early.changed);
        assert_eq!(early.state, first.state);

        let later = focus_at(&first.state, 10_000 + balance.focus_cooldown_ms);
        assert!(later.changed);
        assert_eq!(later.state.resources.essence, 2.0 * balance.focus_essence);
    }

    #[test]
    fn test_focus_with_clock_behind_is_rejected() {
        let state = focus_at(&GameState::new(1), 50_000).state;
        assert!(!focus_at(&state, 1_000).changed);
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let state = GameState::new(1);
        let transition = apply_action(&state, &Action::Unknown, 0).unwrap();
        assert!(!transition.changed);
        assert_eq!(transition.state, state);
    }

    #[test]
    fn test_rejection_leaves_state_unchanged() {
        let state = GameState::new(1);
        let action = Action::BuyUpgrade {
            upgrade_id: "spirit_well".to_string(),
        };
        let transition = apply_action(&state, &action, 0).unwrap();
        assert!(!transition.changed);
        assert_eq!(transition.state, state);
    }

    #[test]
    fn test_unknown_definition_is_fatal() {
        let state = GameState::new(1);
        let action = Action::BuyUpgrade {
            upgrade_id: "golden_toilet".to_string(),
        };
        let err = apply_action(&state, &action, 0).unwrap_err();
        assert!(matches!(
            err,
            GameError::UnknownDefinition {
                kind: DefinitionKind::Upgrade,
                ..
            }
        ));
    }

    #[test]
    fn test_contract_actions() {
        let mut state = GameState::new(1);
        state.resources.essence = 100.0;
        let accept = Action::AcceptContract {
            contract_id: "sweep_courtyard".to_string(),
        };
        let claim = Action::CompleteContract {
            contract_id: "sweep_courtyard".to_string(),
        };

        let state = apply_action(&state, &accept, 0).unwrap().into_state();
        assert_eq!(
            state.contracts.slot("sweep_courtyard").unwrap().status,
            ContractStatus::Active
        );
        // Not finished yet
        assert!(!apply_action(&state, &claim, 0).unwrap().changed);
    }

    #[test]
    fn test_set_automation() {
        let state = GameState::new(1);
        let settings = AutomationSettings {
            auto_claim: true,
            auto_accept: AutoAcceptMode::Recommended,
            auto_forge: None,
        };
        let action = Action::SetAutomation {
            settings: settings.clone(),
        };
        let transition = apply_action(&state, &action, 0).unwrap();
        assert!(transition.changed);
        assert_eq!(transition.state.automation, settings);

        let again = apply_action(&transition.state, &action, 0).unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn test_wire_format() {
        let parsed: Action = serde_json::from_str(
            r#"{"type":"assignDisciple","discipleId":3,"role":"contractClerk"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Action::AssignDisciple {
                disciple_id: 3,
                role: Some(DiscipleRole::ContractClerk),
            }
        );

        let parsed: Action = serde_json::from_str(r#"{"type":"unequip","slot":"ring"}"#).unwrap();
        assert_eq!(
            parsed,
            Action::Unequip {
                slot: EquipSlot::Ring
            }
        );

        let json = serde_json::to_string(&Action::Focus).unwrap();
        assert_eq!(json, r#"{"type":"focus"}"#);
    }
}
