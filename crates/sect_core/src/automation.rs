//! Disciple-driven automation.
//!
//! Settings are player configuration stored in the state. They only take
//! effect while the matching role is staffed: a contract clerk for claiming
//! and accepting contracts, a smith for auto-forge.

use serde::{Deserialize, Serialize};

use crate::contracts::{self, ContractStatus};
use crate::error::Result;
use crate::forging;
use crate::modifiers::Modifiers;
use crate::state::GameState;

/// How contracts are picked for auto-accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoAcceptMode {
    /// Never auto-accept.
    #[default]
    Off,
    /// Highest score with the progression bias.
    Recommended,
    /// Highest raw score.
    HighestScore,
}

/// Player automation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationSettings {
    /// Claim completed contracts.
    pub auto_claim: bool,
    /// Accept contracts into free slots.
    pub auto_accept: AutoAcceptMode,
    /// Blueprint to forge whenever the forge is idle.
    pub auto_forge: Option<String>,
}

/// Run one automation pass.
pub fn run_automation(state: &mut GameState, mods: &Modifiers) -> Result<()> {
    if mods.can_auto_contracts {
        if state.automation.auto_claim {
            let completed: Vec<String> = state
                .contracts
                .slots
                .iter()
                .filter(|s| s.status == ContractStatus::Completed)
                .map(|s| s.id.clone())
                .collect();
            for id in completed {
                contracts::complete_contract(state, &id)?;
            }
        }

        let prefer_progression = match state.automation.auto_accept {
            AutoAcceptMode::Off => None,
            AutoAcceptMode::Recommended => Some(true),
            AutoAcceptMode::HighestScore => Some(false),
        };
        if let Some(prefer_progression) = prefer_progression {
            // Each acceptance fills a slot, so this terminates.
            while let Some(def) = contracts::recommend_contract(state, prefer_progression) {
                contracts::accept_contract(state, &def.id)?;
            }
        }
    }

    if mods.can_auto_forge && state.forging.active.is_none() {
        if let Some(blueprint_id) = state.automation.auto_forge.clone() {
            match forging::start_forge(state, &blueprint_id) {
                Err(e) if e.is_rejection() => {
                    tracing::debug!(blueprint = %blueprint_id, reason = %e, "Auto-forge skipped");
                }
                other => other?,
            }
        }
    }
    Ok(())
}
