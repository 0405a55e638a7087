//! Ascension: the prestige reset.
//!
//! ```text
//! gain = max(1, floor(A * ln(1 + essenceEarned / B) + C * sqrt(contractsCompleted)))
//! ```
//!
//! Ascending keeps insight, research, facilities, equipment, consumables,
//! disciples, discovered recipes, unlocked expeditions, automation settings
//! and the seed. It resets the other resources, run stats, upgrades, realm,
//! contracts and active buffs.

use serde::{Deserialize, Serialize};

use crate::catalog::catalog;
use crate::contracts::{self, ContractsState};
use crate::error::{reject, Rejection, Result};
use crate::production::calculate_production;
use crate::realm::RealmState;
use crate::state::{GameState, RunStats};

/// Lifetime ascension counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AscensionState {
    /// Times ascended.
    pub count: u32,
    /// Insight earned across all ascensions.
    pub total_insight_earned: f64,
}

/// Raw insight formula, before flooring.
#[must_use]
pub fn insight_formula(essence_earned: f64, contracts_completed: u64) -> f64 {
    let tuning = &catalog().balance.ascension;
    tuning.log_scale * (essence_earned / tuning.log_divisor).ln_1p()
        + tuning.contract_scale * (contracts_completed as f64).sqrt()
}

/// Whether this run has earned enough essence to ascend.
#[must_use]
pub fn can_ascend(state: &GameState) -> bool {
    state.run_stats.essence_earned >= catalog().balance.ascension.essence_threshold
}

/// Insight an ascension would grant now, or `None` below the threshold.
#[must_use]
pub fn pending_insight(state: &GameState) -> Option<f64> {
    can_ascend(state).then(|| {
        let stats = &state.run_stats;
        insight_formula(stats.essence_earned, stats.contracts_completed)
            .floor()
            .max(1.0)
    })
}

/// Reset the run in exchange for insight.
pub fn ascend(state: &mut GameState) -> Result<()> {
    let Some(gain) = pending_insight(state) else {
        return reject(Rejection::RequirementsNotMet);
    };
    let catalog = catalog();

    state.resources = state.resources.keep_insight();
    state.resources.insight += gain;
    state.run_stats = RunStats::default();
    state.upgrades = catalog.upgrades.iter().map(|u| (u.id.clone(), 0)).collect();
    state.realm = RealmState::initial();
    state.contracts = ContractsState::fresh(catalog.balance.contracts.base_slots);
    state.buffs.clear();
    state.ascension.count += 1;
    state.ascension.total_insight_earned += gain;

    tracing::info!(
        gain,
        insight = state.resources.insight,
        count = state.ascension.count,
        "Ascended"
    );

    contracts::sync_slots(state)?;
    calculate_production(state)
}
