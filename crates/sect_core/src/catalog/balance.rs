//! Tunable balance constants, loaded from `data/balance.ron`.

use serde::{Deserialize, Serialize};

use super::equipment_data::RarityData;

/// Insight gain formula and gate.
///
/// `gain = floor(log_scale * ln(1 + essence / log_divisor) + contract_scale * sqrt(contracts))`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AscensionBalance {
    /// Essence earned this run required to ascend.
    pub essence_threshold: f64,
    /// Coefficient on the logarithmic essence term.
    pub log_scale: f64,
    /// Essence divisor inside the logarithm.
    pub log_divisor: f64,
    /// Coefficient on the square-root contract term.
    pub contract_scale: f64,
}

/// Offline catch-up defaults before facility bonuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineBalance {
    /// Longest absence credited, in milliseconds.
    pub cap_ms: u64,
    /// Fraction of the capped absence credited.
    pub efficiency: f64,
}

/// Contract capacity and scoring weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractBalance {
    /// Active slots before research and facilities.
    pub base_slots: u32,
    /// Score weight on research rewards.
    pub research_weight: f64,
    /// Score weight on reputation rewards.
    pub reputation_weight: f64,
    /// Score weight on net essence.
    pub essence_weight: f64,
    /// Score multiplier for progression-bearing contracts in recommended mode.
    pub recommended_bias: f64,
}

/// Disciple recruitment and role rates, all per point of aptitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscipleBalance {
    /// Essence cost of the first recruit.
    pub recruit_base_cost: f64,
    /// Cost multiplier per disciple already recruited.
    pub recruit_cost_growth: f64,
    /// Largest roster allowed.
    pub max_roster: u32,
    /// Herb/sec for gatherers.
    pub herb_per_aptitude: f64,
    /// Ore/sec for miners.
    pub ore_per_aptitude: f64,
    /// Research/sec for scholars.
    pub research_per_aptitude: f64,
    /// Contract speed bonus for clerks.
    pub clerk_speed_per_aptitude: f64,
    /// Forge speed bonus for smiths.
    pub smith_speed_per_aptitude: f64,
    /// Alchemy speed bonus for alchemists.
    pub alchemist_speed_per_aptitude: f64,
}

/// Magnitudes of mid-run expedition events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpeditionBalance {
    /// Time removed by a shortcut.
    pub shortcut_ms: f64,
    /// Time added by a detour.
    pub detour_ms: f64,
    /// Detour reduction when a mitigating role is assigned.
    pub detour_mitigation_ms: f64,
    /// Rolls added by a bonus event.
    pub bonus_rolls: u32,
    /// Extra rolls when an amplifying role is assigned.
    pub amplified_bonus_rolls: u32,
}

/// All balance constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// Essence/sec before any modifier.
    pub base_essence_per_second: f64,
    /// Essence granted by the focus action.
    pub focus_essence: f64,
    /// Minimum wall-clock gap between focus actions.
    pub focus_cooldown_ms: u64,
    /// Production bonus per point of insight (0.02 = +2%).
    pub insight_production_bonus: f64,
    /// Ascension formula.
    pub ascension: AscensionBalance,
    /// Offline catch-up.
    pub offline: OfflineBalance,
    /// Contract capacity and scoring.
    pub contracts: ContractBalance,
    /// Rarity roll table, in ascending rarity.
    pub rarities: Vec<RarityData>,
    /// Disciple rates.
    pub disciples: DiscipleBalance,
    /// Expedition events.
    pub expeditions: ExpeditionBalance,
}
