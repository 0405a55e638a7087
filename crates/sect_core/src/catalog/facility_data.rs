//! Facility definitions.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;
use crate::resources::ResourceId;

/// Effect unlocked by reaching a facility level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FacilityEffect {
    /// Multiplies essence production.
    ProductionMult(f64),
    /// Adds active contract slots.
    ContractSlots(u32),
    /// Adds to the contract speed multiplier.
    ContractSpeed(f64),
    /// Adds to the forge speed multiplier.
    ForgeSpeed(f64),
    /// Adds to the alchemy speed multiplier.
    AlchemySpeed(f64),
    /// Extends consumable buff durations by a fraction.
    BuffDuration(f64),
    /// Raises the offline catch-up cap by hours.
    OfflineCapHours(f64),
    /// Adds to offline efficiency.
    OfflineEfficiency(f64),
}

/// Data-driven facility definition.
///
/// `levels[i]` lists the effects gained on reaching level `i + 1`. Effects
/// stack across every level reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Resource spent on upgrades.
    pub cost_resource: ResourceId,
    /// Cost of the first level.
    pub base_cost: f64,
    /// Cost multiplier per level.
    pub cost_growth: f64,
    /// Effect tiers, one per level.
    pub levels: Vec<Vec<FacilityEffect>>,
}

impl FacilityData {
    /// Highest reachable level.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Cost to go from `level` to `level + 1`.
    #[must_use]
    pub fn cost_at(&self, level: u32) -> f64 {
        (self.base_cost * self.cost_growth.powi(level as i32)).floor()
    }

    /// Every effect unlocked at or below `level`.
    pub fn effects_up_to(&self, level: u32) -> impl Iterator<Item = &FacilityEffect> {
        let reached = (level as usize).min(self.levels.len());
        self.levels[..reached].iter().flatten()
    }
}

impl Definition for FacilityData {
    const KIND: DefinitionKind = DefinitionKind::Facility;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_accumulate() {
        let facility = FacilityData {
            id: "contract_hall".to_string(),
            name: "facility.contract_hall.name".to_string(),
            cost_resource: ResourceId::Essence,
            base_cost: 200.0,
            cost_growth: 2.0,
            levels: vec![
                vec![FacilityEffect::ContractSlots(1)],
                vec![FacilityEffect::ContractSpeed(0.1)],
                vec![FacilityEffect::ContractSlots(1)],
            ],
        };
        assert_eq!(facility.max_level(), 3);
        assert_eq!(facility.effects_up_to(0).count(), 0);
        assert_eq!(facility.effects_up_to(2).count(), 2);
        assert_eq!(facility.effects_up_to(99).count(), 3);
        assert_eq!(facility.cost_at(2), 800.0);
    }
}
