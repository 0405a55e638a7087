//! Research tree data structures.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;

/// Permanent effect granted by a purchased research node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResearchEffect {
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
    /// Adds to the expedition speed multiplier.
    ExpeditionSpeed(f64),
    /// Unlocks an expedition by id.
    UnlockExpedition(String),
}

/// Data-driven research node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Research point cost.
    pub cost: f64,
    /// Research ids that must be purchased first.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Effects applied once purchased.
    #[serde(default)]
    pub effects: Vec<ResearchEffect>,
}

impl ResearchData {
    /// Check if this node has a specific prerequisite.
    #[must_use]
    pub fn requires(&self, research_id: &str) -> bool {
        self.prerequisites.iter().any(|r| r == research_id)
    }

    /// Contract slots granted by this node.
    #[must_use]
    pub fn contract_slots(&self) -> u32 {
        self.effects
            .iter()
            .map(|e| match e {
                ResearchEffect::ContractSlots(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

impl Definition for ResearchData {
    const KIND: DefinitionKind = DefinitionKind::Research;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_and_slots() {
        let node = ResearchData {
            id: "meridian_mapping".to_string(),
            name: "research.meridian_mapping.name".to_string(),
            cost: 10.0,
            prerequisites: vec!["focused_breathing".to_string()],
            effects: vec![
                ResearchEffect::ContractSlots(1),
                ResearchEffect::ContractSpeed(0.1),
                ResearchEffect::ContractSlots(2),
            ],
        };
        assert!(node.requires("focused_breathing"));
        assert!(!node.requires("inner_furnace"));
        assert_eq!(node.contract_slots(), 3);
    }
}
