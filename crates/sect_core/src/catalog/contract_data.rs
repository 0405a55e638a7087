//! Contract definitions.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;
use crate::resources::{ResourceBundle, ResourceId};

/// Thresholds that must hold when a contract is accepted.
///
/// Omitted fields are always satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRequirements {
    /// Minimum reputation on hand.
    #[serde(default)]
    pub min_reputation: Option<f64>,
    /// Minimum current essence/sec.
    #[serde(default)]
    pub min_essence_per_second: Option<f64>,
    /// Minimum essence on hand, checked before the upfront cost.
    #[serde(default)]
    pub min_essence: Option<f64>,
}

/// Data-driven contract definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Essence paid when the contract is accepted.
    #[serde(default)]
    pub essence_cost: f64,
    /// Time to complete, in milliseconds at speed 1.
    pub duration_ms: u64,
    /// Granted when the completed contract is claimed.
    pub reward: ResourceBundle,
    /// Acceptance thresholds.
    #[serde(default)]
    pub requirements: ContractRequirements,
}

impl ContractData {
    /// Essence reward minus the upfront cost.
    #[must_use]
    pub fn net_essence(&self) -> f64 {
        self.reward.get(ResourceId::Essence) - self.essence_cost
    }

    /// Whether the reward carries research or reputation.
    #[must_use]
    pub fn grants_progression(&self) -> bool {
        self.reward.get(ResourceId::Research) > 0.0 || self.reward.get(ResourceId::Reputation) > 0.0
    }
}

impl Definition for ContractData {
    const KIND: DefinitionKind = DefinitionKind::Contract;

    fn id(&self) -> &str {
        &self.id
    }
}
