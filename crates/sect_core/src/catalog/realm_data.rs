//! Cultivation realm ladder.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;

/// Thresholds for breaking through into a realm. Omitted fields always pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealmRequirements {
    /// Essence earned during the current run.
    #[serde(default)]
    pub essence_earned: Option<f64>,
    /// Contracts completed during the current run.
    #[serde(default)]
    pub contracts_completed: Option<u64>,
    /// Reputation on hand.
    #[serde(default)]
    pub reputation: Option<f64>,
}

/// Ids a realm unlocks when reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealmUnlocks {
    /// UI tabs.
    #[serde(default)]
    pub tabs: Vec<String>,
    /// Contract ids.
    #[serde(default)]
    pub contracts: Vec<String>,
    /// Research ids.
    #[serde(default)]
    pub research: Vec<String>,
    /// Recipe ids.
    #[serde(default)]
    pub recipes: Vec<String>,
}

/// Data-driven realm definition. Catalog order is ladder order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealmData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Breakthrough thresholds.
    #[serde(default)]
    pub requirements: RealmRequirements,
    /// Ids unlocked on arrival.
    #[serde(default)]
    pub unlocks: RealmUnlocks,
}

impl Definition for RealmData {
    const KIND: DefinitionKind = DefinitionKind::Realm;

    fn id(&self) -> &str {
        &self.id
    }
}
