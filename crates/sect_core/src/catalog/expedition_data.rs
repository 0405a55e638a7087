//! Expedition definitions and their reward tables.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;
use crate::resources::{ResourceBundle, ResourceId};

/// What a single reward roll grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RewardKind {
    /// A flat resource amount.
    Resource {
        /// Resource granted.
        resource: ResourceId,
        /// Amount granted.
        amount: f64,
    },
    /// Discovery of an alchemy recipe.
    Recipe {
        /// Recipe id discovered.
        recipe_id: String,
    },
    /// A freshly rolled equipment instance.
    Equipment {
        /// Blueprint the item is rolled from.
        blueprint_id: String,
    },
}

/// One weighted row of a reward table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Relative weight for cumulative selection.
    pub weight: f64,
    /// Reward granted when selected.
    pub reward: RewardKind,
}

/// Data-driven expedition definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpeditionData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Upfront cost.
    #[serde(default)]
    pub cost: ResourceBundle,
    /// Base duration in milliseconds.
    pub duration_ms: u64,
    /// Interval between mid-run events.
    pub event_interval_ms: u64,
    /// Reward rolls before bonus events.
    pub reward_rolls: u32,
    /// Weighted reward table.
    pub rewards: Vec<RewardEntry>,
    /// Whether a fresh game starts with this unlocked.
    #[serde(default)]
    pub unlocked_by_default: bool,
}

impl Definition for ExpeditionData {
    const KIND: DefinitionKind = DefinitionKind::Expedition;

    fn id(&self) -> &str {
        &self.id
    }
}
