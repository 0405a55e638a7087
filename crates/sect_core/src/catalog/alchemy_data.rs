//! Alchemy recipes and the consumables they brew.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;
use crate::resources::ResourceBundle;

/// Effect of an active consumable buff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuffEffect {
    /// Multiplies essence production.
    ProductionMult(f64),
    /// Adds to the contract speed multiplier.
    ContractSpeed(f64),
    /// Adds to the forge speed multiplier.
    ForgeSpeed(f64),
    /// Adds to the alchemy speed multiplier.
    AlchemySpeed(f64),
    /// Multiplies every disciple gathering rate (herb, ore, research) by `1 + value`.
    GatherMult(f64),
}

impl BuffEffect {
    /// Whether this buff feeds the production calculation.
    #[must_use]
    pub const fn affects_production(&self) -> bool {
        matches!(self, Self::ProductionMult(_))
    }
}

/// Data-driven consumable definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumableData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Buff granted on use.
    pub effect: BuffEffect,
    /// Buff duration before duration bonuses.
    pub duration_ms: u64,
}

impl Definition for ConsumableData {
    const KIND: DefinitionKind = DefinitionKind::Consumable;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Data-driven alchemy recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Upfront brewing cost.
    pub cost: ResourceBundle,
    /// Brewing time in milliseconds at speed 1.
    pub duration_ms: u64,
    /// Consumable id produced.
    pub output: String,
    /// Units produced per brew.
    #[serde(default = "default_output_count")]
    pub output_count: u32,
}

const fn default_output_count() -> u32 {
    1
}

impl Definition for RecipeData {
    const KIND: DefinitionKind = DefinitionKind::Recipe;

    fn id(&self) -> &str {
        &self.id
    }
}
