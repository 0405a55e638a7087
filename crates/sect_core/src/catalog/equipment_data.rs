//! Forge blueprints, affixes and rarity tiers.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;
use crate::resources::ResourceBundle;

/// Slot an equipment piece occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipSlot {
    /// Main hand.
    Weapon,
    /// Body.
    Armor,
    /// Finger.
    Ring,
    /// Neck.
    Amulet,
}

impl EquipSlot {
    /// Every slot.
    pub const ALL: [Self; 4] = [Self::Weapon, Self::Armor, Self::Ring, Self::Amulet];
}

/// Rarity tier rolled when an item is forged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rarity {
    /// Most frequent tier, no affixes.
    Common,
    /// One affix.
    Uncommon,
    /// Two affixes.
    Rare,
    /// Three affixes.
    Epic,
}

/// Stat an affix modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AffixStat {
    /// Adds to the equipment production factor.
    Production,
    /// Adds to the contract speed multiplier.
    ContractSpeed,
    /// Adds to the forge speed multiplier.
    ForgeSpeed,
    /// Adds to the alchemy speed multiplier.
    AlchemySpeed,
    /// Adds to the expedition speed multiplier.
    ExpeditionSpeed,
}

/// Data-driven affix definition. Rolled magnitudes lie in `[min, max]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffixData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Stat modified.
    pub stat: AffixStat,
    /// Lowest rollable magnitude.
    pub min: f64,
    /// Highest rollable magnitude.
    pub max: f64,
}

impl AffixData {
    /// Linear interpolation between `min` and `max` at `t` in `[0, 1)`.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        self.min + (self.max - self.min) * t
    }
}

/// Data-driven forge blueprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Slot the forged item occupies.
    pub slot: EquipSlot,
    /// Upfront forging cost.
    pub cost: ResourceBundle,
    /// Forging time in milliseconds at speed 1.
    pub duration_ms: u64,
    /// Production bonus before rarity scaling (0.05 = +5%).
    pub production_bonus: f64,
    /// Ore returned on disassembly before rarity scaling.
    pub salvage_ore: f64,
    /// Research node that must be purchased to forge this.
    #[serde(default)]
    pub requires_research: Option<String>,
}

impl Definition for BlueprintData {
    const KIND: DefinitionKind = DefinitionKind::Blueprint;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Definition for AffixData {
    const KIND: DefinitionKind = DefinitionKind::Affix;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-rarity roll weight and scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityData {
    /// Tier described.
    pub rarity: Rarity,
    /// Relative roll weight.
    pub weight: f64,
    /// Number of affixes rolled.
    pub affix_count: u32,
    /// Multiplier on the blueprint production bonus.
    pub power: f64,
    /// Multiplier on salvage ore.
    pub salvage: f64,
}
