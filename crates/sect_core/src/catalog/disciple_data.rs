//! Disciple archetypes and roles.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;

/// Job a disciple can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscipleRole {
    /// Gathers herbs; mitigates expedition detours.
    Gatherer,
    /// Mines ore.
    Miner,
    /// Produces research points.
    Scholar,
    /// Speeds contracts, runs contract automation, mitigates detours.
    ContractClerk,
    /// Speeds forging, runs auto-forge, amplifies bonus rolls.
    Smith,
    /// Speeds alchemy, amplifies bonus rolls.
    Alchemist,
}

impl DiscipleRole {
    /// Roles that shorten expedition detours.
    #[must_use]
    pub const fn mitigates_detours(self) -> bool {
        matches!(self, Self::ContractClerk | Self::Gatherer)
    }

    /// Roles that add an extra roll to bonus-reward events.
    #[must_use]
    pub const fn amplifies_bonus_rolls(self) -> bool {
        matches!(self, Self::Smith | Self::Alchemist)
    }
}

/// Data-driven disciple archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Scalar applied to every role effect.
    pub aptitude: f64,
    /// Roles this archetype may take.
    pub roles: Vec<DiscipleRole>,
}

impl ArchetypeData {
    /// Whether the archetype may take `role`.
    #[must_use]
    pub fn allows(&self, role: DiscipleRole) -> bool {
        self.roles.contains(&role)
    }
}

impl Definition for ArchetypeData {
    const KIND: DefinitionKind = DefinitionKind::Archetype;

    fn id(&self) -> &str {
        &self.id
    }
}
