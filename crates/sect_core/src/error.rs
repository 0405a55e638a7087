//! Error types for the sect simulation.
//!
//! Two families of failure exist. A [`Rejection`] means a player-triggered
//! transition had unmet preconditions; the dispatcher turns it into an
//! unchanged state. Everything else in [`GameError`] is a defect (bad catalog
//! id, corrupt data) and is propagated to the caller.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Which static definition table a lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// Essence upgrades.
    Upgrade,
    /// Research nodes.
    Research,
    /// Contracts.
    Contract,
    /// Facilities.
    Facility,
    /// Forge blueprints.
    Blueprint,
    /// Equipment affixes.
    Affix,
    /// Alchemy recipes.
    Recipe,
    /// Alchemy consumables.
    Consumable,
    /// Expeditions.
    Expedition,
    /// Disciple archetypes.
    Archetype,
    /// Cultivation realms.
    Realm,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upgrade => "upgrade",
            Self::Research => "research",
            Self::Contract => "contract",
            Self::Facility => "facility",
            Self::Blueprint => "blueprint",
            Self::Affix => "affix",
            Self::Recipe => "recipe",
            Self::Consumable => "consumable",
            Self::Expedition => "expedition",
            Self::Archetype => "archetype",
            Self::Realm => "realm",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A static definition id is not present in the catalog.
    #[error("Unknown {kind} definition: {id}")]
    UnknownDefinition {
        /// Table the lookup was made against.
        kind: DefinitionKind,
        /// The id that was not found.
        id: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Catalog tables reference each other inconsistently.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A player action's preconditions were not met.
    #[error("Action rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Save input is not serialized game data at all.
    #[error("Failed to parse save data: {0}")]
    SaveParse(#[from] serde_json::Error),

    /// Binary snapshot encoding or decoding failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Reading or writing a replay file failed.
    #[error("IO error: {0}")]
    Io(String),

    /// A replay file was written by an incompatible format version.
    #[error("Unsupported replay version: expected {expected}, found {found}")]
    UnsupportedReplayVersion {
        /// Version this build reads.
        expected: u32,
        /// Version recorded in the file.
        found: u32,
    },
}

impl GameError {
    /// Shorthand for an unknown-definition error.
    pub fn unknown(kind: DefinitionKind, id: impl Into<String>) -> Self {
        Self::UnknownDefinition {
            kind,
            id: id.into(),
        }
    }

    /// Whether this error is a silent player-level rejection.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Reasons a player-triggered transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The cost is not affordable.
    #[error("insufficient resources")]
    InsufficientResources,
    /// The queue or slot already has an active task.
    #[error("queue is busy")]
    QueueBusy,
    /// The subject is not unlocked yet.
    #[error("{0} is locked")]
    Locked(String),
    /// Threshold requirements are not met.
    #[error("requirements not met")]
    RequirementsNotMet,
    /// The action is on cooldown.
    #[error("on cooldown for {remaining_ms} ms")]
    OnCooldown {
        /// Milliseconds until the action is available again.
        remaining_ms: u64,
    },
    /// A slot, instance or disciple referenced by the action does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// Active capacity is exhausted.
    #[error("capacity reached")]
    CapacityReached,
    /// The upgrade or facility is at its maximum level.
    #[error("maximum level reached")]
    MaxLevel,
    /// The research node is already purchased.
    #[error("already purchased")]
    AlreadyPurchased,
    /// Some prerequisite research is not purchased.
    #[error("prerequisites missing")]
    PrerequisitesMissing,
    /// The disciple's archetype cannot take that role.
    #[error("role not allowed for archetype")]
    RoleNotAllowed,
    /// The action would not change anything.
    #[error("nothing to do")]
    NothingToDo,
}

/// Shorthand for returning a rejection from an operation.
pub(crate) fn reject<T>(reason: Rejection) -> Result<T> {
    Err(GameError::Rejected(reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_detected() {
        let err: GameError = Rejection::QueueBusy.into();
        assert!(err.is_rejection());
        assert!(!GameError::unknown(DefinitionKind::Upgrade, "x").is_rejection());
    }

    #[test]
    fn test_error_display() {
        let err = GameError::unknown(DefinitionKind::Blueprint, "mithril_blade");
        assert_eq!(err.to_string(), "Unknown blueprint definition: mithril_blade");

        let err: GameError = Rejection::OnCooldown { remaining_ms: 250 }.into();
        assert_eq!(err.to_string(), "Action rejected: on cooldown for 250 ms");
    }
}
