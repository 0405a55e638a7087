//! # Sect Core
//!
//! Deterministic simulation core for an incremental cultivation-sect game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No clocks (callers pass `now_ms` and `dt_ms`)
//! - No ambient randomness (the seed lives in [`state::GameState`])
//!
//! Every public transition takes a state by reference and returns a
//! [`state::Transition`] with the new state and a `changed` flag. This enables:
//! - Offline catch-up identical to live play
//! - Save migration and replay verification
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Static definition tables and balance constants
//! - [`state`] - The aggregate game state
//! - [`actions`] - Player action dispatch
//! - [`tick`] - The time step
//! - [`offline`] - Offline catch-up
//! - [`save`] - Versioned saves and migration
//! - [`replay`] - Recording and verifying sessions

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod alchemy;
pub mod ascension;
pub mod automation;
pub mod catalog;
pub mod contracts;
pub mod disciples;
pub mod equipment;
pub mod error;
pub mod expeditions;
pub mod facilities;
pub mod forging;
pub mod modifiers;
pub mod offline;
pub mod production;
pub mod realm;
pub mod replay;
pub mod research;
pub mod resources;
pub mod rng;
pub mod save;
pub mod state;
pub mod tick;
pub mod upgrades;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{apply_action, Action};
    pub use crate::automation::{AutoAcceptMode, AutomationSettings};
    pub use crate::catalog::{catalog, DiscipleRole, EquipSlot, Rarity};
    pub use crate::contracts::ContractStatus;
    pub use crate::error::{GameError, Rejection, Result};
    pub use crate::modifiers::Modifiers;
    pub use crate::offline::{offline_progress, OfflineReport};
    pub use crate::replay::{Replay, ReplayInput, ReplayPlayer};
    pub use crate::resources::{ResourceBundle, ResourceId, Resources};
    pub use crate::save::{deserialize, resume, serialize, SaveEnvelope, SCHEMA_VERSION};
    pub use crate::state::{GameState, Transition};
    pub use crate::tick::tick;
}
