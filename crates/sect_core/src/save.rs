//! Versioned JSON saves and schema migration.
//!
//! A save is an envelope `{schemaVersion, savedAtMs, state}`. Older saves are
//! upgraded step by step: each schema version backfills the fields it
//! introduced from a fresh state, then the result is reconciled with the
//! catalog and derived values are recomputed. Loading only fails when the
//! input is not save data at all.
//!
//! | Version | Adds |
//! |---------|------|
//! | 0 | legacy bare state: `resources`, `production`, `upgrades`, `contracts` |
//! | 1 | `research`, `runStats` |
//! | 2 | `facilities`, `equipment`, `equipped`, `forging`, `alchemy`, `consumables`, `buffs` |
//! | 3 | `expeditions`, `disciples`, `automation` |
//! | 4 | `realm`, `seed`, `ascension`, `lastFocusMs` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{catalog, EquipSlot};
use crate::contracts::sync_slots;
use crate::error::Result;
use crate::facilities::FacilityState;
use crate::offline::{offline_progress, OfflineReport};
use crate::production::calculate_production;
use crate::realm::RealmState;
use crate::research::ResearchNodeState;
use crate::state::GameState;

/// Current save schema version.
pub const SCHEMA_VERSION: u32 = 4;

/// Top-level fields introduced at each schema version, indexed by version.
const FIELDS_BY_VERSION: [&[&str]; SCHEMA_VERSION as usize + 1] = [
    &["resources", "production", "upgrades", "contracts"],
    &["research", "runStats"],
    &[
        "facilities",
        "equipment",
        "equipped",
        "forging",
        "alchemy",
        "consumables",
        "buffs",
    ],
    &["expeditions", "disciples", "automation"],
    &["realm", "seed", "ascension", "lastFocusMs"],
];

/// A loaded save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnvelope {
    /// Schema version of `state`.
    pub schema_version: u32,
    /// Wall-clock time the save was written.
    pub saved_at_ms: u64,
    /// The saved game.
    pub state: GameState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    schema_version: u32,
    saved_at_ms: u64,
    state: &'a GameState,
}

/// Serialize `state` into a current-version save.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn serialize(state: &GameState, saved_at_ms: u64) -> Result<String> {
    let envelope = EnvelopeRef {
        schema_version: SCHEMA_VERSION,
        saved_at_ms,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a save of any known version, migrating it to the current schema.
///
/// # Errors
///
/// Returns [`GameError::SaveParse`](crate::error::GameError::SaveParse) if the
/// input is not JSON or has no recognizable save shape.
pub fn deserialize(raw: &str) -> Result<SaveEnvelope> {
    let value: Value = serde_json::from_str(raw)?;
    let (schema_version, saved_at_ms, mut state_value) = split_envelope(value)?;

    migrate(&mut state_value, schema_version, saved_at_ms)?;
    if schema_version < SCHEMA_VERSION {
        tracing::info!(
            from = schema_version,
            to = SCHEMA_VERSION,
            "Migrated save"
        );
    }

    let mut state: GameState = serde_json::from_value(state_value)?;
    reconcile(&mut state)?;
    Ok(SaveEnvelope {
        schema_version: SCHEMA_VERSION,
        saved_at_ms,
        state,
    })
}

/// Load a save and credit the time since it was written.
///
/// # Errors
///
/// Returns an error if the save cannot be parsed or references ids missing
/// from the catalog.
pub fn resume(raw: &str, now_ms: u64) -> Result<(GameState, OfflineReport)> {
    let envelope = deserialize(raw)?;
    let (transition, report) = offline_progress(&envelope.state, envelope.saved_at_ms, now_ms)?;
    Ok((transition.into_state(), report))
}

fn unrecognized(message: &str) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(message)
}

/// Split raw JSON into `(version, saved_at_ms, state)`.
fn split_envelope(value: Value) -> Result<(u32, u64, Value)> {
    let Value::Object(mut map) = value else {
        return Err(unrecognized("save is not a JSON object").into());
    };

    if let Some(version) = map.get("schemaVersion") {
        let version = version
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| unrecognized("schemaVersion is not a version number"))?;
        let saved_at_ms = map.get("savedAtMs").and_then(Value::as_u64).unwrap_or(0);
        let state = map
            .remove("state")
            .ok_or_else(|| unrecognized("save envelope has no state"))?;
        return Ok((version, saved_at_ms, state));
    }

    if map.contains_key("resources") {
        return Ok((0, 0, Value::Object(map)));
    }
    Err(unrecognized("no schemaVersion or resources field").into())
}

fn migrate(state: &mut Value, from: u32, saved_at_ms: u64) -> Result<()> {
    let fresh = serde_json::to_value(GameState::new(saved_at_ms))?;
    let (Value::Object(target), Value::Object(defaults)) = (state, &fresh) else {
        return Err(unrecognized("save state is not a JSON object").into());
    };

    for (version, fields) in FIELDS_BY_VERSION.iter().enumerate().skip(from as usize) {
        let mut added = 0;
        for field in *fields {
            if !target.contains_key(*field) {
                if let Some(default) = defaults.get(*field) {
                    target.insert((*field).to_string(), default.clone());
                    added += 1;
                }
            }
        }
        tracing::debug!(version, added, "Save schema step");
    }

    backfill(target, defaults);
    Ok(())
}

/// Recursively insert keys present in `defaults` but missing from `target`.
///
/// Objects merge key by key. Each object inside an array is merged with the
/// default element sharing its `id`, or the first default element otherwise.
/// Scalars in `target` are kept as saved.
fn backfill(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default) in defaults {
        match (target.get_mut(key), default) {
            (None, _) => {
                target.insert(key.clone(), default.clone());
            }
            (Some(Value::Object(inner)), Value::Object(default_inner)) => {
                backfill(inner, default_inner);
            }
            (Some(Value::Array(items)), Value::Array(default_items)) => {
                backfill_elements(items, default_items);
            }
            _ => {}
        }
    }
}

fn backfill_elements(items: &mut [Value], defaults: &[Value]) {
    for item in items {
        let Value::Object(inner) = item else {
            continue;
        };
        let template = inner
            .get("id")
            .and_then(|id| defaults.iter().find(|d| d.get("id") == Some(id)))
            .or_else(|| defaults.first());
        if let Some(Value::Object(template)) = template {
            backfill(inner, template);
        }
    }
}

/// Align id-keyed maps with the catalog and recompute derived state.
fn reconcile(state: &mut GameState) -> Result<()> {
    let catalog = catalog();

    state
        .upgrades
        .retain(|id, _| catalog.upgrades.iter().any(|u| &u.id == id));
    for def in &catalog.upgrades {
        state.upgrades.entry(def.id.clone()).or_insert(0);
    }

    state
        .research
        .retain(|id, _| catalog.research.iter().any(|r| &r.id == id));
    for def in &catalog.research {
        state
            .research
            .entry(def.id.clone())
            .or_insert_with(ResearchNodeState::default);
    }

    state
        .facilities
        .retain(|id, _| catalog.facilities.iter().any(|f| &f.id == id));
    for def in &catalog.facilities {
        state
            .facilities
            .entry(def.id.clone())
            .or_insert_with(FacilityState::default);
    }

    state
        .contracts
        .slots
        .retain(|slot| catalog.contract(&slot.id).is_ok());

    if catalog.realm(&state.realm.current).is_err() {
        state.realm = RealmState::initial();
    }

    for slot in EquipSlot::ALL {
        let dangling = state
            .equipped
            .get(slot)
            .is_some_and(|id| !state.equipment.items.contains_key(id));
        if dangling {
            state.equipped.set(slot, None);
        }
    }

    sync_slots(state)?;
    calculate_production(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ContractStatus;
    use crate::error::GameError;

    const LEGACY_SAVE: &str = r#"{
        "resources": { "essence": 120.5, "reputation": 3 },
        "production": { "basePerSecond": 1, "additiveBonus": 0, "multiplier": 1, "perSecond": 1 },
        "upgrades": { "spirit_well": 2, "retired_upgrade": 4 },
        "contracts": {
            "slots": [
                {
                    "id": "sweep_courtyard",
                    "reward": { "essence": 40, "reputation": 1 },
                    "durationMs": 10000,
                    "elapsedMs": 2500,
                    "status": "active"
                }
            ],
            "maxSlots": 1
        }
    }"#;

    #[test]
    fn test_current_round_trip() {
        let mut state = GameState::new(99);
        state.resources.essence = 0.1 + 0.2;
        state.resources.herb = 1.0 / 3.0;
        state.consumables.insert("qi_pill".to_string(), 3);

        let raw = serialize(&state, 5_000).unwrap();
        let loaded = deserialize(&raw).unwrap();
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert_eq!(loaded.saved_at_ms, 5_000);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn test_legacy_save_migrates() {
        let loaded = deserialize(LEGACY_SAVE).unwrap();
        let state = loaded.state;
        let catalog = catalog();

        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert_eq!(state.resources.essence, 120.5);
        assert_eq!(state.resources.reputation, 3.0);
        assert_eq!(state.resources.herb, 0.0);

        assert_eq!(state.research.len(), catalog.research.len());
        assert!(state.research.values().all(|r| !r.purchased));
        assert_eq!(state.run_stats.essence_earned, 0.0);
        assert_eq!(state.run_stats.contracts_completed, 0);

        assert_eq!(state.upgrades.len(), catalog.upgrades.len());
        assert_eq!(state.upgrades["spirit_well"], 2);
        assert!(!state.upgrades.contains_key("retired_upgrade"));

        // Derived production is recomputed from the levels
        assert_eq!(state.production.additive_bonus, 2.0);
        assert_eq!(state.production.per_second, 3.0);

        let slot = state.contracts.slot("sweep_courtyard").unwrap();
        assert_eq!(slot.status, ContractStatus::Active);
        assert_eq!(slot.elapsed_ms, 2_500.0);
        assert_eq!(state.contracts.slots.len(), catalog.contracts.len());
        assert!(state.validate().is_empty(), "{:?}", state.validate());
    }

    #[test]
    fn test_partial_envelope_backfills_later_fields() {
        let mut value = serde_json::to_value(GameState::new(3)).unwrap();
        let object = value.as_object_mut().unwrap();
        for field in ["expeditions", "disciples", "automation", "realm", "seed", "ascension"] {
            object.remove(field);
        }
        let raw = serde_json::json!({
            "schemaVersion": 2,
            "savedAtMs": 42,
            "state": value,
        })
        .to_string();

        let loaded = deserialize(&raw).unwrap();
        assert_eq!(loaded.saved_at_ms, 42);
        assert_eq!(loaded.state.seed, 42);
        assert_eq!(loaded.state.realm, RealmState::initial());
        assert!(loaded.state.disciples.roster.is_empty());
        assert!(loaded.state.expeditions.unlocked.contains("bamboo_grove"));
    }

    #[test]
    fn test_current_save_missing_field_is_repaired() {
        let mut state = GameState::new(1);
        state.resources.essence = 75.0;
        let mut value = serde_json::from_str::<Value>(&serialize(&state, 10).unwrap()).unwrap();
        let saved = value["state"].as_object_mut().unwrap();
        saved.remove("buffs");
        saved.remove("runStats");
        saved["resources"].as_object_mut().unwrap().remove("herb");

        let loaded = deserialize(&value.to_string()).unwrap();
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert!(loaded.state.buffs.is_empty());
        assert_eq!(loaded.state.run_stats.contracts_completed, 0);
        assert_eq!(loaded.state.resources.herb, 0.0);
        assert_eq!(loaded.state.resources.essence, 75.0);
    }

    #[test]
    fn test_contract_slot_fields_backfilled_by_id() {
        let raw = r#"{
            "resources": { "essence": 10 },
            "contracts": {
                "slots": [
                    { "id": "escort_merchant", "elapsedMs": 1200, "status": "active" }
                ],
                "maxSlots": 1
            }
        }"#;
        let state = deserialize(raw).unwrap().state;
        let def = catalog().contract("escort_merchant").unwrap();

        let slot = state.contracts.slot("escort_merchant").unwrap();
        assert_eq!(slot.status, ContractStatus::Active);
        assert_eq!(slot.elapsed_ms, 1_200.0);
        assert_eq!(slot.duration_ms, def.duration_ms);
        assert_eq!(slot.reward, def.reward);
    }

    #[test]
    fn test_equipment_without_affixes_loads() {
        let mut state = GameState::new(1);
        let id = state
            .equipment
            .insert("iron_sword", EquipSlot::Weapon, crate::catalog::Rarity::Common, Vec::new());
        let mut value = serde_json::from_str::<Value>(&serialize(&state, 0).unwrap()).unwrap();
        value["state"]["equipment"]["items"][id.as_str()]
            .as_object_mut()
            .unwrap()
            .remove("affixes");

        let loaded = deserialize(&value.to_string()).unwrap();
        assert!(loaded.state.equipment.items[&id].affixes.is_empty());
    }

    #[test]
    fn test_dangling_equipped_id_is_cleared() {
        let mut state = GameState::new(1);
        state.equipped.set(EquipSlot::Weapon, Some("12".to_string()));
        let raw = serialize(&state, 0).unwrap();
        let loaded = deserialize(&raw).unwrap();
        assert!(loaded.state.equipped.get(EquipSlot::Weapon).is_none());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        for raw in ["not json", "[1, 2]", r#"{"hello": "world"}"#, r#"{"schemaVersion": "x"}"#] {
            assert!(
                matches!(deserialize(raw), Err(GameError::SaveParse(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_resume_credits_absence() {
        let state = GameState::new(1);
        let raw = serialize(&state, 1_000).unwrap();
        let (resumed, report) = resume(&raw, 11_000).unwrap();
        assert_eq!(report.applied_ms, 10_000);
        assert_eq!(resumed.resources.essence, state.production.per_second * 10.0);
    }
}
