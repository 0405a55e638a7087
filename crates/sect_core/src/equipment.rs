//! Equipment inventory, loot rolls and the equip slots.
//!
//! Instance ids come from a counter and are never reused, even after
//! disassembly. Rolling is front-loaded: [`roll_loot`] fixes rarity and
//! affixes from the state seed, so the item a task yields does not depend on
//! how its remaining time is later chunked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, EquipSlot, Rarity};
use crate::error::{reject, GameError, Rejection, Result};
use crate::production::calculate_production;
use crate::rng::{draw, pick_index, pick_weighted};
use crate::state::GameState;

/// An affix with its rolled magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolledAffix {
    /// Affix id.
    pub affix_id: String,
    /// Magnitude within the affix's range.
    pub value: f64,
}

/// One owned piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInstance {
    /// Inventory key.
    pub instance_id: String,
    /// Blueprint it was made from.
    pub blueprint_id: String,
    /// Slot it occupies.
    pub slot: EquipSlot,
    /// Rolled rarity.
    pub rarity: Rarity,
    /// Rolled affixes.
    #[serde(default)]
    pub affixes: Vec<RolledAffix>,
}

/// Owned equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInventory {
    /// Instance id to item.
    pub items: BTreeMap<String, EquipmentInstance>,
    /// Next instance id to hand out.
    pub next_id: u64,
}

impl Default for EquipmentInventory {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl EquipmentInventory {
    /// Add a new instance, returning its id.
    pub fn insert(
        &mut self,
        blueprint_id: &str,
        slot: EquipSlot,
        rarity: Rarity,
        affixes: Vec<RolledAffix>,
    ) -> String {
        let instance_id = self.next_id.to_string();
        self.next_id += 1;
        self.items.insert(
            instance_id.clone(),
            EquipmentInstance {
                instance_id: instance_id.clone(),
                blueprint_id: blueprint_id.to_string(),
                slot,
                rarity,
                affixes,
            },
        );
        instance_id
    }
}

/// Equipped instance id per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquippedState {
    /// Weapon slot.
    pub weapon: Option<String>,
    /// Armor slot.
    pub armor: Option<String>,
    /// Ring slot.
    pub ring: Option<String>,
    /// Amulet slot.
    pub amulet: Option<String>,
}

impl EquippedState {
    /// Instance equipped in `slot`.
    #[must_use]
    pub const fn get(&self, slot: EquipSlot) -> Option<&String> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
            EquipSlot::Ring => self.ring.as_ref(),
            EquipSlot::Amulet => self.amulet.as_ref(),
        }
    }

    /// Replace the instance in `slot`.
    pub fn set(&mut self, slot: EquipSlot, instance_id: Option<String>) {
        let target = match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Ring => &mut self.ring,
            EquipSlot::Amulet => &mut self.amulet,
        };
        *target = instance_id;
    }

    /// Slot holding `instance_id`, if equipped.
    #[must_use]
    pub fn slot_of(&self, instance_id: &str) -> Option<EquipSlot> {
        EquipSlot::ALL
            .into_iter()
            .find(|&slot| self.get(slot).is_some_and(|id| id == instance_id))
    }
}

impl GameState {
    /// Items currently equipped, in slot order. Dangling ids are skipped.
    pub fn equipped_items(&self) -> impl Iterator<Item = &EquipmentInstance> {
        EquipSlot::ALL
            .into_iter()
            .filter_map(|slot| self.equipped.get(slot))
            .filter_map(|id| self.equipment.items.get(id))
    }
}

/// Roll a rarity tier by weight.
pub fn roll_rarity(seed: &mut u32) -> Result<Rarity> {
    pick_weighted(seed, &catalog().balance.rarities, |r| r.weight)
        .map(|r| r.rarity)
        .ok_or_else(|| GameError::InvalidCatalog("rarity weights are all zero".into()))
}

/// Sample `count` distinct affixes, each with a fresh magnitude draw.
pub fn roll_affixes(seed: &mut u32, count: u32) -> Vec<RolledAffix> {
    let mut pool: Vec<_> = catalog().affixes.iter().collect();
    let count = (count as usize).min(pool.len());
    let mut rolled = Vec::with_capacity(count);

    for _ in 0..count {
        let Some(index) = pick_index(seed, pool.len()) else {
            break;
        };
        let affix = pool.remove(index);
        rolled.push(RolledAffix {
            affix_id: affix.id.clone(),
            value: affix.value_at(draw(seed)),
        });
    }
    rolled
}

/// Roll rarity and affixes for a new item.
pub fn roll_loot(seed: &mut u32) -> Result<(Rarity, Vec<RolledAffix>)> {
    let rarity = roll_rarity(seed)?;
    let count = catalog().rarity(rarity)?.affix_count;
    Ok((rarity, roll_affixes(seed, count)))
}

/// Roll and store a fresh item from a blueprint, returning its id.
pub fn grant_rolled_item(state: &mut GameState, blueprint_id: &str) -> Result<String> {
    let blueprint = catalog().blueprint(blueprint_id)?;
    let (rarity, affixes) = roll_loot(&mut state.seed)?;
    Ok(state
        .equipment
        .insert(&blueprint.id, blueprint.slot, rarity, affixes))
}

/// Equip an owned item into its slot, replacing whatever was there.
pub fn equip(state: &mut GameState, instance_id: &str) -> Result<()> {
    let Some(item) = state.equipment.items.get(instance_id) else {
        return reject(Rejection::NotFound(instance_id.to_string()));
    };
    let slot = item.slot;
    if state.equipped.get(slot).is_some_and(|id| id == instance_id) {
        return reject(Rejection::NothingToDo);
    }

    state.equipped.set(slot, Some(instance_id.to_string()));
    calculate_production(state)
}

/// Empty a slot.
pub fn unequip(state: &mut GameState, slot: EquipSlot) -> Result<()> {
    if state.equipped.get(slot).is_none() {
        return reject(Rejection::NothingToDo);
    }
    state.equipped.set(slot, None);
    calculate_production(state)
}

/// Destroy an item for ore, unequipping it first if needed.
pub fn disassemble(state: &mut GameState, instance_id: &str) -> Result<()> {
    let Some(item) = state.equipment.items.get(instance_id) else {
        return reject(Rejection::NotFound(instance_id.to_string()));
    };
    let catalog = catalog();
    let blueprint = catalog.blueprint(&item.blueprint_id)?;
    let salvage = catalog.rarity(item.rarity)?.salvage;
    let ore = (blueprint.salvage_ore * salvage).floor();

    if let Some(slot) = state.equipped.slot_of(instance_id) {
        state.equipped.set(slot, None);
    }
    state.equipment.items.remove(instance_id);
    state.resources.ore += ore;
    calculate_production(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_state() -> (GameState, String) {
        let mut state = GameState::new(1);
        let id = state
            .equipment
            .insert("iron_sword", EquipSlot::Weapon, Rarity::Uncommon, Vec::new());
        (state, id)
    }

    #[test]
    fn test_instance_ids_increment() {
        let mut inventory = EquipmentInventory::default();
        let a = inventory.insert("iron_sword", EquipSlot::Weapon, Rarity::Common, Vec::new());
        let b = inventory.insert("jade_ring", EquipSlot::Ring, Rarity::Common, Vec::new());
        assert_eq!(a, "1");
        assert_eq!(b, "2");
        assert_eq!(inventory.next_id, 3);
    }

    #[test]
    fn test_equip_and_unequip() {
        let (mut state, id) = create_test_state();
        equip(&mut state, &id).unwrap();
        assert_eq!(state.equipped.weapon.as_deref(), Some(id.as_str()));
        assert!(state.production.multiplier > 1.0);

        assert!(equip(&mut state, &id).unwrap_err().is_rejection());

        unequip(&mut state, EquipSlot::Weapon).unwrap();
        assert!(state.equipped.weapon.is_none());
        assert_eq!(state.production.multiplier, 1.0);
        assert!(unequip(&mut state, EquipSlot::Weapon).unwrap_err().is_rejection());
    }

    #[test]
    fn test_equip_missing_instance() {
        let mut state = GameState::new(1);
        let err = equip(&mut state, "42").unwrap_err();
        assert!(matches!(err, GameError::Rejected(Rejection::NotFound(_))));
    }

    #[test]
    fn test_disassemble_unequips_and_salvages() {
        let (mut state, id) = create_test_state();
        equip(&mut state, &id).unwrap();
        disassemble(&mut state, &id).unwrap();

        let salvage = catalog().rarity(Rarity::Uncommon).unwrap().salvage;
        assert_eq!(state.resources.ore, (8.0 * salvage).floor());
        assert!(state.equipped.weapon.is_none());
        assert!(state.equipment.items.is_empty());
        assert_eq!(state.production.multiplier, 1.0);
        assert!(state.validate().is_empty());

        // Ids are never reused
        let next = state
            .equipment
            .insert("iron_sword", EquipSlot::Weapon, Rarity::Common, Vec::new());
        assert_ne!(next, id);
    }

    #[test]
    fn test_roll_affixes_without_replacement() {
        let mut seed = 12_345;
        let affixes = roll_affixes(&mut seed, 99);
        assert_eq!(affixes.len(), catalog().affixes.len());

        let mut ids: Vec<_> = affixes.iter().map(|a| a.affix_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), affixes.len());

        for rolled in &affixes {
            let def = catalog().affix(&rolled.affix_id).unwrap();
            assert!(rolled.value >= def.min && rolled.value <= def.max);
        }
    }

    #[test]
    fn test_roll_loot_matches_rarity_count() {
        let mut seed = 777;
        for _ in 0..200 {
            let (rarity, affixes) = roll_loot(&mut seed).unwrap();
            let count = catalog().rarity(rarity).unwrap().affix_count as usize;
            assert_eq!(affixes.len(), count.min(catalog().affixes.len()));
        }
    }

    #[test]
    fn test_roll_loot_replays_from_seed() {
        let mut a = 4_242;
        let mut b = 4_242;
        assert_eq!(roll_loot(&mut a).unwrap(), roll_loot(&mut b).unwrap());
        assert_eq!(a, b);
    }
}
