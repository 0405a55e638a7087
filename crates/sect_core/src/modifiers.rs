//! Cross-system modifier pipeline.
//!
//! Each step folds one system's contribution into a [`Modifiers`] value and
//! returns it, so the composition order is explicit:
//!
//! ```text
//! base(balance) -> research -> facilities -> equipment -> disciples -> buffs
//! ```
//!
//! Production factors multiply. Speeds start at 1 and add bonuses.

use crate::catalog::{
    catalog, AffixStat, Balance, BuffEffect, DiscipleRole, FacilityEffect, ResearchEffect,
};
use crate::error::Result;
use crate::state::GameState;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Aggregated modifiers for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifiers {
    /// Production factor from research.
    pub research_production: f64,
    /// Production factor from facilities.
    pub facility_production: f64,
    /// `1 + sum of equipped production bonuses`.
    pub equipment_production: f64,
    /// Production factor from active buffs.
    pub buff_production: f64,
    /// Contract progress multiplier.
    pub contract_speed: f64,
    /// Forge progress multiplier.
    pub forge_speed: f64,
    /// Alchemy progress multiplier.
    pub alchemy_speed: f64,
    /// Expedition progress multiplier.
    pub expedition_speed: f64,
    /// Contract slots from research.
    pub research_slots: u32,
    /// Contract slots from facilities.
    pub facility_slots: u32,
    /// Fractional extension of buff durations.
    pub buff_duration: f64,
    /// Offline catch-up cap in milliseconds.
    pub offline_cap_ms: f64,
    /// Fraction of the capped absence credited.
    pub offline_efficiency: f64,
    /// Herb/sec from gatherers.
    pub herb_per_second: f64,
    /// Ore/sec from miners.
    pub ore_per_second: f64,
    /// Research/sec from scholars.
    pub research_per_second: f64,
    /// Multiplier on disciple gathering.
    pub gather_mult: f64,
    /// A contract clerk is assigned.
    pub can_auto_contracts: bool,
    /// A smith is assigned.
    pub can_auto_forge: bool,
    /// A detour-mitigating role is assigned.
    pub mitigates_detours: bool,
    /// A bonus-amplifying role is assigned.
    pub amplifies_bonus_rolls: bool,
}

impl Modifiers {
    /// Neutral modifiers with balance defaults.
    #[must_use]
    pub fn base(balance: &Balance) -> Self {
        Self {
            research_production: 1.0,
            facility_production: 1.0,
            equipment_production: 1.0,
            buff_production: 1.0,
            contract_speed: 1.0,
            forge_speed: 1.0,
            alchemy_speed: 1.0,
            expedition_speed: 1.0,
            research_slots: 0,
            facility_slots: 0,
            buff_duration: 0.0,
            offline_cap_ms: balance.offline.cap_ms as f64,
            offline_efficiency: balance.offline.efficiency,
            herb_per_second: 0.0,
            ore_per_second: 0.0,
            research_per_second: 0.0,
            gather_mult: 1.0,
            can_auto_contracts: false,
            can_auto_forge: false,
            mitigates_detours: false,
            amplifies_bonus_rolls: false,
        }
    }

    /// Run the full pipeline for `state`.
    pub fn for_state(state: &GameState) -> Result<Self> {
        Self::base(&catalog().balance)
            .with_research(state)?
            .with_facilities(state)?
            .with_equipment(state)?
            .with_disciples(state)?
            .with_buffs(state)
    }

    /// Fold in purchased research.
    pub fn with_research(mut self, state: &GameState) -> Result<Self> {
        let catalog = catalog();
        for (id, node) in &state.research {
            if !node.purchased {
                continue;
            }
            for effect in &catalog.research_node(id)?.effects {
                match effect {
                    ResearchEffect::ProductionMult(f) => self.research_production *= f,
                    ResearchEffect::ContractSlots(n) => self.research_slots += n,
                    ResearchEffect::ContractSpeed(b) => self.contract_speed += b,
                    ResearchEffect::ForgeSpeed(b) => self.forge_speed += b,
                    ResearchEffect::AlchemySpeed(b) => self.alchemy_speed += b,
                    ResearchEffect::ExpeditionSpeed(b) => self.expedition_speed += b,
                    // Applied once at purchase.
                    ResearchEffect::UnlockExpedition(_) => {}
                }
            }
        }
        Ok(self)
    }

    /// Fold in every effect tier reached by each facility.
    pub fn with_facilities(mut self, state: &GameState) -> Result<Self> {
        let catalog = catalog();
        for (id, facility) in &state.facilities {
            if facility.level == 0 {
                continue;
            }
            for effect in catalog.facility(id)?.effects_up_to(facility.level) {
                match *effect {
                    FacilityEffect::ProductionMult(f) => self.facility_production *= f,
                    FacilityEffect::ContractSlots(n) => self.facility_slots += n,
                    FacilityEffect::ContractSpeed(b) => self.contract_speed += b,
                    FacilityEffect::ForgeSpeed(b) => self.forge_speed += b,
                    FacilityEffect::AlchemySpeed(b) => self.alchemy_speed += b,
                    FacilityEffect::BuffDuration(b) => self.buff_duration += b,
                    FacilityEffect::OfflineCapHours(h) => self.offline_cap_ms += h * MS_PER_HOUR,
                    FacilityEffect::OfflineEfficiency(b) => self.offline_efficiency += b,
                }
            }
        }
        self.offline_efficiency = self.offline_efficiency.clamp(0.0, 1.0);
        Ok(self)
    }

    /// Fold in equipped items.
    pub fn with_equipment(mut self, state: &GameState) -> Result<Self> {
        let catalog = catalog();
        let mut production_bonus = 0.0;
        for item in state.equipped_items() {
            let blueprint = catalog.blueprint(&item.blueprint_id)?;
            let rarity = catalog.rarity(item.rarity)?;
            production_bonus += blueprint.production_bonus * rarity.power;

            for rolled in &item.affixes {
                let value = rolled.value;
                match catalog.affix(&rolled.affix_id)?.stat {
                    AffixStat::Production => production_bonus += value,
                    AffixStat::ContractSpeed => self.contract_speed += value,
                    AffixStat::ForgeSpeed => self.forge_speed += value,
                    AffixStat::AlchemySpeed => self.alchemy_speed += value,
                    AffixStat::ExpeditionSpeed => self.expedition_speed += value,
                }
            }
        }
        self.equipment_production = 1.0 + production_bonus;
        Ok(self)
    }

    /// Fold in assigned disciples.
    pub fn with_disciples(mut self, state: &GameState) -> Result<Self> {
        let catalog = catalog();
        let rates = &catalog.balance.disciples;
        for disciple in &state.disciples.roster {
            let Some(role) = disciple.role else {
                continue;
            };
            let aptitude = catalog.archetype(&disciple.archetype_id)?.aptitude;
            match role {
                DiscipleRole::Gatherer => self.herb_per_second += aptitude * rates.herb_per_aptitude,
                DiscipleRole::Miner => self.ore_per_second += aptitude * rates.ore_per_aptitude,
                DiscipleRole::Scholar => {
                    self.research_per_second += aptitude * rates.research_per_aptitude;
                }
                DiscipleRole::ContractClerk => {
                    self.contract_speed += aptitude * rates.clerk_speed_per_aptitude;
                    self.can_auto_contracts = true;
                }
                DiscipleRole::Smith => {
                    self.forge_speed += aptitude * rates.smith_speed_per_aptitude;
                    self.can_auto_forge = true;
                }
                DiscipleRole::Alchemist => {
                    self.alchemy_speed += aptitude * rates.alchemist_speed_per_aptitude;
                }
            }
            self.mitigates_detours |= role.mitigates_detours();
            self.amplifies_bonus_rolls |= role.amplifies_bonus_rolls();
        }
        Ok(self)
    }

    /// Fold in active consumable buffs.
    pub fn with_buffs(mut self, state: &GameState) -> Result<Self> {
        for buff in &state.buffs {
            match buff.effect {
                BuffEffect::ProductionMult(f) => self.buff_production *= f,
                BuffEffect::ContractSpeed(b) => self.contract_speed += b,
                BuffEffect::ForgeSpeed(b) => self.forge_speed += b,
                BuffEffect::AlchemySpeed(b) => self.alchemy_speed += b,
                BuffEffect::GatherMult(b) => self.gather_mult += b,
            }
        }
        Ok(self)
    }

    /// Contract slots granted beyond the base count.
    #[must_use]
    pub const fn contract_slot_bonus(&self) -> u32 {
        self.research_slots + self.facility_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alchemy::ActiveBuff;
    use crate::catalog::{EquipSlot, Rarity};
    use crate::disciples::Disciple;
    use crate::equipment::RolledAffix;
    use crate::research::ResearchNodeState;

    #[test]
    fn test_fresh_state_is_neutral() {
        let state = GameState::new(1);
        let mods = Modifiers::for_state(&state).unwrap();
        assert_eq!(mods, Modifiers::base(&catalog().balance));
        assert_eq!(mods.contract_slot_bonus(), 0);
    }

    #[test]
    fn test_research_slots_and_speed() {
        let mut state = GameState::new(1);
        for id in ["meridian_mapping", "spirit_ledger"] {
            state
                .research
                .insert(id.to_string(), ResearchNodeState { purchased: true });
        }
        let mods = Modifiers::for_state(&state).unwrap();
        assert_eq!(mods.research_slots, 1);
        assert!((mods.contract_speed - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_facility_tiers_stack() {
        let mut state = GameState::new(1);
        state
            .facilities
            .get_mut("contract_hall")
            .unwrap()
            .level = 3;
        state
            .facilities
            .get_mut("meditation_chamber")
            .unwrap()
            .level = 1;
        let mods = Modifiers::for_state(&state).unwrap();
        assert_eq!(mods.facility_slots, 2);
        assert!((mods.contract_speed - 1.1).abs() < 1e-12);
        let base_cap = catalog().balance.offline.cap_ms as f64;
        assert_eq!(mods.offline_cap_ms, base_cap + 2.0 * MS_PER_HOUR);
    }

    #[test]
    fn test_equipment_bonus_scales_with_rarity() {
        let mut state = GameState::new(1);
        let id = state.equipment.insert(
            "iron_sword",
            EquipSlot::Weapon,
            Rarity::Rare,
            vec![RolledAffix {
                affix_id: "keen".to_string(),
                value: 0.03,
            }],
        );
        state.equipped.set(EquipSlot::Weapon, Some(id));

        let mods = Modifiers::for_state(&state).unwrap();
        let power = catalog().rarity(Rarity::Rare).unwrap().power;
        let expected = 1.0 + 0.05 * power + 0.03;
        assert!((mods.equipment_production - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unequipped_items_do_not_count() {
        let mut state = GameState::new(1);
        state
            .equipment
            .insert("iron_sword", EquipSlot::Weapon, Rarity::Epic, Vec::new());
        let mods = Modifiers::for_state(&state).unwrap();
        assert_eq!(mods.equipment_production, 1.0);
    }

    #[test]
    fn test_disciple_roles_enable_automation() {
        let mut state = GameState::new(1);
        state.disciples.roster.push(Disciple {
            id: 1,
            archetype_id: "steward".to_string(),
            role: Some(DiscipleRole::ContractClerk),
        });
        state.disciples.roster.push(Disciple {
            id: 2,
            archetype_id: "artisan".to_string(),
            role: Some(DiscipleRole::Smith),
        });
        state.disciples.roster.push(Disciple {
            id: 3,
            archetype_id: "herbalist".to_string(),
            role: None,
        });

        let mods = Modifiers::for_state(&state).unwrap();
        assert!(mods.can_auto_contracts);
        assert!(mods.can_auto_forge);
        assert!(mods.mitigates_detours);
        assert!(mods.amplifies_bonus_rolls);
        assert_eq!(mods.herb_per_second, 0.0);
    }

    #[test]
    fn test_gatherer_rate_scales_with_aptitude() {
        let mut state = GameState::new(1);
        state.disciples.roster.push(Disciple {
            id: 1,
            archetype_id: "wanderer".to_string(),
            role: Some(DiscipleRole::Gatherer),
        });
        let mods = Modifiers::for_state(&state).unwrap();
        let aptitude = catalog().archetype("wanderer").unwrap().aptitude;
        let rate = catalog().balance.disciples.herb_per_aptitude;
        assert!((mods.herb_per_second - aptitude * rate).abs() < 1e-12);
        assert!(mods.mitigates_detours);
        assert!(!mods.can_auto_contracts);
    }

    #[test]
    fn test_buffs_fold_in() {
        let mut state = GameState::new(1);
        state.buffs.push(ActiveBuff {
            consumable_id: "qi_pill".to_string(),
            effect: BuffEffect::ProductionMult(1.5),
            remaining_ms: 1000.0,
        });
        state.buffs.push(ActiveBuff {
            consumable_id: "harvest_incense".to_string(),
            effect: BuffEffect::GatherMult(0.5),
            remaining_ms: 1000.0,
        });
        let mods = Modifiers::for_state(&state).unwrap();
        assert_eq!(mods.buff_production, 1.5);
        assert_eq!(mods.gather_mult, 1.5);
    }
}
