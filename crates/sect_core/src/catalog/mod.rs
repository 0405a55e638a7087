//! Static definition tables.
//!
//! Every catalog is a RON file under `data/`, embedded at compile time and
//! parsed once into a process-wide [`Catalog`]. Lookups by id return
//! [`GameError::UnknownDefinition`] when the id is absent: that is a data or
//! programming bug, never a player condition.

mod alchemy_data;
mod balance;
mod contract_data;
mod disciple_data;
mod equipment_data;
mod expedition_data;
mod facility_data;
mod realm_data;
mod research_data;
mod upgrade_data;

use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;

pub use alchemy_data::{BuffEffect, ConsumableData, RecipeData};
pub use balance::{
    AscensionBalance, Balance, ContractBalance, DiscipleBalance, ExpeditionBalance,
    OfflineBalance,
};
pub use contract_data::{ContractData, ContractRequirements};
pub use disciple_data::{ArchetypeData, DiscipleRole};
pub use equipment_data::{AffixData, AffixStat, BlueprintData, EquipSlot, Rarity, RarityData};
pub use expedition_data::{ExpeditionData, RewardEntry, RewardKind};
pub use facility_data::{FacilityData, FacilityEffect};
pub use realm_data::{RealmData, RealmRequirements, RealmUnlocks};
pub use research_data::{ResearchData, ResearchEffect};
pub use upgrade_data::{UpgradeData, UpgradeEffect};

use crate::error::{DefinitionKind, GameError, Result};

/// A definition addressable by string id.
pub trait Definition {
    /// Table this definition belongs to.
    const KIND: DefinitionKind;

    /// Unique id within the table.
    fn id(&self) -> &str;
}

fn lookup<'a, T: Definition>(items: &'a [T], id: &str) -> Result<&'a T> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| GameError::unknown(T::KIND, id))
}

/// Every static table.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Balance constants.
    pub balance: Balance,
    /// Essence upgrades.
    pub upgrades: Vec<UpgradeData>,
    /// Research nodes.
    pub research: Vec<ResearchData>,
    /// Contracts.
    pub contracts: Vec<ContractData>,
    /// Facilities.
    pub facilities: Vec<FacilityData>,
    /// Forge blueprints.
    pub blueprints: Vec<BlueprintData>,
    /// Equipment affixes.
    pub affixes: Vec<AffixData>,
    /// Alchemy recipes.
    pub recipes: Vec<RecipeData>,
    /// Consumables.
    pub consumables: Vec<ConsumableData>,
    /// Expeditions.
    pub expeditions: Vec<ExpeditionData>,
    /// Disciple archetypes, in recruitment rotation order.
    pub archetypes: Vec<ArchetypeData>,
    /// Realms, in ladder order.
    pub realms: Vec<RealmData>,
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// The embedded catalog, parsed on first access.
///
/// # Panics
///
/// Panics if an embedded table fails to parse or validate.
pub fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(|| match Catalog::load_embedded() {
        Ok(catalog) => {
            tracing::debug!(
                upgrades = catalog.upgrades.len(),
                research = catalog.research.len(),
                contracts = catalog.contracts.len(),
                realms = catalog.realms.len(),
                "Loaded embedded catalog"
            );
            catalog
        }
        Err(e) => panic!("embedded catalog is invalid: {e}"),
    })
}

/// Balance constants of the embedded catalog.
pub fn balance() -> &'static Balance {
    &catalog().balance
}

fn parse<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    ron::from_str(text).map_err(|e| GameError::DataParseError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

impl Catalog {
    /// Parse and validate the tables embedded in the crate.
    pub fn load_embedded() -> Result<Self> {
        let catalog = Self {
            balance: parse("data/balance.ron", include_str!("../../data/balance.ron"))?,
            upgrades: parse("data/upgrades.ron", include_str!("../../data/upgrades.ron"))?,
            research: parse("data/research.ron", include_str!("../../data/research.ron"))?,
            contracts: parse("data/contracts.ron", include_str!("../../data/contracts.ron"))?,
            facilities: parse(
                "data/facilities.ron",
                include_str!("../../data/facilities.ron"),
            )?,
            blueprints: parse(
                "data/blueprints.ron",
                include_str!("../../data/blueprints.ron"),
            )?,
            affixes: parse("data/affixes.ron", include_str!("../../data/affixes.ron"))?,
            recipes: parse("data/recipes.ron", include_str!("../../data/recipes.ron"))?,
            consumables: parse(
                "data/consumables.ron",
                include_str!("../../data/consumables.ron"),
            )?,
            expeditions: parse(
                "data/expeditions.ron",
                include_str!("../../data/expeditions.ron"),
            )?,
            archetypes: parse(
                "data/archetypes.ron",
                include_str!("../../data/archetypes.ron"),
            )?,
            realms: parse("data/realms.ron", include_str!("../../data/realms.ron"))?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check ids are unique and every cross reference resolves.
    pub fn validate(&self) -> Result<()> {
        fn unique<T: Definition>(items: &[T]) -> Result<()> {
            let mut seen = BTreeSet::new();
            for item in items {
                if !seen.insert(item.id()) {
                    return Err(GameError::InvalidCatalog(format!(
                        "duplicate {} id '{}'",
                        T::KIND,
                        item.id()
                    )));
                }
            }
            Ok(())
        }

        unique(&self.upgrades)?;
        unique(&self.research)?;
        unique(&self.contracts)?;
        unique(&self.facilities)?;
        unique(&self.blueprints)?;
        unique(&self.affixes)?;
        unique(&self.recipes)?;
        unique(&self.consumables)?;
        unique(&self.expeditions)?;
        unique(&self.archetypes)?;
        unique(&self.realms)?;

        if self.realms.is_empty() {
            return Err(GameError::InvalidCatalog("no realms defined".into()));
        }
        if self.archetypes.is_empty() {
            return Err(GameError::InvalidCatalog("no archetypes defined".into()));
        }
        for rarity in [Rarity::Common, Rarity::Uncommon, Rarity::Rare, Rarity::Epic] {
            self.rarity(rarity)?;
        }

        for node in &self.research {
            for prereq in &node.prerequisites {
                self.research_node(prereq)?;
            }
            for effect in &node.effects {
                if let ResearchEffect::UnlockExpedition(id) = effect {
                    self.expedition(id)?;
                }
            }
        }
        for blueprint in &self.blueprints {
            if let Some(id) = &blueprint.requires_research {
                self.research_node(id)?;
            }
        }
        for recipe in &self.recipes {
            self.consumable(&recipe.output)?;
        }
        for expedition in &self.expeditions {
            if expedition.event_interval_ms == 0 {
                return Err(GameError::InvalidCatalog(format!(
                    "expedition '{}' has a zero event interval",
                    expedition.id
                )));
            }
            for entry in &expedition.rewards {
                match &entry.reward {
                    RewardKind::Resource { .. } => {}
                    RewardKind::Recipe { recipe_id } => {
                        self.recipe(recipe_id)?;
                    }
                    RewardKind::Equipment { blueprint_id } => {
                        self.blueprint(blueprint_id)?;
                    }
                }
            }
        }
        for realm in &self.realms {
            for id in &realm.unlocks.contracts {
                self.contract(id)?;
            }
            for id in &realm.unlocks.research {
                self.research_node(id)?;
            }
            for id in &realm.unlocks.recipes {
                self.recipe(id)?;
            }
        }
        Ok(())
    }

    /// Look up an upgrade.
    pub fn upgrade(&self, id: &str) -> Result<&UpgradeData> {
        lookup(&self.upgrades, id)
    }

    /// Look up a research node.
    pub fn research_node(&self, id: &str) -> Result<&ResearchData> {
        lookup(&self.research, id)
    }

    /// Look up a contract.
    pub fn contract(&self, id: &str) -> Result<&ContractData> {
        lookup(&self.contracts, id)
    }

    /// Look up a facility.
    pub fn facility(&self, id: &str) -> Result<&FacilityData> {
        lookup(&self.facilities, id)
    }

    /// Look up a forge blueprint.
    pub fn blueprint(&self, id: &str) -> Result<&BlueprintData> {
        lookup(&self.blueprints, id)
    }

    /// Look up an affix.
    pub fn affix(&self, id: &str) -> Result<&AffixData> {
        lookup(&self.affixes, id)
    }

    /// Look up an alchemy recipe.
    pub fn recipe(&self, id: &str) -> Result<&RecipeData> {
        lookup(&self.recipes, id)
    }

    /// Look up a consumable.
    pub fn consumable(&self, id: &str) -> Result<&ConsumableData> {
        lookup(&self.consumables, id)
    }

    /// Look up an expedition.
    pub fn expedition(&self, id: &str) -> Result<&ExpeditionData> {
        lookup(&self.expeditions, id)
    }

    /// Look up a disciple archetype.
    pub fn archetype(&self, id: &str) -> Result<&ArchetypeData> {
        lookup(&self.archetypes, id)
    }

    /// Look up a realm.
    pub fn realm(&self, id: &str) -> Result<&RealmData> {
        lookup(&self.realms, id)
    }

    /// Ladder position of a realm.
    pub fn realm_index(&self, id: &str) -> Result<usize> {
        self.realms
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| GameError::unknown(DefinitionKind::Realm, id))
    }

    /// The realm every run starts in.
    #[must_use]
    pub fn initial_realm(&self) -> &RealmData {
        // Non-empty, checked by validate().
        &self.realms[0]
    }

    /// Roll weight and scaling for a rarity tier.
    pub fn rarity(&self, rarity: Rarity) -> Result<&RarityData> {
        self.balance
            .rarities
            .iter()
            .find(|r| r.rarity == rarity)
            .ok_or_else(|| GameError::InvalidCatalog(format!("no rarity entry for {rarity:?}")))
    }
}
