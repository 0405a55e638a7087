//! Resource ledger.
//!
//! A fixed set of named counters with add/spend/affordability helpers.
//!
//! The ledger does not clamp: [`Resources::spend`] subtracts unconditionally
//! and can drive a balance negative. Every caller gates spending behind
//! [`Resources::can_afford`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier for one of the ledger's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceId {
    /// Primary currency, produced passively.
    Essence,
    /// Prestige currency, survives ascension.
    Insight,
    /// Spent on research nodes.
    Research,
    /// Gates higher contracts and realms.
    Reputation,
    /// Alchemy input, gathered by disciples.
    Herb,
    /// Forging input, mined by disciples.
    Ore,
}

impl ResourceId {
    /// Every resource id, in ledger order.
    pub const ALL: [Self; 6] = [
        Self::Essence,
        Self::Insight,
        Self::Research,
        Self::Reputation,
        Self::Herb,
        Self::Ore,
    ];
}

/// A sparse set of resource amounts, used for costs, rewards and deltas.
///
/// Missing keys count as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceBundle(pub BTreeMap<ResourceId, f64>);

impl ResourceBundle {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, id: ResourceId, amount: f64) -> Self {
        self.0.insert(id, amount);
        self
    }

    /// Amount for `id`, zero if absent.
    #[must_use]
    pub fn get(&self, id: ResourceId) -> f64 {
        self.0.get(&id).copied().unwrap_or(0.0)
    }

    /// Iterate over present entries.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, f64)> + '_ {
        self.0.iter().map(|(id, amount)| (*id, *amount))
    }

    /// Whether no entry is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every entry multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.iter().map(|(id, v)| (*id, v * factor)).collect())
    }
}

/// Current balances of every resource.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resources {
    /// Essence balance.
    pub essence: f64,
    /// Insight balance.
    pub insight: f64,
    /// Research point balance.
    pub research: f64,
    /// Reputation balance.
    pub reputation: f64,
    /// Herb balance.
    pub herb: f64,
    /// Ore balance.
    pub ore: f64,
}

impl Resources {
    /// Balance of `id`.
    #[must_use]
    pub const fn get(&self, id: ResourceId) -> f64 {
        match id {
            ResourceId::Essence => self.essence,
            ResourceId::Insight => self.insight,
            ResourceId::Research => self.research,
            ResourceId::Reputation => self.reputation,
            ResourceId::Herb => self.herb,
            ResourceId::Ore => self.ore,
        }
    }

    /// Mutable balance of `id`.
    pub fn get_mut(&mut self, id: ResourceId) -> &mut f64 {
        match id {
            ResourceId::Essence => &mut self.essence,
            ResourceId::Insight => &mut self.insight,
            ResourceId::Research => &mut self.research,
            ResourceId::Reputation => &mut self.reputation,
            ResourceId::Herb => &mut self.herb,
            ResourceId::Ore => &mut self.ore,
        }
    }

    /// Add every entry of `delta`.
    pub fn add(&mut self, delta: &ResourceBundle) {
        for (id, amount) in delta.iter() {
            *self.get_mut(id) += amount;
        }
    }

    /// Subtract every entry of `cost`, without any floor.
    pub fn spend(&mut self, cost: &ResourceBundle) {
        for (id, amount) in cost.iter() {
            *self.get_mut(id) -= amount;
        }
    }

    /// Whether every entry of `cost` is covered by the current balance.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        cost.iter().all(|(id, amount)| amount <= self.get(id))
    }

    /// A copy with every balance zeroed except insight.
    #[must_use]
    pub const fn keep_insight(&self) -> Self {
        Self {
            essence: 0.0,
            insight: self.insight,
            research: 0.0,
            reputation: 0.0,
            herb: 0.0,
            ore: 0.0,
        }
    }
}
