//! Essence upgrade definitions.

use serde::{Deserialize, Serialize};

use super::Definition;
use crate::error::DefinitionKind;

/// How an upgrade contributes to essence production.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Adds `amount * level` essence/sec before multipliers.
    Add {
        /// Flat essence/sec per level.
        amount: f64,
    },
    /// Multiplies production by `factor ^ level`.
    Mult {
        /// Multiplier per level.
        factor: f64,
    },
}

/// Data-driven upgrade definition.
///
/// # Example RON
///
/// ```ron
/// UpgradeData(
///     id: "spirit_well",
///     name: "upgrade.spirit_well.name",
///     base_cost: 10.0,
///     cost_growth: 1.15,
///     effect: Add(amount: 1.0),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeData {
    /// Unique string identifier.
    pub id: String,
    /// Localization key for the display name.
    pub name: String,
    /// Essence cost of the first level.
    pub base_cost: f64,
    /// Cost multiplier per level owned.
    pub cost_growth: f64,
    /// Production effect per level.
    pub effect: UpgradeEffect,
    /// Optional level cap.
    #[serde(default)]
    pub max_level: Option<u32>,
}

impl UpgradeData {
    /// Essence cost to go from `level` to `level + 1`.
    #[must_use]
    pub fn cost_at(&self, level: u32) -> f64 {
        (self.base_cost * self.cost_growth.powi(level as i32)).floor()
    }

    /// Whether `level` is at or beyond the cap.
    #[must_use]
    pub fn is_maxed(&self, level: u32) -> bool {
        self.max_level.is_some_and(|max| level >= max)
    }
}

impl Definition for UpgradeData {
    const KIND: DefinitionKind = DefinitionKind::Upgrade;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_upgrade() -> UpgradeData {
        UpgradeData {
            id: "spirit_well".to_string(),
            name: "upgrade.spirit_well.name".to_string(),
            base_cost: 10.0,
            cost_growth: 1.15,
            effect: UpgradeEffect::Add { amount: 1.0 },
            max_level: Some(3),
        }
    }

    #[test]
    fn test_cost_curve_is_floored() {
        let upgrade = create_test_upgrade();
        assert_eq!(upgrade.cost_at(0), 10.0);
        assert_eq!(upgrade.cost_at(1), 11.0);
        assert_eq!(upgrade.cost_at(5), 20.0);
    }

    #[test]
    fn test_max_level() {
        let upgrade = create_test_upgrade();
        assert!(!upgrade.is_maxed(2));
        assert!(upgrade.is_maxed(3));
    }
}
