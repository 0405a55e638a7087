//! Essence production calculator.
//!
//! The cached [`ProductionState`] is not kept in sync automatically. Every
//! operation that changes an input (upgrades, research, insight, facilities,
//! equipped gear, production buffs) calls [`calculate_production`] before
//! returning, and `tick` recomputes once at the end of each step.
//!
//! ```text
//! additive   = sum(amount * level)          over "add" upgrades
//! upgrades   = product(factor ^ level)      over "mult" upgrades
//! multiplier = upgrades * research * (1 + insight * bonus) * equipment * facility * buff
//! perSecond  = (base + additive) * multiplier
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog, UpgradeEffect};
use crate::error::Result;
use crate::modifiers::Modifiers;
use crate::state::GameState;

/// Derived production snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionState {
    /// Essence/sec before any bonus.
    pub base_per_second: f64,
    /// Flat essence/sec from upgrades.
    pub additive_bonus: f64,
    /// Combined multiplier.
    pub multiplier: f64,
    /// `(base_per_second + additive_bonus) * multiplier`.
    pub per_second: f64,
}

impl ProductionState {
    /// Snapshot with no bonuses applied.
    #[must_use]
    pub const fn from_base(base_per_second: f64) -> Self {
        Self {
            base_per_second,
            additive_bonus: 0.0,
            multiplier: 1.0,
            per_second: base_per_second,
        }
    }
}

/// Recompute the production snapshot from the current state.
pub fn calculate_production(state: &mut GameState) -> Result<()> {
    let mods = Modifiers::for_state(state)?;
    apply_production(state, &mods)
}

/// Recompute the production snapshot using precomputed modifiers.
pub fn apply_production(state: &mut GameState, mods: &Modifiers) -> Result<()> {
    let catalog = catalog();

    let mut additive_bonus = 0.0;
    let mut upgrade_mult = 1.0;
    for (id, &level) in &state.upgrades {
        if level == 0 {
            continue;
        }
        match catalog.upgrade(id)?.effect {
            UpgradeEffect::Add { amount } => additive_bonus += amount * f64::from(level),
            UpgradeEffect::Mult { factor } => upgrade_mult *= factor.powi(level as i32),
        }
    }

    let insight_mult = 1.0 + state.resources.insight * catalog.balance.insight_production_bonus;
    let multiplier = upgrade_mult * mods.research_production * insight_mult * mods.equipment_production
        * mods.facility_production
        * mods.buff_production;

    let base_per_second = catalog.balance.base_essence_per_second;
    state.production = ProductionState {
        base_per_second,
        additive_bonus,
        multiplier,
        per_second: (base_per_second + additive_bonus) * multiplier,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::ResearchNodeState;

    #[test]
    fn test_fresh_production_is_base() {
        let mut state = GameState::new(1);
        calculate_production(&mut state).unwrap();
        let base = catalog().balance.base_essence_per_second;
        assert_eq!(state.production, ProductionState::from_base(base));
    }

    #[test]
    fn test_add_and_mult_upgrades() {
        let mut state = GameState::new(1);
        state.upgrades.insert("spirit_well".to_string(), 3);
        state.upgrades.insert("jade_talisman".to_string(), 2);
        calculate_production(&mut state).unwrap();

        let p = state.production;
        assert_eq!(p.additive_bonus, 3.0);
        assert!((p.multiplier - 1.1f64.powi(2)).abs() < 1e-12);
        assert!((p.per_second - (1.0 + 3.0) * 1.21).abs() < 1e-9);
    }

    #[test]
    fn test_insight_and_research_multiply() {
        let mut state = GameState::new(1);
        state.resources.insight = 10.0;
        state.research.insert(
            "focused_breathing".to_string(),
            ResearchNodeState { purchased: true },
        );
        calculate_production(&mut state).unwrap();

        let insight_mult = 1.0 + 10.0 * catalog().balance.insight_production_bonus;
        assert!((state.production.multiplier - 1.25 * insight_mult).abs() < 1e-12);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut state = GameState::new(1);
        state.upgrades.insert("meditation_mat".to_string(), 4);
        state.resources.insight = 3.0;
        calculate_production(&mut state).unwrap();
        let first = state.production;
        calculate_production(&mut state).unwrap();
        assert_eq!(state.production, first);
    }

    #[test]
    fn test_unknown_upgrade_is_fatal() {
        let mut state = GameState::new(1);
        state.upgrades.insert("ghost_upgrade".to_string(), 1);
        assert!(calculate_production(&mut state).is_err());
    }
}
