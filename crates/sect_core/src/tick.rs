//! The time step.
//!
//! A tick is split into pieces at every point where the modifiers or the
//! automation could change mid-step: buff expiry, and contract or forge
//! completion while automation would act on it. Each piece runs the
//! subsystems in a fixed order against modifiers computed at its start:
//!
//! 1. Essence production
//! 2. Disciple gathering
//! 3. Buff decay
//! 4. Contracts
//! 5. Forging
//! 6. Alchemy
//! 7. Expeditions (sub-stepped at event boundaries)
//! 8. Automation
//! 9. Production recompute
//!
//! Piece boundaries are rounded up to whole milliseconds, so one long tick and
//! many short ones cross them at the same instants.

use crate::alchemy::{decay_buffs, progress_alchemy};
use crate::automation::{run_automation, AutoAcceptMode};
use crate::contracts::{progress_contracts, ContractStatus};
use crate::disciples::gather_resources;
use crate::error::Result;
use crate::expeditions::progress_expedition;
use crate::forging::progress_forging;
use crate::modifiers::Modifiers;
use crate::production::calculate_production;
use crate::state::{GameState, Transition};

/// Advance `state` by `dt_ms` milliseconds.
///
/// A non-positive or non-finite delta is a no-op.
///
/// # Example
///
/// ```
/// use sect_core::state::GameState;
/// use sect_core::tick::tick;
///
/// let state = GameState::new(1);
/// let next = tick(&state, 1_000.0).unwrap();
/// assert!(next.changed);
/// assert!(next.state.resources.essence > 0.0);
///
/// assert!(!tick(&state, 0.0).unwrap().changed);
/// ```
///
/// # Errors
///
/// Returns an error if the state references ids missing from the catalog.
pub fn tick(state: &GameState, dt_ms: f64) -> Result<Transition> {
    if !(dt_ms > 0.0 && dt_ms.is_finite()) {
        return Ok(Transition::unchanged(state));
    }
    let mut next = state.clone();
    advance(&mut next, dt_ms)?;
    Ok(Transition::compare(state, next))
}

/// Advance a working copy in place.
pub(crate) fn advance(state: &mut GameState, dt_ms: f64) -> Result<()> {
    let mut remaining = dt_ms;
    while remaining > 0.0 {
        let mods = Modifiers::for_state(state)?;
        let piece = next_boundary_ms(state, &mods).map_or(remaining, |b| b.min(remaining));
        step(state, &mods, piece)?;
        remaining -= piece;
    }

    #[cfg(feature = "debug-validation")]
    {
        for violation in state.validate() {
            tracing::warn!(%violation, "State invariant violated");
        }
    }

    #[cfg(debug_assertions)]
    {
        tracing::debug!(dt_ms, state_hash = state.state_hash(), "Tick state hash");
    }

    Ok(())
}

/// Run every subsystem once over `dt_ms`.
fn step(state: &mut GameState, mods: &Modifiers, dt_ms: f64) -> Result<()> {
    state.earn_essence(state.production.per_second * dt_ms / 1000.0);
    gather_resources(state, mods, dt_ms);
    decay_buffs(state, dt_ms);

    progress_contracts(state, dt_ms, mods.contract_speed);
    progress_forging(state, dt_ms, mods.forge_speed)?;
    progress_alchemy(state, dt_ms, mods.alchemy_speed)?;
    progress_expedition(state, dt_ms, mods)?;

    run_automation(state, mods)?;
    calculate_production(state)
}

/// Time until the next event that changes the modifiers or gives automation
/// something to do, rounded up to a whole millisecond.
fn next_boundary_ms(state: &GameState, mods: &Modifiers) -> Option<f64> {
    let mut next: Option<f64> = None;
    let mut consider = |t: f64| {
        next = Some(next.map_or(t, |n| n.min(t)));
    };

    for buff in &state.buffs {
        consider(buff.remaining_ms);
    }

    let automation = &state.automation;
    let contracts_automated = mods.can_auto_contracts
        && (automation.auto_claim || automation.auto_accept != AutoAcceptMode::Off);
    if contracts_automated && mods.contract_speed > 0.0 {
        for slot in &state.contracts.slots {
            if slot.status == ContractStatus::Active {
                consider((slot.duration_ms as f64 - slot.elapsed_ms) / mods.contract_speed);
            }
        }
    }

    if mods.can_auto_forge && automation.auto_forge.is_some() && mods.forge_speed > 0.0 {
        if let Some(task) = &state.forging.active {
            consider(task.remaining_ms / mods.forge_speed);
        }
    }

    next.map(|t| t.ceil().max(1.0))
}
