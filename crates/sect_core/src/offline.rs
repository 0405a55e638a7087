//! Offline catch-up.
//!
//! The absence is capped and scaled by the offline modifiers, then applied as
//! a single tick. That tick still splits at buff expiry and at completions
//! automation acts on, and expeditions walk their event boundaries, so the
//! result matches ticking the same time live.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::modifiers::Modifiers;
use crate::state::{GameState, Transition};
use crate::tick::tick;

/// How much of an absence was credited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineReport {
    /// Wall-clock time since the save.
    pub elapsed_ms: u64,
    /// `elapsed_ms` limited to the offline cap.
    pub capped_ms: u64,
    /// Time actually simulated after efficiency.
    pub applied_ms: u64,
}

/// Compute the credited time for an absence without applying it.
///
/// # Errors
///
/// Returns an error if the state references ids missing from the catalog.
pub fn offline_report(state: &GameState, saved_at_ms: u64, now_ms: u64) -> Result<OfflineReport> {
    let mods = Modifiers::for_state(state)?;
    let elapsed_ms = now_ms.saturating_sub(saved_at_ms);
    let cap_ms = mods.offline_cap_ms.max(0.0) as u64;
    let capped_ms = elapsed_ms.min(cap_ms);
    let applied_ms = (capped_ms as f64 * mods.offline_efficiency).floor() as u64;
    Ok(OfflineReport {
        elapsed_ms,
        capped_ms,
        applied_ms,
    })
}

/// Apply the time that passed between `saved_at_ms` and `now_ms`.
///
/// A clock that runs backwards credits nothing.
///
/// # Errors
///
/// Returns an error if the state references ids missing from the catalog.
pub fn offline_progress(
    state: &GameState,
    saved_at_ms: u64,
    now_ms: u64,
) -> Result<(Transition, OfflineReport)> {
    let report = offline_report(state, saved_at_ms, now_ms)?;
    let transition = tick(state, report.applied_ms as f64)?;
    tracing::info!(
        elapsed_ms = report.elapsed_ms,
        applied_ms = report.applied_ms,
        "Offline progress applied"
    );
    Ok((transition, report))
}
