//! Replay system for recording and playing back sessions.
//!
//! A replay stores a binary snapshot of the starting state and the ordered
//! stream of ticks and actions applied to it. Because every transition is a
//! pure function of its inputs, playing the stream back recreates the session
//! exactly, and the final state hash verifies it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::{apply_action, Action};
use crate::error::{GameError, Result};
use crate::state::GameState;
use crate::tick::tick;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReplayInput {
    /// A time step.
    Tick {
        /// Step length.
        dt_ms: f64,
    },
    /// A player action.
    Action {
        /// The action issued.
        action: Action,
        /// Wall-clock time passed to the dispatcher.
        now_ms: u64,
    },
}

impl ReplayInput {
    /// Apply this input to `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition fails fatally.
    pub fn apply(&self, state: &GameState) -> Result<GameState> {
        let transition = match self {
            Self::Tick { dt_ms } => tick(state, *dt_ms)?,
            Self::Action { action, now_ms } => apply_action(state, action, *now_ms)?,
        };
        Ok(transition.into_state())
    }
}

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Binary snapshot of the starting state.
    pub initial_state: Vec<u8>,
    /// Inputs in the order they were applied.
    pub inputs: Vec<ReplayInput>,
    /// Hash of the final state.
    pub final_hash: u64,
}

impl Replay {
    /// Start recording from `initial_state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be snapshotted.
    pub fn new(initial_state: &GameState) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            initial_state: initial_state.to_bytes()?,
            inputs: Vec::new(),
            final_hash: initial_state.state_hash(),
        })
    }

    /// Record a time step.
    pub fn record_tick(&mut self, dt_ms: f64) {
        self.inputs.push(ReplayInput::Tick { dt_ms });
    }

    /// Record a player action.
    pub fn record_action(&mut self, action: Action, now_ms: u64) {
        self.inputs.push(ReplayInput::Action { action, now_ms });
    }

    /// Finalize the replay with the end state.
    pub fn finalize(&mut self, final_state: &GameState) {
        self.final_hash = final_state.state_hash();
    }

    /// Save the replay to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| GameError::Io(format!("Failed to write replay file: {e}")))
    }

    /// Load a replay from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or parsing fails, or the version differs.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GameError::Io(format!("Failed to read replay file: {e}")))?;
        let replay: Self = serde_json::from_str(&json)?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::UnsupportedReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }
        Ok(replay)
    }

    /// Decode the starting state.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is corrupt.
    pub fn restore_initial_state(&self) -> Result<GameState> {
        GameState::from_bytes(&self.initial_state)
    }

    /// Number of recorded inputs.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Total simulated time across all ticks.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.inputs
            .iter()
            .map(|input| match input {
                ReplayInput::Tick { dt_ms } if *dt_ms > 0.0 => *dt_ms,
                _ => 0.0,
            })
            .sum()
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    state: GameState,
    position: usize,
    /// Whether playback is paused.
    pub paused: bool,
}

impl ReplayPlayer {
    /// Create a player positioned at the start.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let state = replay.restore_initial_state()?;
        Ok(Self {
            replay,
            state,
            position: 0,
            paused: false,
        })
    }

    /// Apply the next input.
    ///
    /// Returns whether more inputs remain.
    ///
    /// # Errors
    ///
    /// Returns an error if the input fails fatally.
    pub fn advance(&mut self) -> Result<bool> {
        if self.paused {
            return Ok(!self.is_finished());
        }
        if let Some(input) = self.replay.inputs.get(self.position) {
            self.state = input.apply(&self.state)?;
            self.position += 1;
        }
        Ok(!self.is_finished())
    }

    /// Rewind and play up to input `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be restored or an input fails.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        self.state = self.replay.restore_initial_state()?;
        self.position = 0;
        let end = target.min(self.replay.inputs.len());
        for input in &self.replay.inputs[..end] {
            self.state = input.apply(&self.state)?;
        }
        self.position = end;
        Ok(())
    }

    /// Index of the next input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The state after the inputs applied so far.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Whether every input has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.replay.inputs.len()
    }

    /// Play the whole replay and compare against the recorded hash.
    ///
    /// # Errors
    ///
    /// Returns an error if state restoration or an input fails.
    pub fn verify(&mut self) -> Result<bool> {
        self.seek(self.replay.inputs.len())?;
        Ok(self.state.state_hash() == self.replay.final_hash)
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Progress as a percentage (0-100).
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.replay.inputs.is_empty() {
            100.0
        } else {
            (self.position as f64 / self.replay.inputs.len() as f64) * 100.0
        }
    }
}
