//! Checkpoint and resume for contexts.
//!
//! A checkpoint captures where one context is in its machine so it can be
//! resumed after a restart. Only per-context progress is saved: callables
//! and the machine topology are code and are rebuilt by the application.

use crate::core::{StateRef, TransitionHistory};
use crate::engine::{Context, Machine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a context's progress.
///
/// The payload is not part of the checkpoint; it is supplied again on
/// [`restore`](Self::restore).
///
/// ```rust
/// use stepwise::builder::MachineBuilder;
/// use stepwise::checkpoint::Checkpoint;
/// use stepwise::core::StateRef;
/// use stepwise::engine::Context;
///
/// let mut builder = MachineBuilder::<(), ()>::new();
/// let idle = builder.state("idle");
/// builder.transition(StateRef::Initial, idle);
/// let machine = builder.build().unwrap();
///
/// let mut context = Context::new(());
/// machine.step(&mut context);
///
/// let json = Checkpoint::capture(&machine, &context).to_json().unwrap();
/// let resumed = Checkpoint::from_json(&json)
///     .unwrap()
///     .restore(&machine, ())
///     .unwrap();
/// assert_eq!(resumed.current_state(), StateRef::Named(idle));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// State the context was in
    pub current_state: StateRef,

    /// Name of `current_state` in the capturing machine
    pub state_name: String,

    /// Whether the context had halted
    pub halted: bool,

    /// Recorded history, if the context kept one
    pub history: Option<TransitionHistory>,
}

impl Checkpoint {
    pub fn capture<U, E>(machine: &Machine<U, E>, context: &Context<U>) -> Self {
        let current_state = context.current_state();
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            current_state,
            state_name: machine.state_name(current_state).to_string(),
            halted: context.is_halted(),
            history: context.history().cloned(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Decode(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::Decode(e.to_string()))
    }

    /// Rebuild a context positioned where this checkpoint was taken.
    ///
    /// Saved handles are re-issued for `machine`, so a checkpoint taken on one
    /// build of a topology resumes on a later build of the same topology.
    ///
    /// Fails if the format version is unsupported, if the saved state does not
    /// exist in `machine`, if it exists under a different name, or if the
    /// history names transitions `machine` does not have.
    pub fn restore<U, E>(
        self,
        machine: &Machine<U, E>,
        user_data: U,
    ) -> Result<Context<U>, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        let current_state = self.validate_against(machine)?;
        let history = self.history.map(|mut history| {
            history.rebind(machine.tag());
            history
        });
        if let Some(history) = &history {
            validate_history(history, machine)?;
        }

        tracing::debug!(
            target: "stepwise::checkpoint",
            checkpoint = %self.id,
            state = %self.state_name,
            halted = self.halted,
            "restoring context"
        );
        Ok(Context::restored(
            user_data,
            current_state,
            self.halted,
            history,
        ))
    }

    /// The saved state as a handle of `machine`.
    fn validate_against<U, E>(&self, machine: &Machine<U, E>) -> Result<StateRef, CheckpointError> {
        let state = self.current_state;
        match state {
            StateRef::Named(id) if id.index() >= machine.state_count() => {
                Err(CheckpointError::UnknownState {
                    state,
                    name: self.state_name.clone(),
                })
            }
            StateRef::Final if !self.halted => Err(CheckpointError::HaltedMismatch {
                state,
                halted: false,
            }),
            StateRef::Initial | StateRef::Named(_) if self.halted => {
                Err(CheckpointError::HaltedMismatch {
                    state,
                    halted: true,
                })
            }
            _ => {
                let rebound = state.rebind(machine.tag());
                let name = machine.state_name(rebound);
                if name == self.state_name {
                    Ok(rebound)
                } else {
                    Err(CheckpointError::NameMismatch {
                        state,
                        expected: name.to_string(),
                        found: self.state_name.clone(),
                    })
                }
            }
        }
    }
}

fn validate_history<U, E>(
    history: &TransitionHistory,
    machine: &Machine<U, E>,
) -> Result<(), CheckpointError> {
    for fired in history.transitions() {
        let matches = fired.transition.index() < machine.transition_count() && {
            let transition = machine.transition(fired.transition);
            transition.source() == fired.from && transition.target() == fired.to
        };
        if !matches {
            return Err(CheckpointError::HistoryMismatch {
                transition: fired.transition,
            });
        }
    }
    Ok(())
}
