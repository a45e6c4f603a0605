use crate::core::{StateRef, TransitionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to encode checkpoint: {0}")]
    Encode(String),

    #[error("Failed to decode checkpoint: {0}")]
    Decode(String),

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The saved state handle does not exist in the restoring machine
    #[error("State '{name}' ({state}) is unknown to this machine")]
    UnknownState { state: StateRef, name: String },

    /// The handle exists but was registered under another name
    #[error("State {state} is named '{expected}' in this machine, checkpoint says '{found}'")]
    NameMismatch {
        state: StateRef,
        expected: String,
        found: String,
    },

    /// A history record does not match any transition of the machine
    #[error("History record for transition #{} does not match this machine", .transition.index())]
    HistoryMismatch { transition: TransitionId },

    /// Only the final pseudostate may be saved as halted
    #[error("Context on {state} cannot have halted = {halted}")]
    HaltedMismatch { state: StateRef, halted: bool },
}
