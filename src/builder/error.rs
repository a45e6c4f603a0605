//! Build errors for machine and transition builders.

use crate::core::TransitionId;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition source not specified. Call .from(state)")]
    MissingSource,

    #[error("Transition target not specified. Call .to(state)")]
    MissingTarget,

    #[error("Invalid machine topology ({} violation(s))", .0.len())]
    InvalidTopology(Vec<TopologyViolation>),
}

impl BuildError {
    /// Every topology violation reported by `build`, empty for other errors.
    pub fn violations(&self) -> &[TopologyViolation] {
        match self {
            Self::InvalidTopology(violations) => violations,
            Self::MissingSource | Self::MissingTarget => &[],
        }
    }
}

/// A single defect in a registered topology.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyViolation {
    #[error("No transition leaves the initial pseudostate")]
    MissingInitialTransition,

    #[error("Transition {transition:?} leaves the final pseudostate")]
    FinalAsSource { transition: TransitionId },

    #[error("Transition {transition:?} targets the initial pseudostate")]
    InitialAsTarget { transition: TransitionId },
}
