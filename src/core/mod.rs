//! Core data model of the engine.
//!
//! This module contains the plain data the engine operates on:
//! - State identities, including the initial and final pseudostates
//! - Guard, trigger and action callables
//! - The history of fired transitions
//!
//! Nothing in here drives a machine; see [`crate::engine`] for that.

mod guard;
mod history;
mod state;

pub use guard::{Action, Guard, Trigger};
pub use history::{FiredTransition, TransitionHistory};
pub use state::{MachineTag, State, StateId, StateRef, TransitionId};
