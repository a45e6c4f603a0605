//! Runtime side of the engine.
//!
//! A [`Machine`] is the frozen topology; a [`Context`] is one running
//! instance of it. Evaluation is synchronous and happens on the caller's
//! thread:
//!
//! - [`Machine::step`] evaluates guarded and unconditional transitions, or
//!   runs the current state's do-action when none fires
//! - [`Machine::notify`] evaluates triggered transitions against one event
//! - [`Machine::run`] steps until the context halts
//!
//! Contexts shared between threads are bound to a [`LockStrategy`] and
//! driven through a [`LockedContext`].

mod context;
mod lock;
mod machine;
mod transition;

pub use context::{Context, ContextAccess};
pub use lock::{Blocking, LockStrategy, LockedContext, NonBlocking};
pub use machine::Machine;
pub use transition::Transition;
