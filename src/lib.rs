//! Stepwise: an embeddable finite state machine engine
//!
//! The topology of a machine (states and the transitions between them) is
//! registered once and frozen. Any number of independent contexts can then
//! run on that topology, each with its own current state and payload.
//!
//! # Core Concepts
//!
//! - **States** carry optional enter, do and exit actions
//! - **Transitions** carry an optional guard, trigger and effect; which of
//!   them are present decides whether `step` or `notify` may fire it
//! - **Pseudostates**: every context starts on `Initial` and halts on `Final`
//! - **Contexts** are driven by `step` (guards, unconditional transitions and
//!   do-actions) and `notify` (triggers, one event at a time)
//!
//! # Example
//!
//! ```rust
//! use stepwise::builder::MachineBuilder;
//! use stepwise::core::StateRef;
//! use stepwise::engine::Context;
//!
//! let mut builder = MachineBuilder::<Vec<&'static str>, ()>::new();
//! let idle = builder.state("idle");
//! builder.set_enter_action(idle, |log: &mut Vec<&'static str>| log.push("enter idle"));
//! builder.set_exit_action(idle, |log: &mut Vec<&'static str>| log.push("exit idle"));
//! builder.transition(StateRef::Initial, idle);
//! let stop = builder.transition(idle, StateRef::Final);
//! builder.set_effect(stop, |log: &mut Vec<&'static str>| log.push("stop"));
//! let machine = builder.build().unwrap();
//!
//! let mut context = Context::new(Vec::new());
//! machine.run(&mut context);
//!
//! assert!(context.is_halted());
//! assert_eq!(context.user_data(), &["enter idle", "exit idle", "stop"]);
//! ```
//!
//! # Tracing
//!
//! Every fired transition is reported as a `TRACE` event with target
//! `stepwise::fire` and message `"<source> -> <target>"`. Install any
//! `tracing` subscriber to see them.

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use core::{MachineTag, StateId, StateRef, TransitionId};
pub use engine::{Blocking, Context, LockedContext, Machine, NonBlocking};
