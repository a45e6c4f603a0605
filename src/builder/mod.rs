//! Registration API for machine topologies.
//!
//! States and transitions are registered on a [`MachineBuilder`], which
//! hands out [`StateId`](crate::core::StateId) and
//! [`TransitionId`](crate::core::TransitionId) handles. [`MachineBuilder::build`]
//! validates the result and freezes it into a
//! [`Machine`](crate::engine::Machine).

pub mod error;
pub mod machine;
pub mod transition;

pub use error::{BuildError, TopologyViolation};
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;
