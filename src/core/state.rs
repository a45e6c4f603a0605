//! State identities and registered states.
//!
//! A machine refers to its states through [`StateRef`], which also covers the
//! initial and final pseudostates. The pseudostates never carry actions.

use super::guard::Action;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of the builder, and of the machine built from it, that issued a
/// handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct MachineTag(u64);

impl MachineTag {
    /// A tag no other builder in this process has.
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    // Never issued by `fresh`, so it matches no machine.
    #[cfg(test)]
    pub(crate) const UNBOUND: Self = Self(0);
}

/// Handle to a state registered on a [`MachineBuilder`](crate::builder::MachineBuilder).
///
/// Handles are arena indices stamped with the issuing builder. They are only
/// meaningful for that builder and the machine built from it; using one
/// anywhere else panics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct StateId {
    pub(crate) machine: MachineTag,
    pub(crate) index: usize,
}

impl StateId {
    pub(crate) fn new(machine: MachineTag, index: usize) -> Self {
        Self { machine, index }
    }

    #[cfg(test)]
    pub(crate) fn unbound(index: usize) -> Self {
        Self::new(MachineTag::UNBOUND, index)
    }

    /// Position of the state in registration order.
    pub fn index(self) -> usize {
        self.index
    }

    pub fn machine(self) -> MachineTag {
        self.machine
    }
}

/// Handle to a registered transition, in global registration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TransitionId {
    pub(crate) machine: MachineTag,
    pub(crate) index: usize,
}

impl TransitionId {
    pub(crate) fn new(machine: MachineTag, index: usize) -> Self {
        Self { machine, index }
    }

    #[cfg(test)]
    pub(crate) fn unbound(index: usize) -> Self {
        Self::new(MachineTag::UNBOUND, index)
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn machine(self) -> MachineTag {
        self.machine
    }
}

/// Source or target of a transition.
///
/// `Initial` and `Final` are pseudostates: a context sits on `Initial` until
/// its first transition fires and halts once it reaches `Final`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StateRef {
    Initial,
    Final,
    Named(StateId),
}

impl StateRef {
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Initial)
    }

    pub fn is_final(self) -> bool {
        matches!(self, Self::Final)
    }

    /// True for both pseudostates.
    pub fn is_pseudostate(self) -> bool {
        !matches!(self, Self::Named(_))
    }

    /// Whether this reference can be used with the machine tagged `machine`.
    /// Pseudostates belong to every machine.
    pub fn belongs_to(self, machine: MachineTag) -> bool {
        self.named().is_none_or(|id| id.machine == machine)
    }

    /// Same position, re-issued for the machine tagged `machine`.
    pub(crate) fn rebind(self, machine: MachineTag) -> Self {
        match self {
            Self::Named(id) => Self::Named(StateId::new(machine, id.index)),
            pseudostate => pseudostate,
        }
    }

    /// The registered state behind this reference, if any.
    pub fn named(self) -> Option<StateId> {
        match self {
            Self::Named(id) => Some(id),
            Self::Initial | Self::Final => None,
        }
    }
}

impl From<StateId> for StateRef {
    fn from(id: StateId) -> Self {
        Self::Named(id)
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("initial"),
            Self::Final => f.write_str("final"),
            Self::Named(id) => write!(f, "#{}", id.index),
        }
    }
}

/// A registered state: a name plus optional enter, do and exit actions.
///
/// - `enter` runs when a transition into the state fires
/// - `do` runs on a `step` that finds no transition to fire
/// - `exit` runs when a transition out of the state fires
pub struct State<U> {
    name: String,
    enter: Option<Action<U>>,
    do_action: Option<Action<U>>,
    exit: Option<Action<U>>,
}

impl<U> State<U> {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            enter: None,
            do_action: None,
            exit: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_enter_action(&self) -> bool {
        self.enter.is_some()
    }

    pub fn has_do_action(&self) -> bool {
        self.do_action.is_some()
    }

    pub fn has_exit_action(&self) -> bool {
        self.exit.is_some()
    }

    pub(crate) fn set_enter(&mut self, action: Action<U>) {
        self.enter = Some(action);
    }

    pub(crate) fn set_do(&mut self, action: Action<U>) {
        self.do_action = Some(action);
    }

    pub(crate) fn set_exit(&mut self, action: Action<U>) {
        self.exit = Some(action);
    }

    pub(crate) fn enter(&self, user_data: &mut U) {
        if let Some(action) = &self.enter {
            action.run(user_data);
        }
    }

    pub(crate) fn run_do(&self, user_data: &mut U) {
        if let Some(action) = &self.do_action {
            action.run(user_data);
        }
    }

    pub(crate) fn exit(&self, user_data: &mut U) {
        if let Some(action) = &self.exit {
            action.run(user_data);
        }
    }
}

impl<U> fmt::Debug for State<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("enter", &self.enter.is_some())
            .field("do", &self.do_action.is_some())
            .field("exit", &self.exit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudostates_are_classified() {
        assert!(StateRef::Initial.is_initial());
        assert!(StateRef::Initial.is_pseudostate());
        assert!(StateRef::Final.is_final());
        assert!(StateRef::Final.is_pseudostate());

        let named = StateRef::Named(StateId::unbound(3));
        assert!(!named.is_pseudostate());
        assert_eq!(named.named(), Some(StateId::unbound(3)));
        assert_eq!(StateRef::Final.named(), None);
    }

    #[test]
    fn state_id_converts_into_ref() {
        let id = StateId::unbound(1);
        assert_eq!(StateRef::from(id), StateRef::Named(id));
        assert_eq!(id.index(), 1);
    }

    #[test]
    fn fresh_tags_are_distinct() {
        let first = MachineTag::fresh();
        let second = MachineTag::fresh();
        assert_ne!(first, second);
        assert_ne!(first, MachineTag::UNBOUND);
    }

    #[test]
    fn rebind_keeps_position_and_pseudostates() {
        let tag = MachineTag::fresh();
        let rebound = StateRef::Named(StateId::unbound(4)).rebind(tag);

        assert_eq!(rebound, StateRef::Named(StateId::new(tag, 4)));
        assert!(rebound.belongs_to(tag));
        assert!(!rebound.belongs_to(MachineTag::UNBOUND));
        assert_eq!(StateRef::Final.rebind(tag), StateRef::Final);
        assert!(StateRef::Initial.belongs_to(tag));
    }

    #[test]
    fn actions_run_only_when_set() {
        let mut state: State<Vec<&'static str>> = State::new("A".to_string());
        let mut log = Vec::new();

        state.enter(&mut log);
        state.run_do(&mut log);
        state.exit(&mut log);
        assert!(log.is_empty());

        state.set_enter(Action::new(|log: &mut Vec<&'static str>| log.push("enter")));
        state.set_do(Action::new(|log: &mut Vec<&'static str>| log.push("do")));
        state.set_exit(Action::new(|log: &mut Vec<&'static str>| log.push("exit")));

        state.enter(&mut log);
        state.run_do(&mut log);
        state.exit(&mut log);
        assert_eq!(log, vec!["enter", "do", "exit"]);
    }

    #[test]
    fn state_ref_serializes_correctly() {
        let state = StateRef::Named(StateId::unbound(2));
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: StateRef = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }

    #[test]
    fn debug_output_hides_callables() {
        let state: State<()> = State::new("Idle".to_string());
        let debug = format!("{state:?}");
        assert!(debug.contains("Idle"));
        assert!(debug.contains("enter: false"));
    }
}
