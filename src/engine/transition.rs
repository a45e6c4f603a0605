//! Registered transitions and their selection predicates.

use crate::core::{Action, Guard, StateRef, Trigger};
use std::fmt;

/// A transition from `source` to `target` with optional guard, trigger and
/// effect.
///
/// Which evaluation may fire a transition depends only on which callables are
/// present:
///
/// | guard | trigger | fired by                               |
/// |-------|---------|----------------------------------------|
/// | no    | no      | `step`, after every guarded default    |
/// | yes   | no      | `step`, when the guard passes          |
/// | any   | yes     | `notify`, when trigger (and guard) pass |
pub struct Transition<U, E> {
    pub(crate) source: StateRef,
    pub(crate) target: StateRef,
    pub(crate) guard: Option<Guard<U>>,
    pub(crate) trigger: Option<Trigger<U, E>>,
    pub(crate) effect: Option<Action<U>>,
}

impl<U, E> Transition<U, E> {
    pub(crate) fn new(source: StateRef, target: StateRef) -> Self {
        Self {
            source,
            target,
            guard: None,
            trigger: None,
            effect: None,
        }
    }

    pub fn source(&self) -> StateRef {
        self.source
    }

    pub fn target(&self) -> StateRef {
        self.target
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    /// Neither guard nor trigger: the `step` fallback.
    pub fn is_unconditional(&self) -> bool {
        self.guard.is_none() && self.trigger.is_none()
    }

    /// A guarded default wins over unconditional fallbacks during `step`.
    pub(crate) fn passes_guarded_default(&self, user_data: &U) -> bool {
        match (&self.trigger, &self.guard) {
            (None, Some(guard)) => guard.check(user_data),
            _ => false,
        }
    }

    /// Trigger must be present and accept the event; a present guard must
    /// pass as well.
    pub(crate) fn accepts_event(&self, user_data: &U, event: &E) -> bool {
        let Some(trigger) = &self.trigger else {
            return false;
        };
        self.guard.as_ref().is_none_or(|g| g.check(user_data)) && trigger.check(user_data, event)
    }

    pub(crate) fn apply_effect(&self, user_data: &mut U) {
        if let Some(effect) = &self.effect {
            effect.run(user_data);
        }
    }
}

impl<U, E> fmt::Debug for Transition<U, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("guard", &self.guard.is_some())
            .field("trigger", &self.trigger.is_some())
            .field("effect", &self.effect.is_some())
            .finish()
    }
}
