//! Running instances of a machine.

use super::lock::{LockStrategy, LockedContext};
use crate::core::{StateRef, TransitionHistory};

/// One running instance of a machine.
///
/// A context owns its current state, its halted flag and the payload handed
/// to every callable. Many contexts can be driven by the same
/// [`Machine`](super::Machine).
///
/// # Example
///
/// ```rust
/// use stepwise::core::StateRef;
/// use stepwise::engine::Context;
///
/// let context = Context::new(0_u32);
/// assert_eq!(context.current_state(), StateRef::Initial);
/// assert!(!context.is_halted());
/// assert!(!context.is_started());
/// ```
#[derive(Debug)]
pub struct Context<U> {
    pub(crate) user_data: U,
    pub(crate) current: StateRef,
    pub(crate) halted: bool,
    pub(crate) history: Option<TransitionHistory>,
}

impl<U> Context<U> {
    /// Create a context sitting on the initial pseudostate.
    pub fn new(user_data: U) -> Self {
        Self {
            user_data,
            current: StateRef::Initial,
            halted: false,
            history: None,
        }
    }

    /// Create a context that records every fired transition.
    ///
    /// With `Some(capacity)` only the most recent `capacity` records are kept.
    pub fn with_history(user_data: U, capacity: Option<usize>) -> Self {
        let history = match capacity {
            Some(capacity) => TransitionHistory::bounded(capacity),
            None => TransitionHistory::new(),
        };
        Self {
            history: Some(history),
            ..Self::new(user_data)
        }
    }

    pub(crate) fn restored(
        user_data: U,
        current: StateRef,
        halted: bool,
        history: Option<TransitionHistory>,
    ) -> Self {
        Self {
            user_data,
            current,
            halted,
            history,
        }
    }

    pub fn current_state(&self) -> StateRef {
        self.current
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// False until the first transition has fired.
    pub fn is_started(&self) -> bool {
        !self.current.is_initial()
    }

    pub fn user_data(&self) -> &U {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut U {
        &mut self.user_data
    }

    pub fn into_user_data(self) -> U {
        self.user_data
    }

    pub fn history(&self) -> Option<&TransitionHistory> {
        self.history.as_ref()
    }

    /// Go back to the initial pseudostate and clear the halted flag.
    ///
    /// The payload is kept as is; a recorded history is cleared.
    pub fn reset(&mut self) {
        self.current = StateRef::Initial;
        self.halted = false;
        if let Some(history) = &mut self.history {
            history.clear();
        }
    }

    /// Put the context behind a mutex acquired with `strategy`, so several
    /// threads can `step` and `notify` it.
    pub fn bind<L: LockStrategy>(self, strategy: L) -> LockedContext<U, L> {
        LockedContext::new(self, strategy)
    }
}

/// Exclusive access to a context, as needed by one `step` or `notify`.
///
/// Implemented for `&mut Context<U>`, where access always succeeds, and for
/// `&LockedContext<U, L>`, where access fails when the lock strategy cannot
/// acquire the lock.
pub trait ContextAccess<U> {
    /// Halted check done before any lock is taken.
    fn is_halted(&self) -> bool;

    /// Run `f` with exclusive access; `None` means access was not granted.
    fn access<R>(&mut self, f: impl FnOnce(&mut Context<U>) -> R) -> Option<R>;
}

impl<U> ContextAccess<U> for &mut Context<U> {
    fn is_halted(&self) -> bool {
        self.halted
    }

    fn access<R>(&mut self, f: impl FnOnce(&mut Context<U>) -> R) -> Option<R> {
        Some(f(&mut **self))
    }
}
