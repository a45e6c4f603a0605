//! Callables attached to states and transitions.
//!
//! Guards and triggers are predicates; actions mutate the context payload.
//! All of them are `Send + Sync` so a finished machine can be shared between
//! threads that each drive their own context.

use std::fmt;

/// Predicate that gates a transition evaluated by `step`.
///
/// # Example
///
/// ```rust
/// use stepwise::core::Guard;
///
/// let above_four = Guard::new(|value: &i32| *value > 4);
///
/// assert!(!above_four.check(&4));
/// assert!(above_four.check(&5));
/// ```
pub struct Guard<U> {
    predicate: Box<dyn Fn(&U) -> bool + Send + Sync>,
}

impl<U> Guard<U> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    pub fn check(&self, user_data: &U) -> bool {
        (self.predicate)(user_data)
    }
}

/// Predicate over the payload and an event; gates a transition evaluated by
/// `notify`.
///
/// ```rust
/// use stepwise::core::Trigger;
///
/// let on_one = Trigger::new(|_: &(), event: &i32| *event == 1);
///
/// assert!(on_one.check(&(), &1));
/// assert!(!on_one.check(&(), &2));
/// ```
pub struct Trigger<U, E> {
    predicate: Box<dyn Fn(&U, &E) -> bool + Send + Sync>,
}

impl<U, E> Trigger<U, E> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&U, &E) -> bool + Send + Sync + 'static,
    {
        Trigger {
            predicate: Box::new(predicate),
        }
    }

    pub fn check(&self, user_data: &U, event: &E) -> bool {
        (self.predicate)(user_data, event)
    }
}

/// Enter, do, exit or effect action.
pub struct Action<U> {
    action: Box<dyn Fn(&mut U) + Send + Sync>,
}

impl<U> Action<U> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&mut U) + Send + Sync + 'static,
    {
        Action {
            action: Box::new(action),
        }
    }

    pub fn run(&self, user_data: &mut U) {
        (self.action)(user_data)
    }
}

impl<U> fmt::Debug for Guard<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

impl<U, E> fmt::Debug for Trigger<U, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Trigger(..)")
    }
}

impl<U> fmt::Debug for Action<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}
