//! Fluent builder for a single transition.

use crate::builder::error::BuildError;
use crate::core::{Action, Guard, StateRef, Trigger};
use crate::engine::Transition;

/// Describes one transition before it is registered on a machine.
///
/// Hand the finished builder to
/// [`MachineBuilder::add_transition`](crate::builder::MachineBuilder::add_transition).
///
/// ```rust
/// use stepwise::builder::{MachineBuilder, TransitionBuilder};
/// use stepwise::core::StateRef;
///
/// let mut builder = MachineBuilder::<u32, ()>::new();
/// let counting = builder.state("counting");
/// builder
///     .add_transition(TransitionBuilder::new().from(StateRef::Initial).to(counting))
///     .unwrap();
/// builder
///     .add_transition(
///         TransitionBuilder::new()
///             .from(counting)
///             .to(StateRef::Final)
///             .when(|n: &u32| *n > 2)
///             .effect(|n: &mut u32| *n = 0),
///     )
///     .unwrap();
/// let machine = builder.build().unwrap();
/// assert_eq!(machine.transition_count(), 2);
/// ```
pub struct TransitionBuilder<U, E = ()> {
    from: Option<StateRef>,
    to: Option<StateRef>,
    guard: Option<Guard<U>>,
    trigger: Option<Trigger<U, E>>,
    effect: Option<Action<U>>,
}

impl<U, E> TransitionBuilder<U, E> {
    /// Empty description; source and target must be set before `build`.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            guard: None,
            trigger: None,
            effect: None,
        }
    }

    /// State the transition leaves.
    pub fn from(mut self, state: impl Into<StateRef>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// State the transition enters.
    pub fn to(mut self, state: impl Into<StateRef>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Attach a prebuilt guard.
    pub fn guard(mut self, guard: Guard<U>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Guard the transition on the payload.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add a trigger predicate (optional). Triggered transitions only fire
    /// through `notify`.
    pub fn trigger(mut self, trigger: Trigger<U, E>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Add a trigger using a closure (optional).
    pub fn on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&U, &E) -> bool + Send + Sync + 'static,
    {
        self.trigger = Some(Trigger::new(predicate));
        self
    }

    /// Set the effect run mid-fire (optional).
    pub fn effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut U) + Send + Sync + 'static,
    {
        self.effect = Some(Action::new(effect));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<U, E>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingSource)?;
        let to = self.to.ok_or(BuildError::MissingTarget)?;

        let mut transition = Transition::new(from, to);
        transition.guard = self.guard;
        transition.trigger = self.trigger;
        transition.effect = self.effect;
        Ok(transition)
    }
}

impl<U, E> Default for TransitionBuilder<U, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateId;

    #[test]
    fn builder_validates_missing_source() {
        let result = TransitionBuilder::<(), ()>::new().to(StateRef::Final).build();

        assert!(matches!(result, Err(BuildError::MissingSource)));
    }

    #[test]
    fn builder_validates_missing_target() {
        let result = TransitionBuilder::<(), ()>::new()
            .from(StateRef::Initial)
            .build();

        assert!(matches!(result, Err(BuildError::MissingTarget)));
    }

    #[test]
    fn fluent_api_builds_transition() {
        let a = StateId::unbound(0);
        let transition = TransitionBuilder::<bool, u8>::new()
            .from(StateRef::Initial)
            .to(a)
            .when(|flag: &bool| *flag)
            .on(|_: &bool, event: &u8| *event == 1)
            .effect(|flag: &mut bool| *flag = false)
            .build()
            .unwrap();

        assert_eq!(transition.source(), StateRef::Initial);
        assert_eq!(transition.target(), StateRef::Named(a));
        assert!(transition.has_guard());
        assert!(transition.has_trigger());
        assert!(transition.has_effect());
    }

    #[test]
    fn prebuilt_callables_are_accepted() {
        let transition = TransitionBuilder::<u8, u8>::new()
            .from(StateRef::Initial)
            .to(StateRef::Final)
            .guard(Guard::new(|n: &u8| *n > 0))
            .trigger(Trigger::new(|_: &u8, e: &u8| *e > 0))
            .build()
            .unwrap();

        assert!(!transition.is_unconditional());
    }

    #[test]
    fn bare_transition_is_unconditional() {
        let transition = TransitionBuilder::<(), ()>::new()
            .from(StateRef::Initial)
            .to(StateRef::Final)
            .build()
            .unwrap();

        assert!(transition.is_unconditional());
    }
}
