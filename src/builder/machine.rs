//! Registration API producing a frozen [`Machine`].

use crate::builder::error::{BuildError, TopologyViolation};
use crate::builder::transition::TransitionBuilder;
use crate::core::{Action, Guard, MachineTag, State, StateId, StateRef, TransitionId, Trigger};
use crate::engine::{Machine, Transition};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TopologyViolation>>;

/// Builder that registers states and transitions, then freezes them into a
/// [`Machine`].
///
/// Handles returned by [`state`](Self::state) and
/// [`transition`](Self::transition) are stamped with this builder's
/// [`MachineTag`] and only valid here and on the built machine. Passing a
/// handle from another builder to any method panics at the call.
///
/// # Example
///
/// ```rust
/// use stepwise::builder::MachineBuilder;
/// use stepwise::core::StateRef;
/// use stepwise::engine::Context;
///
/// let mut builder = MachineBuilder::<i32, ()>::new();
/// let a = builder.state("A");
/// builder.set_do_action(a, |value: &mut i32| *value += 1);
/// builder.transition(StateRef::Initial, a);
/// let done = builder.transition(a, StateRef::Final);
/// builder.set_guard(done, |value: &i32| *value > 4);
///
/// let machine = builder.build().unwrap();
/// let mut context = Context::new(0);
/// machine.run(&mut context);
/// assert_eq!(*context.user_data(), 5);
/// ```
pub struct MachineBuilder<U, E = ()> {
    tag: MachineTag,
    states: Vec<State<U>>,
    names: HashSet<String>,
    transitions: Vec<Transition<U, E>>,
}

impl<U, E> MachineBuilder<U, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            tag: MachineTag::fresh(),
            states: Vec::new(),
            names: HashSet::new(),
            transitions: Vec::new(),
        }
    }

    /// Tag carried by every handle this builder issues.
    pub fn tag(&self) -> MachineTag {
        self.tag
    }

    /// Register a state.
    ///
    /// # Panics
    ///
    /// Panics if a state with the same name is already registered.
    #[track_caller]
    pub fn state(&mut self, name: impl Into<String>) -> StateId {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            panic!("attempted redefinition of state: {name}");
        }
        self.states.push(State::new(name));
        StateId::new(self.tag, self.states.len() - 1)
    }

    /// Action run when a transition into `state` fires.
    #[track_caller]
    pub fn set_enter_action<F>(&mut self, state: StateId, action: F)
    where
        F: Fn(&mut U) + Send + Sync + 'static,
    {
        self.state_mut(state).set_enter(Action::new(action));
    }

    /// Action run on a `step` that fires nothing while `state` is current.
    #[track_caller]
    pub fn set_do_action<F>(&mut self, state: StateId, action: F)
    where
        F: Fn(&mut U) + Send + Sync + 'static,
    {
        self.state_mut(state).set_do(Action::new(action));
    }

    /// Action run when a transition out of `state` fires.
    #[track_caller]
    pub fn set_exit_action<F>(&mut self, state: StateId, action: F)
    where
        F: Fn(&mut U) + Send + Sync + 'static,
    {
        self.state_mut(state).set_exit(Action::new(action));
    }

    /// Register a transition. It is appended to the chain of its source, so
    /// registration order is evaluation order.
    #[track_caller]
    pub fn transition(
        &mut self,
        source: impl Into<StateRef>,
        target: impl Into<StateRef>,
    ) -> TransitionId {
        self.push(Transition::new(source.into(), target.into()))
    }

    /// Register a transition assembled with a [`TransitionBuilder`].
    #[track_caller]
    pub fn add_transition(
        &mut self,
        builder: TransitionBuilder<U, E>,
    ) -> Result<TransitionId, BuildError> {
        let transition = builder.build()?;
        Ok(self.push(transition))
    }

    #[track_caller]
    pub fn set_guard<F>(&mut self, transition: TransitionId, guard: F)
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        self.transition_mut(transition).guard = Some(Guard::new(guard));
    }

    #[track_caller]
    pub fn set_trigger<F>(&mut self, transition: TransitionId, trigger: F)
    where
        F: Fn(&U, &E) -> bool + Send + Sync + 'static,
    {
        self.transition_mut(transition).trigger = Some(Trigger::new(trigger));
    }

    #[track_caller]
    pub fn set_effect<F>(&mut self, transition: TransitionId, effect: F)
    where
        F: Fn(&mut U) + Send + Sync + 'static,
    {
        self.transition_mut(transition).effect = Some(Action::new(effect));
    }

    /// Validate the topology and freeze it.
    ///
    /// All violations are collected before reporting, so one failed build
    /// lists every defect.
    pub fn build(self) -> Result<Machine<U, E>, BuildError> {
        if let Validation::Failure(violations) = Validation::all_vec(self.topology_checks()) {
            let violations: Vec<TopologyViolation> = violations.iter().cloned().collect();
            for violation in &violations {
                tracing::warn!(target: "stepwise::build", "{violation}");
            }
            return Err(BuildError::InvalidTopology(violations));
        }

        let mut chains = vec![Vec::new(); self.states.len()];
        let mut initial_chain = Vec::new();
        for (index, transition) in self.transitions.iter().enumerate() {
            let id = TransitionId::new(self.tag, index);
            match transition.source {
                StateRef::Initial => initial_chain.push(id),
                StateRef::Named(state) => {
                    self.assert_owned(transition.source);
                    chains[state.index].push(id);
                }
                // rejected by topology_checks
                StateRef::Final => {}
            }
        }

        tracing::debug!(
            target: "stepwise::build",
            states = self.states.len(),
            transitions = self.transitions.len(),
            "machine topology frozen"
        );

        Ok(Machine {
            tag: self.tag,
            states: self.states,
            transitions: self.transitions,
            chains,
            initial_chain,
        })
    }

    #[track_caller]
    fn push(&mut self, transition: Transition<U, E>) -> TransitionId {
        self.assert_owned(transition.source);
        self.assert_owned(transition.target);
        self.transitions.push(transition);
        TransitionId::new(self.tag, self.transitions.len() - 1)
    }

    #[track_caller]
    fn assert_owned(&self, state: StateRef) {
        let known = state
            .named()
            .is_none_or(|id| id.index < self.states.len());
        assert!(
            state.belongs_to(self.tag) && known,
            "state {state:?} was not registered on this builder"
        );
    }

    #[track_caller]
    fn state_mut(&mut self, id: StateId) -> &mut State<U> {
        self.assert_owned(id.into());
        match self.states.get_mut(id.index) {
            Some(state) => state,
            None => panic!("state {id:?} was not registered on this builder"),
        }
    }

    #[track_caller]
    fn transition_mut(&mut self, id: TransitionId) -> &mut Transition<U, E> {
        assert!(
            id.machine == self.tag,
            "transition {id:?} was not registered on this builder"
        );
        match self.transitions.get_mut(id.index) {
            Some(transition) => transition,
            None => panic!("transition {id:?} was not registered on this builder"),
        }
    }

    fn topology_checks(&self) -> Vec<Check> {
        let mut checks = Vec::new();

        let has_initial = self
            .transitions
            .iter()
            .any(|transition| transition.source.is_initial());
        checks.push(if has_initial {
            Validation::success(())
        } else {
            Validation::fail(TopologyViolation::MissingInitialTransition)
        });

        for (index, transition) in self.transitions.iter().enumerate() {
            let id = TransitionId::new(self.tag, index);
            if transition.source.is_final() {
                checks.push(Validation::fail(TopologyViolation::FinalAsSource {
                    transition: id,
                }));
            }
            if transition.target.is_initial() {
                checks.push(Validation::fail(TopologyViolation::InitialAsTarget {
                    transition: id,
                }));
            }
        }

        checks
    }
}

impl<U, E> Default for MachineBuilder<U, E> {
    fn default() -> Self {
        Self::new()
    }
}
