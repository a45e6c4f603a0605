//! Frozen machine topology and the evaluation algorithms.

use super::context::{Context, ContextAccess};
use super::transition::Transition;
use crate::core::{FiredTransition, MachineTag, State, StateId, StateRef, TransitionId};
use chrono::Utc;

/// Immutable machine topology produced by
/// [`MachineBuilder::build`](crate::builder::MachineBuilder::build).
///
/// A machine holds no per-run data, so any number of contexts can be driven
/// by the same machine, from any number of threads.
///
/// `U` is the context payload type handed to every callable and `E` the event
/// type accepted by [`notify`](Self::notify).
pub struct Machine<U, E = ()> {
    pub(crate) tag: MachineTag,
    pub(crate) states: Vec<State<U>>,
    pub(crate) transitions: Vec<Transition<U, E>>,
    // Outgoing transitions per state, in registration order.
    pub(crate) chains: Vec<Vec<TransitionId>>,
    pub(crate) initial_chain: Vec<TransitionId>,
}

impl<U, E> Machine<U, E> {
    /// Tag of the builder this machine was built from.
    pub fn tag(&self) -> MachineTag {
        self.tag
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Registered state behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different builder.
    #[track_caller]
    pub fn state(&self, id: StateId) -> &State<U> {
        self.assert_owned(id.machine, "state", &id);
        match self.states.get(id.index) {
            Some(state) => state,
            None => panic!("state {id:?} does not belong to this machine"),
        }
    }

    /// Registered transition behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different builder.
    #[track_caller]
    pub fn transition(&self, id: TransitionId) -> &Transition<U, E> {
        self.assert_owned(id.machine, "transition", &id);
        match self.transitions.get(id.index) {
            Some(transition) => transition,
            None => panic!("transition {id:?} does not belong to this machine"),
        }
    }

    /// Look a state up by the name it was registered with.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|state| state.name() == name)
            .map(|index| StateId::new(self.tag, index))
    }

    /// Display name of a state; pseudostates are `"initial"` and `"final"`.
    pub fn state_name(&self, state: StateRef) -> &str {
        match state {
            StateRef::Initial => "initial",
            StateRef::Final => "final",
            StateRef::Named(id) => self.state(id).name(),
        }
    }

    /// `"<source> -> <target>"`, as written by the trace output.
    pub fn transition_label(&self, id: TransitionId) -> String {
        let transition = self.transition(id);
        format!(
            "{} -> {}",
            self.state_name(transition.source),
            self.state_name(transition.target)
        )
    }

    /// Transitions evaluated while a context sits on `state`, in evaluation
    /// order. Empty for the final pseudostate.
    #[track_caller]
    pub fn outgoing(&self, state: StateRef) -> &[TransitionId] {
        match state {
            StateRef::Initial => &self.initial_chain,
            StateRef::Final => &[],
            StateRef::Named(id) => match self.chains.get(id.index) {
                Some(chain) if id.machine == self.tag => chain,
                _ => panic!("state {id:?} does not belong to this machine"),
            },
        }
    }

    /// Evaluate the current state's transitions without an event.
    ///
    /// Returns `true` iff a transition fired. The first guarded transition
    /// without trigger whose guard passes wins; failing that, the first
    /// transition with neither guard nor trigger. When nothing fires the
    /// current state's do-action runs instead.
    ///
    /// A halted context, or one whose lock could not be acquired, is left
    /// untouched and yields `false`.
    pub fn step<C: ContextAccess<U>>(&self, mut context: C) -> bool {
        self.step_with(&mut context)
    }

    /// Deliver `event` to the current state's triggered transitions.
    ///
    /// Returns `true` iff a transition fired: the first one whose trigger
    /// accepts the event and whose guard, if any, passes. Events that match
    /// nothing, or that arrive while the lock is unavailable, are dropped.
    pub fn notify<C: ContextAccess<U>>(&self, mut context: C, event: &E) -> bool {
        if context.is_halted() {
            return false;
        }
        context
            .access(|ctx| self.notify_exclusive(ctx, event))
            .unwrap_or(false)
    }

    /// Call [`step`](Self::step) until the context halts.
    ///
    /// Never delivers events. Spins forever if the machine cannot reach the
    /// final pseudostate through guards and unconditional transitions alone.
    pub fn run<C: ContextAccess<U>>(&self, mut context: C) {
        while !context.is_halted() {
            self.step_with(&mut context);
        }
    }

    fn step_with<C: ContextAccess<U>>(&self, context: &mut C) -> bool {
        if context.is_halted() {
            return false;
        }
        context
            .access(|ctx| self.step_exclusive(ctx))
            .unwrap_or(false)
    }

    fn step_exclusive(&self, ctx: &mut Context<U>) -> bool {
        // Another thread may have halted the context while we waited.
        if ctx.halted {
            return false;
        }
        let chain = self.outgoing(ctx.current);
        let selected = chain
            .iter()
            .copied()
            .find(|&id| {
                self.checked(id, ctx.current)
                    .passes_guarded_default(&ctx.user_data)
            })
            .or_else(|| {
                chain
                    .iter()
                    .copied()
                    .find(|&id| self.checked(id, ctx.current).is_unconditional())
            });

        match selected {
            Some(id) => {
                self.fire(id, ctx);
                true
            }
            None => {
                if let StateRef::Named(id) = ctx.current {
                    self.state(id).run_do(&mut ctx.user_data);
                }
                false
            }
        }
    }

    fn notify_exclusive(&self, ctx: &mut Context<U>, event: &E) -> bool {
        if ctx.halted {
            return false;
        }
        let selected = self.outgoing(ctx.current).iter().copied().find(|&id| {
            self.checked(id, ctx.current)
                .accepts_event(&ctx.user_data, event)
        });

        match selected {
            Some(id) => {
                self.fire(id, ctx);
                true
            }
            None => false,
        }
    }

    #[track_caller]
    fn checked(&self, id: TransitionId, current: StateRef) -> &Transition<U, E> {
        let transition = self.transition(id);
        assert_eq!(
            transition.source, current,
            "transition {id:?} evaluated against a context in a different state"
        );
        transition
    }

    /// Commit `id`: exit source, effect, enter target, then move the context.
    fn fire(&self, id: TransitionId, ctx: &mut Context<U>) {
        let transition = self.transition(id);
        let from = ctx.current;
        let to = transition.target;

        tracing::trace!(
            target: "stepwise::fire",
            transition = id.index,
            "{} -> {}",
            self.state_name(from),
            self.state_name(to)
        );

        if let StateRef::Named(state) = from {
            self.state(state).exit(&mut ctx.user_data);
        }
        transition.apply_effect(&mut ctx.user_data);
        if let StateRef::Named(state) = to {
            self.state(state).enter(&mut ctx.user_data);
        }

        ctx.current = to;
        if to.is_final() {
            ctx.halted = true;
            tracing::debug!(target: "stepwise::fire", "context halted");
        }
        if let Some(history) = &mut ctx.history {
            history.record(FiredTransition {
                transition: id,
                from,
                to,
                timestamp: Utc::now(),
            });
        }
    }
}

impl<U, E> Machine<U, E> {
    #[track_caller]
    fn assert_owned(&self, machine: MachineTag, kind: &str, id: &dyn std::fmt::Debug) {
        assert!(
            machine == self.tag,
            "{kind} {id:?} does not belong to this machine"
        );
    }
}

impl<U, E> std::fmt::Debug for Machine<U, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("tag", &self.tag)
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .finish()
    }
}
