//! End-to-end scenarios driving complete machines.

use stepwise::core::StateRef;
use stepwise::engine::Context;
use stepwise::MachineBuilder;

#[test]
fn counter_machine_walks_through_both_states() {
    let mut builder = MachineBuilder::<i32, ()>::new();
    let a = builder.state("A");
    builder.set_do_action(a, |value: &mut i32| *value += 1);
    let b = builder.state("B");
    builder.set_do_action(b, |value: &mut i32| *value += 2);

    builder.transition(StateRef::Initial, a);
    let a_to_b = builder.transition(a, b);
    builder.set_guard(a_to_b, |value: &i32| *value > 4);
    let b_to_final = builder.transition(b, StateRef::Final);
    builder.set_guard(b_to_final, |value: &i32| *value > 10);
    let machine = builder.build().unwrap();

    let mut context = Context::new(0);
    assert!(machine.step(&mut context));
    assert_eq!(context.current_state(), StateRef::Named(a));

    let mut values = Vec::new();
    while context.current_state() == StateRef::Named(a) {
        if !machine.step(&mut context) {
            values.push(*context.user_data());
        }
    }
    assert_eq!(values, vec![1, 2, 3, 4, 5]);
    assert_eq!(context.current_state(), StateRef::Named(b));

    values.clear();
    while !context.is_halted() {
        if !machine.step(&mut context) {
            values.push(*context.user_data());
        }
    }
    assert_eq!(values, vec![7, 9, 11]);
    assert_eq!(context.current_state(), StateRef::Final);
    assert_eq!(*context.user_data(), 11);
}

#[test]
fn run_reaches_same_result_as_manual_stepping() {
    let mut builder = MachineBuilder::<i32, ()>::new();
    let a = builder.state("A");
    builder.set_do_action(a, |value: &mut i32| *value += 1);
    let b = builder.state("B");
    builder.set_do_action(b, |value: &mut i32| *value += 2);
    builder.transition(StateRef::Initial, a);
    let a_to_b = builder.transition(a, b);
    builder.set_guard(a_to_b, |value: &i32| *value > 4);
    let b_to_final = builder.transition(b, StateRef::Final);
    builder.set_guard(b_to_final, |value: &i32| *value > 10);
    let machine = builder.build().unwrap();

    let mut context = Context::with_history(0, None);
    machine.run(&mut context);

    assert_eq!(*context.user_data(), 11);
    let path = context.history().unwrap().get_path();
    assert_eq!(
        path,
        vec![
            StateRef::Initial,
            StateRef::Named(a),
            StateRef::Named(b),
            StateRef::Final
        ]
    );
}

#[derive(Default, Debug)]
struct Counter {
    event_1: u32,
    event_2: u32,
    finals: u32,
}

fn counter_machine() -> stepwise::Machine<Counter, i32> {
    let mut builder = MachineBuilder::<Counter, i32>::new();
    let wait = builder.state("wait");

    builder.transition(StateRef::Initial, wait);

    let on_1 = builder.transition(wait, wait);
    builder.set_trigger(on_1, |_: &Counter, event: &i32| *event == 1);
    builder.set_effect(on_1, |c: &mut Counter| c.event_1 += 1);

    let on_2 = builder.transition(wait, wait);
    builder.set_trigger(on_2, |_: &Counter, event: &i32| *event == 2);
    builder.set_effect(on_2, |c: &mut Counter| c.event_2 += 1);

    let done = builder.transition(wait, StateRef::Final);
    builder.set_guard(done, |c: &Counter| c.event_1 > 5 || c.event_2 > 5);
    builder.set_effect(done, |c: &mut Counter| c.finals += 1);

    builder.build().unwrap()
}

#[test]
fn events_only_touch_matching_counter() {
    let machine = counter_machine();
    let mut context = Context::new(Counter::default());
    assert!(machine.step(&mut context));

    assert!(machine.notify(&mut context, &1));
    assert_eq!((context.user_data().event_1, context.user_data().event_2), (1, 0));
    assert!(machine.notify(&mut context, &2));
    assert_eq!((context.user_data().event_1, context.user_data().event_2), (1, 1));
    assert!(!machine.notify(&mut context, &3));
    assert_eq!((context.user_data().event_1, context.user_data().event_2), (1, 1));
}

#[test]
fn interleaved_steps_fire_final_exactly_once() {
    let machine = counter_machine();
    let mut context = Context::new(Counter::default());
    assert!(machine.step(&mut context));

    let mut rounds = 0;
    while !context.is_halted() {
        rounds += 1;
        machine.notify(&mut context, &1);
        // self-loops are trigger-only, so stepping never bumps a counter
        let before = (context.user_data().event_1, context.user_data().event_2);
        let fired = machine.step(&mut context);
        let after = (context.user_data().event_1, context.user_data().event_2);
        assert_eq!(before, after);
        assert_eq!(fired, context.is_halted());

        machine.notify(&mut context, &2);
        if !context.is_halted() {
            machine.step(&mut context);
        }
        assert!(rounds < 100, "machine never halted");
    }

    let counter = context.into_user_data();
    assert_eq!(counter.finals, 1);
    assert_eq!(counter.event_1, 6);
    assert_eq!(counter.event_2, 5);
}

#[test]
fn events_after_halt_are_dropped() {
    let machine = counter_machine();
    let mut context = Context::new(Counter::default());
    machine.step(&mut context);
    for _ in 0..6 {
        machine.notify(&mut context, &2);
    }
    assert!(machine.step(&mut context));
    assert!(context.is_halted());

    assert!(!machine.notify(&mut context, &1));
    assert!(!machine.step(&mut context));
    assert_eq!(context.user_data().event_1, 0);
    assert_eq!(context.user_data().finals, 1);
}

#[test]
fn many_contexts_share_one_machine() {
    let machine = counter_machine();
    let mut left = Context::new(Counter::default());
    let mut right = Context::new(Counter::default());
    machine.step(&mut left);
    machine.step(&mut right);

    for _ in 0..6 {
        machine.notify(&mut left, &1);
    }
    machine.notify(&mut right, &2);
    machine.step(&mut left);
    machine.step(&mut right);

    assert!(left.is_halted());
    assert!(!right.is_halted());
    assert_eq!(right.user_data().event_2, 1);
}

#[test]
fn reset_restarts_from_initial_pseudostate() {
    let machine = counter_machine();
    let mut context = Context::new(Counter::default());
    machine.step(&mut context);
    for _ in 0..6 {
        machine.notify(&mut context, &1);
    }
    machine.step(&mut context);
    assert!(context.is_halted());

    context.reset();
    assert_eq!(context.current_state(), StateRef::Initial);
    assert!(!context.is_halted());

    // counters were kept, so the guard passes again right after entering
    assert!(machine.step(&mut context));
    assert!(machine.step(&mut context));
    assert!(context.is_halted());
    assert_eq!(context.user_data().finals, 2);
}

#[test]
fn borrowed_payload_stays_with_the_caller() {
    let mut counter = 0_u32;
    {
        let mut builder = MachineBuilder::<&mut u32, ()>::new();
        let bump = builder.transition(StateRef::Initial, StateRef::Final);
        builder.set_effect(bump, |n: &mut &mut u32| **n += 1);
        let machine = builder.build().unwrap();

        let mut context = Context::new(&mut counter);
        machine.run(&mut context);
        assert!(context.is_halted());
    }

    assert_eq!(counter, 1);
}

#[test]
fn contexts_can_share_a_borrowed_payload() {
    use std::cell::Cell;

    let visits = Cell::new(0_u32);
    let mut builder = MachineBuilder::<&Cell<u32>, ()>::new();
    let visited = builder.state("visited");
    builder.set_enter_action(visited, |v: &mut &Cell<u32>| v.set(v.get() + 1));
    builder.transition(StateRef::Initial, visited);
    let machine = builder.build().unwrap();

    let mut first = Context::new(&visits);
    let mut second = Context::new(&visits);
    machine.step(&mut first);
    machine.step(&mut second);

    assert_eq!(visits.get(), 2);
}
