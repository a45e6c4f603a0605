//! Traffic Light
//!
//! A cyclic machine driven purely by guards on a tick counter, stopped by
//! an event.
//!
//! Key concepts:
//! - Guarded transitions evaluated by `step`
//! - Do-actions running while no transition fires
//! - A triggered transition to the final pseudostate
//!
//! Run with: cargo run --example traffic_light

use stepwise::core::StateRef;
use stepwise::engine::Context;
use stepwise::MachineBuilder;

#[derive(Debug, Default)]
struct Light {
    ticks: u32,
    cycles: u32,
}

enum Command {
    PowerOff,
}

fn main() {
    println!("=== Traffic Light ===\n");

    let mut builder = MachineBuilder::<Light, Command>::new();
    let red = builder.state("red");
    let green = builder.state("green");
    let yellow = builder.state("yellow");

    for state in [red, green, yellow] {
        builder.set_enter_action(state, |light: &mut Light| light.ticks = 0);
        builder.set_do_action(state, |light: &mut Light| light.ticks += 1);
    }
    builder.set_exit_action(yellow, |light: &mut Light| light.cycles += 1);

    builder.transition(StateRef::Initial, red);
    for (from, to, duration) in [(red, green, 3), (green, yellow, 2), (yellow, red, 1)] {
        let t = builder.transition(from, to);
        builder.set_guard(t, move |light: &Light| light.ticks >= duration);
    }
    for state in [red, green, yellow] {
        let off = builder.transition(state, StateRef::Final);
        builder.set_trigger(off, |_: &Light, command: &Command| {
            matches!(command, Command::PowerOff)
        });
    }

    let machine = match builder.build() {
        Ok(machine) => machine,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let mut context = Context::with_history(Light::default(), Some(16));
    while context.user_data().cycles < 2 {
        if machine.step(&mut context) {
            println!("  now {}", machine.state_name(context.current_state()));
        }
    }
    machine.notify(&mut context, &Command::PowerOff);

    println!("\nHalted: {}", context.is_halted());
    if let Some(history) = context.history() {
        println!("Last {} transitions recorded", history.len());
    }

    println!("\n=== Example Complete ===");
}
