//! Checkpoint and Resume
//!
//! A context is stopped halfway, saved to JSON and bincode, and resumed on
//! a freshly built machine with the same topology.
//!
//! Run with: cargo run --example checkpoint_resume

use stepwise::checkpoint::Checkpoint;
use stepwise::core::StateRef;
use stepwise::engine::Context;
use stepwise::{Machine, MachineBuilder};

#[derive(Debug, Default, Clone)]
struct Batch {
    processed: usize,
    total: usize,
}

fn workflow() -> Machine<Batch> {
    let mut builder = MachineBuilder::<Batch>::new();
    let mapping = builder.state("mapping");
    builder.set_do_action(mapping, |batch: &mut Batch| batch.processed += 1);
    let reducing = builder.state("reducing");

    builder.transition(StateRef::Initial, mapping);
    let done = builder.transition(mapping, reducing);
    builder.set_guard(done, |batch: &Batch| batch.processed == batch.total);
    builder.transition(reducing, StateRef::Final);

    builder.build().expect("workflow topology is valid")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Checkpoint and Resume ===\n");

    let machine = workflow();
    let mut context = Context::with_history(
        Batch {
            processed: 0,
            total: 10,
        },
        None,
    );
    machine.step(&mut context);
    for _ in 0..4 {
        machine.step(&mut context);
    }
    println!(
        "Interrupted in {:?} after {} items",
        machine.state_name(context.current_state()),
        context.user_data().processed
    );

    let checkpoint = Checkpoint::capture(&machine, &context);
    let json = checkpoint.to_json()?;
    let bytes = checkpoint.to_bytes()?;
    println!("JSON checkpoint: {} bytes", json.len());
    println!("Binary checkpoint: {} bytes\n", bytes.len());

    // The payload is owned by the caller and saved separately
    let saved = context.into_user_data();

    let machine = workflow();
    let mut resumed = Checkpoint::from_bytes(&bytes)?.restore(&machine, saved)?;
    machine.run(&mut resumed);

    println!("Resumed and finished: halted = {}", resumed.is_halted());
    if let Some(history) = resumed.history() {
        let path: Vec<_> = history
            .get_path()
            .into_iter()
            .map(|state| machine.state_name(state).to_string())
            .collect();
        println!("Path: {}", path.join(" -> "));
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
