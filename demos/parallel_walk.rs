//! Parallel Branches
//!
//! This example runs a walking branch and a looking branch side by side.
//! The pair completes when the walk does; the lookout never finishes on
//! its own and is exited together with it.
//!
//! Key concepts:
//! - Parallel nodes built from two nested sequences
//! - Completion driven by the main branch only
//! - One-shot links removed after firing
//!
//! Run with: cargo run --example parallel_walk

use behavior_graph::builder::{chain, LinkBuilder, SequenceBuilder};
use behavior_graph::core::{Capabilities, Frame, ManualClock, Probe, State, Status};
use behavior_graph::graph::{Delay, Forced, Parallel, Sequence, TransitionInfo};
use behavior_graph::machine::Machine;
use std::time::Duration;

/// Counts frames spent scanning.
struct Lookout;

impl State<u32> for Lookout {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::ENDABLE
    }

    fn enter(&mut self, _cx: &mut Frame<'_, u32>, _via: Option<&TransitionInfo>) {
        println!("  lookout on duty");
    }

    fn exit(&mut self, _cx: &mut Frame<'_, u32>) {
        println!("  lookout stood down");
    }

    fn update(&mut self, cx: &mut Frame<'_, u32>) {
        *cx.host_mut() += 1;
    }

    fn end_condition(&self, _probe: &Probe<'_, u32>) -> Status {
        Status::Running
    }
}

fn main() {
    println!("=== Parallel Branches ===\n");

    let walk: Sequence<u32> = chain(
        "Walk",
        vec![
            Delay::new(Duration::from_millis(300)),
            Delay::new(Duration::from_millis(300)),
        ],
    )
    .unwrap();
    let mut look: Sequence<u32> = Sequence::new("Look");
    look.add_state(Lookout);

    let root: Sequence<u32> = SequenceBuilder::new("Root")
        .state(Parallel::new(walk, look).named("WalkAndLook"))
        .named("Arrived", Forced)
        .named("Rest", Forced)
        .link(LinkBuilder::new().from("WalkAndLook").to("Arrived"))
        .link(LinkBuilder::new().from("Arrived").to("Rest").once())
        .build()
        .unwrap();

    let clock = ManualClock::new();
    let mut machine = Machine::new(root, 0u32).with_clock(clock.clone());
    machine.init().unwrap();
    machine.start();

    for frame in 1..=10 {
        clock.advance(Duration::from_millis(100));
        machine.run_frame();
        println!(
            "frame {:>2} at {:?}: running {}",
            frame,
            machine.now(),
            machine.snapshot().running_path().join(" / ")
        );
    }

    println!("\nLookout scanned for {} frames", machine.host());
    println!("Links left in root: {}", machine.root().links().len());

    machine.stop();
    println!("\n=== Example Complete ===");
}
