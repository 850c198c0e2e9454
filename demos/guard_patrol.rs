//! Guard Patrol Behavior
//!
//! This example drives a guard through Idle, Patrol and Chase with a
//! manual clock, then prints the snapshot an inspector would render.
//!
//! Key concepts:
//! - Local links conditioned on the host context
//! - End links taken when an endable state completes
//! - Global links that interrupt from any state
//! - Snapshots of the running chain and link bookkeeping
//!
//! Run with: cargo run --example guard_patrol

use behavior_graph::builder::{LinkBuilder, MachineBuilder, SequenceBuilder};
use behavior_graph::core::{Capabilities, Frame, Guard, ManualClock, Probe, State, Status};
use behavior_graph::graph::TransitionInfo;
use std::time::Duration;

const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

#[derive(Default)]
struct Senses {
    sees_target: bool,
    alarm: bool,
}

struct Idle;

impl State<Senses> for Idle {}

struct Patrol;

impl State<Senses> for Patrol {}

struct Alarm;

impl State<Senses> for Alarm {}

#[derive(Default)]
struct Chase {
    lost_since: Option<Duration>,
}

impl State<Senses> for Chase {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::ENDABLE
    }

    fn enter(&mut self, _cx: &mut Frame<'_, Senses>, _via: Option<&TransitionInfo>) {
        self.lost_since = None;
    }

    fn update(&mut self, cx: &mut Frame<'_, Senses>) {
        if cx.host().sees_target {
            self.lost_since = None;
        } else if self.lost_since.is_none() {
            self.lost_since = Some(cx.now());
        }
    }

    fn end_condition(&self, probe: &Probe<'_, Senses>) -> Status {
        match self.lost_since {
            Some(at) if probe.now().saturating_sub(at) >= GIVE_UP_AFTER => Status::Succeeded,
            Some(_) => Status::Running,
            None => Status::Failure,
        }
    }
}

fn main() {
    println!("=== Guard Patrol Behavior ===\n");

    let root = SequenceBuilder::new("Guard")
        .state(Idle)
        .state(Patrol)
        .state(Chase::default())
        .state(Alarm)
        .link(LinkBuilder::new().to("Alarm").when_fn("alarm", |p: &Probe<'_, Senses>| p.host().alarm))
        .link(LinkBuilder::new().from("Idle").to("Patrol").when(Guard::always()))
        .link(
            LinkBuilder::new()
                .from("Patrol")
                .to("Chase")
                .when_fn("sees_target", |p: &Probe<'_, Senses>| p.host().sees_target),
        )
        .link(LinkBuilder::new().from("Chase").to("Idle"))
        .build()
        .unwrap();

    let clock = ManualClock::new();
    let mut machine = MachineBuilder::new()
        .host(Senses::default())
        .root(root)
        .clock(clock.clone())
        .build()
        .unwrap();
    machine.init().unwrap();
    machine.start();

    let script: [(&str, fn(&mut Senses), Duration); 6] = [
        ("quiet", |_| {}, Duration::from_millis(16)),
        ("target spotted", |s| s.sees_target = true, Duration::from_millis(16)),
        ("target lost", |s| s.sees_target = false, Duration::from_millis(16)),
        ("still searching", |_| {}, Duration::from_secs(1)),
        ("search over", |_| {}, Duration::from_secs(1)),
        ("alarm raised", |s| s.alarm = true, Duration::from_millis(16)),
    ];

    for (label, apply, delta) in script {
        apply(machine.host_mut());
        clock.advance(delta);
        let outcome = machine.run_frame();
        let fired = outcome.and_then(|o| o.fired).map(|t| t.kind.to_string());
        println!(
            "{:>16} | running: {:<7} | fired: {}",
            label,
            machine.root().running_node().map_or("-", |node| node.name()),
            fired.as_deref().unwrap_or("none"),
        );
    }

    println!("\nPath: {}", machine.root().history().get_path().join(" -> "));

    machine.pause();
    let snapshot = machine.snapshot();
    println!("\nSnapshot ({} links):", snapshot.root.links.len());
    for link in &snapshot.root.links {
        println!(
            "  {:<6} -> {} when {:<12} executed {}",
            link.kind.to_string(),
            link.destination,
            link.condition.as_deref().unwrap_or("end"),
            link.executed
        );
    }
    println!("\n{}", snapshot.to_json().unwrap());

    println!("\n=== Example Complete ===");
}
