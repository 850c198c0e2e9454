//! End-to-end scenarios driving a full machine with a manual clock.

use behavior_graph::builder::{LinkBuilder, MachineBuilder, SequenceBuilder};
use behavior_graph::core::{Capabilities, Frame, Guard, ManualClock, Probe, State, Status};
use behavior_graph::graph::{
    CooldownAnchor, Delay, Forced, LinkOptions, Parallel, Sequence, StateNode, TransitionInfo, TransitionKind,
};
use behavior_graph::machine::{Machine, MachineStatus};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);
const LOST_AFTER: Duration = Duration::from_secs(2);

#[derive(Default)]
struct World {
    sees_target: bool,
}

struct Idle;

impl State<World> for Idle {}

struct Patrol;

impl State<World> for Patrol {}

/// Ends once the target has been out of sight for `LOST_AFTER`.
#[derive(Default)]
struct Chase {
    lost_since: Option<Duration>,
}

impl State<World> for Chase {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::ENDABLE
    }

    fn enter(&mut self, _cx: &mut Frame<'_, World>, _via: Option<&TransitionInfo>) {
        self.lost_since = None;
    }

    fn update(&mut self, cx: &mut Frame<'_, World>) {
        if cx.host().sees_target {
            self.lost_since = None;
        } else if self.lost_since.is_none() {
            self.lost_since = Some(cx.now());
        }
    }

    fn end_condition(&self, probe: &Probe<'_, World>) -> Status {
        match self.lost_since {
            None => Status::Failure,
            Some(at) if probe.now().saturating_sub(at) >= LOST_AFTER => Status::Succeeded,
            Some(_) => Status::Running,
        }
    }
}

fn guard_machine() -> (Machine<World>, ManualClock) {
    let root = SequenceBuilder::new("Guard")
        .state(Idle)
        .state(Patrol)
        .state(Chase::default())
        .link(LinkBuilder::new().from("Idle").to("Patrol").when(Guard::always()))
        .link(
            LinkBuilder::new()
                .from("Patrol")
                .to("Chase")
                .when_fn("sees_target", |p: &Probe<'_, World>| p.host().sees_target),
        )
        .link(LinkBuilder::new().from("Chase").to("Idle"))
        .build()
        .unwrap();

    let clock = ManualClock::new();
    let mut machine = MachineBuilder::new()
        .host(World::default())
        .root(root)
        .clock(clock.clone())
        .build()
        .unwrap();
    machine.init().unwrap();
    (machine, clock)
}

fn frame<C: 'static>(machine: &mut Machine<C>, clock: &ManualClock, delta: Duration) {
    clock.advance(delta);
    machine.run_frame();
}

fn running<C: 'static>(machine: &Machine<C>) -> Option<&str> {
    machine.root().running_node().map(|node| node.name())
}

#[test]
fn guard_patrols_chases_and_gives_up() {
    let (mut machine, clock) = guard_machine();
    machine.start();
    assert_eq!(running(&machine), Some("Idle"));

    frame(&mut machine, &clock, FRAME);
    assert_eq!(running(&machine), Some("Patrol"));

    machine.host_mut().sees_target = true;
    frame(&mut machine, &clock, FRAME);
    assert_eq!(running(&machine), Some("Chase"));

    machine.host_mut().sees_target = false;
    frame(&mut machine, &clock, FRAME);
    assert_eq!(running(&machine), Some("Chase"));

    frame(&mut machine, &clock, Duration::from_secs(1));
    assert_eq!(running(&machine), Some("Chase"));

    frame(&mut machine, &clock, Duration::from_secs(1));
    assert_eq!(running(&machine), Some("Idle"));

    let path = machine.root().history().get_path();
    assert_eq!(path, vec!["Idle", "Patrol", "Chase", "Idle"]);
}

#[test]
fn entered_state_is_not_resolved_in_the_same_tick() {
    let (mut machine, clock) = guard_machine();
    machine.host_mut().sees_target = true;
    machine.start();

    frame(&mut machine, &clock, FRAME);
    assert_eq!(running(&machine), Some("Patrol"));
    frame(&mut machine, &clock, FRAME);
    assert_eq!(running(&machine), Some("Chase"));
}

#[test]
fn global_link_beats_local_link() {
    let mut root: Sequence = Sequence::new("Root");
    let a = root.add_node(StateNode::new(Forced).named("A"));
    let b = root.add_node(StateNode::new(Forced).named("B"));
    let c = root.add_node(StateNode::new(Forced).named("C"));
    root.link_local(a, b, Guard::always(), LinkOptions::default()).unwrap();
    root.link_global(c, Guard::always(), LinkOptions::default()).unwrap();

    let mut machine = Machine::new(root, ()).with_clock(ManualClock::new());
    machine.init().unwrap();
    machine.start();

    let outcome = machine.run_frame().unwrap();
    assert_eq!(outcome.fired.map(|info| info.kind), Some(TransitionKind::Global));
    assert_eq!(machine.root().running(), Some(c));
}

#[test]
fn first_satisfied_global_link_is_the_one_recorded() {
    let mut root: Sequence = Sequence::new("Root");
    let a = root.add_node(StateNode::new(Forced).named("A"));
    let d = root.add_node(StateNode::new(Forced).named("D"));
    let c1 = Guard::never().named("c1");
    let c2 = Guard::always().named("c2");
    let c2_id = c2.id();
    root.link_global(d, c1, LinkOptions::default()).unwrap();
    let second = root.link_global(d, c2, LinkOptions::default()).unwrap();

    let mut machine = Machine::new(root, ()).with_clock(ManualClock::new());
    machine.init().unwrap();
    machine.start();

    let fired = machine.run_frame().unwrap().fired.unwrap();
    assert_eq!(fired.id, second);
    assert_eq!(fired.condition, Some(c2_id));
    assert_eq!(fired.origin, Some(a));
    assert_eq!(fired.destination, d);

    let transition = machine.root().links().get(second).unwrap();
    assert_eq!(transition.last_origin(), Some(a));
    assert_eq!(transition.executed(), 1);
    assert_eq!(machine.root().history().last().unwrap().condition.as_deref(), Some("c2"));
}

fn nested(resume: bool) -> Machine {
    let mut inner: SequenceBuilder = SequenceBuilder::new("Inner")
        .node(StateNode::new(Forced).named("A"))
        .node(StateNode::new(Forced).named("B"))
        .link(LinkBuilder::new().from("A").to("B").when(Guard::always()));
    if resume {
        inner = inner.resume();
    }

    let root: Sequence = SequenceBuilder::new("Root")
        .state(inner.build().unwrap())
        .node(StateNode::new(Forced).named("Away"))
        .build()
        .unwrap();

    let mut machine = Machine::new(root, ()).with_clock(ManualClock::new());
    machine.init().unwrap();
    machine.start();
    machine.run_frame();
    machine
}

fn inner_running(machine: &Machine) -> Option<String> {
    let inner = machine.root().walk().into_iter().find(|seq| seq.name() == "Inner")?;
    inner.running_node().map(|node| node.name().to_string())
}

#[test]
fn resuming_sequence_reenters_last_running_child() {
    let mut machine = nested(true);
    assert_eq!(inner_running(&machine).as_deref(), Some("B"));

    let away = machine.root().key_of("Away").unwrap();
    let inner = machine.root().key_of("Inner").unwrap();
    machine.force_enter(away).unwrap();
    assert_eq!(inner_running(&machine), None);

    machine.force_enter(inner).unwrap();
    assert_eq!(inner_running(&machine).as_deref(), Some("B"));
}

#[test]
fn resetting_sequence_reenters_startable_child() {
    let mut machine = nested(false);
    assert_eq!(inner_running(&machine).as_deref(), Some("B"));

    let away = machine.root().key_of("Away").unwrap();
    let inner = machine.root().key_of("Inner").unwrap();
    machine.force_enter(away).unwrap();
    machine.force_enter(inner).unwrap();
    assert_eq!(inner_running(&machine).as_deref(), Some("A"));
}

/// Never completes on its own.
struct Watch;

impl State for Watch {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ENDABLE
    }

    fn end_condition(&self, _probe: &Probe<'_, ()>) -> Status {
        Status::Running
    }
}

#[test]
fn parallel_completes_with_its_main_branch() {
    let mut main: Sequence = Sequence::new("Walk");
    main.add_state(Delay::new(Duration::from_secs(1)));
    let mut side: Sequence = Sequence::new("Look");
    side.add_state(Watch);

    let root: Sequence = SequenceBuilder::new("Root")
        .state(Parallel::new(main, side).named("WalkAndLook"))
        .state(Forced)
        .link(LinkBuilder::new().from("WalkAndLook").to("Forced"))
        .build()
        .unwrap();

    let clock = ManualClock::new();
    let mut machine = Machine::new(root, ()).with_clock(clock.clone());
    machine.init().unwrap();
    machine.start();

    frame(&mut machine, &clock, Duration::from_millis(500));
    assert_eq!(running(&machine), Some("WalkAndLook"));

    frame(&mut machine, &clock, Duration::from_millis(500));
    assert_eq!(running(&machine), Some("Forced"));
}

#[test]
fn one_shot_link_is_removed_after_firing() {
    let mut root: Sequence = Sequence::new("Root");
    let a = root.add_node(StateNode::new(Forced).named("A"));
    let b = root.add_node(StateNode::new(Forced).named("B"));
    let once = root.link_local(a, b, Guard::always(), LinkOptions::default().once()).unwrap();
    root.link_local(b, a, Guard::always(), LinkOptions::default()).unwrap();

    let mut machine = Machine::new(root, ()).with_clock(ManualClock::new());
    machine.init().unwrap();
    machine.start();

    machine.run_frame();
    assert_eq!(machine.root().running(), Some(b));
    assert!(machine.root().links().get(once).is_none());

    machine.run_frame();
    machine.run_frame();
    assert_eq!(machine.root().running(), Some(a));
    assert!(machine.root().links().local_from(a).is_none());
}

#[test]
fn cooldown_blocks_until_elapsed() {
    let mut root: Sequence = Sequence::new("Root");
    let a = root.add_node(StateNode::new(Forced).named("A"));
    let b = root.add_node(StateNode::new(Forced).named("B"));
    root.link_local(
        a,
        b,
        Guard::always(),
        LinkOptions::default().cooldown(Duration::from_secs(1), CooldownAnchor::OnEnterDestination),
    )
    .unwrap();
    root.link_local(b, a, Guard::always(), LinkOptions::default()).unwrap();

    let clock = ManualClock::new();
    let mut machine = Machine::new(root, ()).with_clock(clock.clone());
    machine.init().unwrap();
    machine.start();

    frame(&mut machine, &clock, FRAME);
    assert_eq!(machine.root().running(), Some(b));
    frame(&mut machine, &clock, FRAME);
    assert_eq!(machine.root().running(), Some(a));

    frame(&mut machine, &clock, Duration::from_millis(500));
    assert_eq!(machine.root().running(), Some(a));

    frame(&mut machine, &clock, Duration::from_millis(500));
    assert_eq!(machine.root().running(), Some(b));
}

#[test]
fn machine_lifecycle_and_snapshot() {
    let (mut machine, clock) = guard_machine();
    assert_eq!(machine.status(), MachineStatus::Inited);

    machine.start();
    frame(&mut machine, &clock, FRAME);
    machine.pause();

    let snapshot = machine.snapshot();
    assert_eq!(snapshot.status, MachineStatus::Paused);
    assert_eq!(snapshot.running_path(), vec!["Guard", "Patrol"]);
    assert!(snapshot.root.paused);
    assert_eq!(snapshot.root.links.len(), 3);

    frame(&mut machine, &clock, FRAME);
    assert_eq!(running(&machine), Some("Patrol"));

    machine.unpause();
    machine.stop();
    assert_eq!(machine.status(), MachineStatus::Ended);
    assert_eq!(machine.root().running(), None);

    machine.dispose();
    assert_eq!(machine.status(), MachineStatus::None);
}
