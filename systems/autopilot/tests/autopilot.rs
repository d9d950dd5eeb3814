use std::time::Duration;

use crossing_core::{
    AutopilotTuning, Command, Direction, Event, Forest, GameConfig, GridPosition, LaneKind,
    MoveRejection, Obstacle, PlayMode, ResetCause, SessionPhase,
};
use crossing_system_autopilot::{decide, Autopilot, Config, Decision};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use crossing_world::{self as world, query, World};

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

/// Runs the autopilot for `frames` ticks, asserting that every move it submits
/// is accepted by the world.
fn drive(world: &mut World, autopilot: &mut Autopilot, frames: usize, frame_millis: u64) -> usize {
    let mut submitted = 0;
    for _ in 0..frames {
        let events = send(
            world,
            Command::Tick {
                dt: Duration::from_millis(frame_millis),
            },
        );
        let snapshot = query::session(world);
        let mut commands = Vec::new();
        autopilot.handle(
            &events,
            &snapshot,
            |direction| query::evaluate_move(world, direction).is_ok(),
            &mut commands,
        );

        for command in commands {
            submitted += 1;
            let outcome = send(world, command);
            assert!(
                outcome
                    .iter()
                    .any(|event| matches!(event, Event::MoveQueued { .. })),
                "autopilot move refused: {outcome:?}"
            );
        }
    }
    submitted
}

fn demo(world: &mut World, autopilot: &mut Autopilot) {
    let events = send(
        world,
        Command::StartSession {
            mode: PlayMode::Demo,
        },
    );
    let snapshot = query::session(world);
    let mut commands = Vec::new();
    autopilot.handle(&events, &snapshot, |_| true, &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn first_decision_lands_within_the_normal_window() {
    let mut world = World::from_lanes(GameConfig::default(), 1, vec![LaneKind::Field; 12]);
    let mut autopilot = Autopilot::new(Config::new(&AutopilotTuning::default(), 99));
    assert_eq!(autopilot.next_decision_in(), None);

    demo(&mut world, &mut autopilot);
    let delay = autopilot.next_decision_in().expect("decision armed");
    assert!(delay >= Duration::from_millis(1_000) && delay < Duration::from_millis(2_000));

    let delay_millis = delay.as_millis() as usize;
    assert_eq!(drive(&mut world, &mut autopilot, delay_millis - 1, 1), 0);
    assert_eq!(drive(&mut world, &mut autopilot, 1, 1), 1);
    assert_eq!(drive(&mut world, &mut autopilot, 200, 1), 0);
    assert_eq!(query::score(&world), 1);
}

#[test]
fn autopilot_moves_are_accepted_on_generated_boards() {
    for seed in 0..16 {
        let mut world = World::new(GameConfig::default(), seed);
        let mut autopilot = Autopilot::new(Config::new(&AutopilotTuning::default(), seed));
        demo(&mut world, &mut autopilot);

        let _ = drive(&mut world, &mut autopilot, 2_000, 16);
        let session = query::session(&world);
        if session.phase == SessionPhase::Playing {
            assert!(autopilot.next_decision_in().is_some());
        }
    }
}

#[test]
fn sidesteps_when_the_lane_ahead_is_blocked() {
    let wall = Forest::new((0..17).filter(|column| *column != 9), None);
    let mut world = World::from_lanes(
        GameConfig::default(),
        4,
        vec![LaneKind::Field, LaneKind::Forest(wall), LaneKind::Field],
    );
    let mut autopilot = Autopilot::new(Config::new(&AutopilotTuning::default(), 5));
    demo(&mut world, &mut autopilot);
    assert_eq!(
        query::evaluate_move(&world, Direction::Forward),
        Err(MoveRejection::Blocked)
    );

    let delay = autopilot.next_decision_in().expect("decision armed");
    assert_eq!(drive(&mut world, &mut autopilot, 1, delay.as_millis() as u64), 1);
    let _ = drive(&mut world, &mut autopilot, 1, 200);

    let position = query::player_position(&world);
    assert_eq!(position.lane(), 0);
    assert!(position.column() == 7 || position.column() == 9, "{position:?}");
}

#[test]
fn boxed_in_autopilot_waits_longer() {
    let mut config = GameConfig::default();
    config.board.columns = 1;
    let mut world = World::from_lanes(
        config,
        4,
        vec![LaneKind::Field, LaneKind::Forest(Forest::new([0], None))],
    );
    let mut autopilot = Autopilot::new(Config::new(&AutopilotTuning::default(), 8));
    demo(&mut world, &mut autopilot);

    let first = autopilot.next_decision_in().expect("decision armed");
    assert_eq!(drive(&mut world, &mut autopilot, 1, first.as_millis() as u64), 0);

    let stalled = autopilot.next_decision_in().expect("decision re-armed");
    assert!(stalled >= Duration::from_millis(2_000) && stalled < Duration::from_millis(4_000));
    assert_eq!(query::player_position(&world), GridPosition::new(0, 0));
}

#[test]
fn lifecycle_events_cancel_the_pending_decision() {
    let mut world = World::from_lanes(GameConfig::default(), 1, vec![LaneKind::Field; 12]);
    let mut autopilot = Autopilot::new(Config::new(&AutopilotTuning::default(), 2));
    demo(&mut world, &mut autopilot);
    assert!(autopilot.next_decision_in().is_some());

    let events = send(
        &mut world,
        Command::ResetSession {
            cause: ResetCause::Manual,
        },
    );
    let snapshot = query::session(&world);
    let mut commands = Vec::new();
    autopilot.handle(&events, &snapshot, |_| true, &mut commands);
    assert_eq!(autopilot.next_decision_in(), None);

    assert_eq!(drive(&mut world, &mut autopilot, 500, 10), 0);
}

#[test]
fn manual_sessions_are_left_alone() {
    let mut world = World::from_lanes(GameConfig::default(), 1, vec![LaneKind::Field; 12]);
    let mut autopilot = Autopilot::new(Config::new(&AutopilotTuning::default(), 2));
    let events = send(
        &mut world,
        Command::StartSession {
            mode: PlayMode::Manual,
        },
    );
    let snapshot = query::session(&world);
    let mut commands = Vec::new();
    autopilot.handle(&events, &snapshot, |_| true, &mut commands);

    assert_eq!(autopilot.next_decision_in(), None);
    assert_eq!(drive(&mut world, &mut autopilot, 500, 10), 0);
}

fn playing(lanes: Vec<LaneKind>) -> World {
    let mut world = World::from_lanes(GameConfig::default(), 8, lanes);
    let _ = send(
        &mut world,
        Command::StartSession {
            mode: PlayMode::Demo,
        },
    );
    world
}

#[test]
fn legality_query_agrees_with_applied_moves() {
    let boards = [
        vec![LaneKind::Field],
        vec![
            LaneKind::Field,
            LaneKind::Forest(Forest::new([7, 8, 9], None)),
        ],
        vec![
            LaneKind::Field,
            LaneKind::Forest(Forest::new(Vec::<u32>::new(), Some(Obstacle::new(8)))),
            LaneKind::Field,
        ],
    ];

    for lanes in boards {
        let world = playing(lanes.clone());
        for direction in Direction::ALL {
            let predicted = query::evaluate_move(&world, direction).is_ok();
            let mut applied = world.clone();
            let accepted = send(&mut applied, Command::Move { direction })
                .iter()
                .any(|event| matches!(event, Event::MoveQueued { .. }));
            assert_eq!(
                predicted, accepted,
                "{direction:?} on {lanes:?}: query {predicted}, apply {accepted}"
            );
        }
    }
}

#[test]
fn autopilot_advances_from_a_single_lane_board() {
    let world = playing(vec![LaneKind::Field]);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let decision = decide(&mut rng, |direction| {
        query::evaluate_move(&world, direction).is_ok()
    });
    assert_eq!(decision, Decision::Move(Direction::Forward));
}
