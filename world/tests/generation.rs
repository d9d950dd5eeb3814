use std::time::Duration;

use crossing_core::{Command, Event, GameConfig, Lane, LaneKind, PlayMode, ResetCause};
use crossing_world::{self as world, query, World};

fn lanes(world: &World) -> Vec<Lane> {
    query::board(world).iter().cloned().collect()
}

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

#[test]
fn lane_zero_is_always_a_field() {
    for seed in 0..64 {
        let mut world = World::new(GameConfig::default(), seed);
        assert_eq!(
            query::board(&world).lane(0).map(Lane::kind),
            Some(&LaneKind::Field)
        );

        let _ = send(
            &mut world,
            Command::ResetSession {
                cause: ResetCause::Manual,
            },
        );
        assert_eq!(
            query::board(&world).lane(0).map(Lane::kind),
            Some(&LaneKind::Field)
        );
    }
}

#[test]
fn same_seed_yields_the_same_board() {
    let first = World::new(GameConfig::default(), 0x5eed);
    let second = World::new(GameConfig::default(), 0x5eed);
    assert_eq!(lanes(&first), lanes(&second));
}

#[test]
fn forests_respect_tree_counts_and_reservations() {
    let config = GameConfig::default();
    let mut forests = 0;
    let mut obstacles = 0;

    for seed in 0..64 {
        let world = World::new(config.clone(), seed);
        for lane in query::board(&world).iter() {
            let LaneKind::Forest(forest) = lane.kind() else {
                continue;
            };
            forests += 1;
            let trees: Vec<u32> = forest.trees().collect();

            match forest.obstacle() {
                Some(obstacle) => {
                    obstacles += 1;
                    assert!(lane.index() >= config.board.obstacle_min_lane);
                    assert!(lane.is_column_blocked(obstacle.pillar_column));
                    assert_eq!(trees.len(), 3);
                    for tree in &trees {
                        assert!(!forest.reserved().contains(tree));
                    }
                }
                None => assert_eq!(trees.len(), 4),
            }

            for column in 0..config.board.columns {
                let expected = forest.occupied().contains(&column);
                assert_eq!(lane.is_column_blocked(column), expected);
            }
        }
    }

    assert!(forests > 0);
    assert!(obstacles > 0);
}

#[test]
fn roads_carry_distinct_vehicles_at_configured_speeds() {
    let config = GameConfig::default();
    let mut roads = 0;

    for seed in 0..32 {
        let world = World::new(config.clone(), seed);
        for lane in query::board(&world).iter() {
            let LaneKind::Road(road) = lane.kind() else {
                continue;
            };
            roads += 1;
            let profile = config.traffic.profile(road.vehicle_kind());
            assert_eq!(road.vehicles().len() as u32, profile.count);
            assert!(config.traffic.lane_speeds.contains(&road.speed()));

            let mut offsets: Vec<f32> = road.vehicles().iter().map(|v| v.offset()).collect();
            offsets.sort_by(f32::total_cmp);
            for pair in offsets.windows(2) {
                let gap = pair[1] - pair[0];
                let spacing = config.board.cell_width * profile.slot_span as f32;
                assert!(gap + 1e-3 >= spacing, "vehicles stacked: {offsets:?}");
            }
        }
    }

    assert!(roads > 0);
}

#[test]
fn boards_rebuilt_after_a_demo_carry_sparse_traffic() {
    let mut world = World::new(GameConfig::default(), 21);
    let _ = send(
        &mut world,
        Command::StartSession {
            mode: PlayMode::Demo,
        },
    );
    let _ = send(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
    );
    let events = send(
        &mut world,
        Command::ResetSession {
            cause: ResetCause::IdleTimeout,
        },
    );
    assert_eq!(
        events,
        vec![Event::SessionReset {
            cause: ResetCause::IdleTimeout,
            mode: PlayMode::Demo,
        }]
    );

    let traffic = &query::config(&world).traffic;
    for lane in query::board(&world).iter() {
        if let LaneKind::Road(road) = lane.kind() {
            let profile = traffic.profile(road.vehicle_kind());
            assert_eq!(road.vehicles().len() as u32, profile.sparse_count);
        }
    }
}
