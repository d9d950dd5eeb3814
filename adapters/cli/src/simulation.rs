//! Frame driver that wires the world to the lifecycle and autopilot systems.

use std::time::Duration;

use crossing_core::{Command, Event, GameConfig, PlayMode};
use crossing_rendering::{RenderingError, Scene, Viewport};
use crossing_system_autopilot::{Autopilot, Config as AutopilotConfig};
use crossing_system_session::{Config as SessionConfig, Session};
use crossing_world::{self as world, query, World};

use crate::input::HostInput;

const AUTOPILOT_SALT: u64 = 0x5eed_a070_9170_7a11;

/// Result of a session that ended in a collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Crash {
    /// Settled lane reached before the collision.
    pub(crate) score: u32,
    /// Mode of the session that crashed.
    pub(crate) mode: PlayMode,
}

impl Crash {
    /// Code handed to the player on the game over screen.
    pub(crate) fn reward_code(&self) -> String {
        format!("TOYOTA{:03}", self.score)
    }
}

/// Owns the world and every system, pumping commands until the frame settles.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    session: Session,
    autopilot: Autopilot,
    events: Vec<Event>,
    crashes: Vec<Crash>,
}

impl Simulation {
    /// Boots a simulation whose board and autopilot are derived from `seed`.
    pub(crate) fn new(config: GameConfig, seed: u64) -> Self {
        let session = Session::new(SessionConfig::new(&config.session));
        let autopilot = Autopilot::new(AutopilotConfig::new(
            &config.autopilot,
            seed ^ AUTOPILOT_SALT,
        ));
        Self {
            world: World::new(config, seed),
            session,
            autopilot,
            events: Vec::new(),
            crashes: Vec::new(),
        }
    }

    /// Advances one frame, then applies the host input pressed during it.
    pub(crate) fn frame(&mut self, dt: Duration, input: Option<HostInput>) {
        self.submit(Command::Tick { dt });
        if let Some(input) = input {
            self.submit(input.command());
        }
    }

    /// Applies a command and lets the systems react until no follow-up remains.
    pub(crate) fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.crashes.extend(events.iter().filter_map(|event| match *event {
                Event::GameOver { score, mode } => Some(Crash { score, mode }),
                _ => None,
            }));
            self.events.extend(events.iter().copied());

            let snapshot = query::session(&self.world);
            let world = &self.world;
            self.session.handle(&events, &snapshot, &mut pending);
            self.autopilot.handle(
                &events,
                &snapshot,
                |direction| query::evaluate_move(world, direction).is_ok(),
                &mut pending,
            );
        }
    }

    /// Captures the current frame for presentation.
    pub(crate) fn scene(&self, viewport: Viewport) -> Result<Scene, RenderingError> {
        Scene::capture(
            query::board(&self.world),
            &query::player_pose(&self.world),
            &query::session(&self.world),
            &query::config(&self.world).board,
            viewport,
        )
    }

    pub(crate) const fn world(&self) -> &World {
        &self.world
    }

    /// Every event broadcast so far, in order.
    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    /// Every collision observed so far, in order.
    pub(crate) fn crashes(&self) -> &[Crash] {
        &self.crashes
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
    };

    use crossing_core::{Direction, SessionPhase};

    use super::*;

    const FRAME: Duration = Duration::from_millis(50);

    fn run(seed: u64, frames: usize, script: &[(usize, HostInput)]) -> Simulation {
        let mut simulation = Simulation::new(GameConfig::default(), seed);
        for frame in 0..frames {
            let input = script
                .iter()
                .find(|(at, _)| *at == frame)
                .map(|(_, input)| *input);
            simulation.frame(FRAME, input);
        }
        simulation
    }

    fn fingerprint(simulation: &Simulation) -> u64 {
        let mut hasher = DefaultHasher::new();
        simulation.events().hash(&mut hasher);
        simulation.crashes().hash(&mut hasher);
        query::player_position(simulation.world()).hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn attract_replay_is_deterministic() {
        let first = run(11, 1_200, &[]);
        let second = run(11, 1_200, &[]);

        assert_eq!(first.events(), second.events(), "replay diverged between runs");
        assert_eq!(fingerprint(&first), fingerprint(&second));
        assert!(first.events().contains(&Event::SessionStarted {
            mode: PlayMode::Demo
        }));
    }

    #[test]
    fn scripted_manual_play_advances_through_open_fields() {
        let mut config = GameConfig::default();
        config.board.lane_weights.car = 0;
        config.board.lane_weights.truck = 0;
        config.board.lane_weights.forest = 0;
        config.session.auto_start_on_boot = false;

        let mut simulation = Simulation::new(config, 3);
        simulation.submit(HostInput::Start.command());
        for _ in 0..3 {
            simulation.frame(FRAME, Some(HostInput::Move(Direction::Forward)));
            for _ in 0..4 {
                simulation.frame(FRAME, None);
            }
        }

        let session = query::session(simulation.world());
        assert_eq!(session.phase, SessionPhase::Playing);
        assert_eq!(session.mode, PlayMode::Manual);
        assert_eq!(query::score(simulation.world()), 3);
        assert!(simulation.crashes().is_empty());

        let scene = simulation.scene(Viewport::default()).expect("default layout");
        assert_eq!(scene.score, 3);
        assert_eq!(scene.avatar_cell(), (3, 8));
    }

    #[test]
    fn reward_codes_pad_to_three_digits() {
        let crash = Crash {
            score: 7,
            mode: PlayMode::Manual,
        };
        assert_eq!(crash.reward_code(), "TOYOTA007");
        let far = Crash {
            score: 1_204,
            mode: PlayMode::Demo,
        };
        assert_eq!(far.reward_code(), "TOYOTA1204");
    }
}
