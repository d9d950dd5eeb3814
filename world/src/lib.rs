#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Crossing.

mod board;
mod collision;
mod generation;
mod motion;

use std::time::Duration;

use crossing_core::{
    Command, Direction, Event, GameConfig, GridPosition, LaneKind, MoveRejection, PlayMode,
    PlayerPose, ResetCause, SessionPhase, TrafficDensity, WELCOME_BANNER,
};
use tracing::{debug, info};

use board::Board;
use generation::LaneGenerator;
use motion::MoveQueue;

pub use collision::{first_hit, Hitbox};
pub use motion::StepCurve;

/// Represents the authoritative Lane Crossing world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    generator: LaneGenerator,
    board: Board,
    density: TrafficDensity,
    player: GridPosition,
    queue: MoveQueue,
    curve: StepCurve,
    phase: SessionPhase,
    mode: PlayMode,
    now: Duration,
    last_move_at: Duration,
    collision_handled: bool,
}

impl World {
    /// Creates a world with a freshly generated board, waiting for a session
    /// to start. The same seed always yields the same sequence of boards.
    #[must_use]
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut generator = LaneGenerator::new(seed, &config);
        let density = PlayMode::Manual.traffic_density();
        let board = Board::generate(&mut generator, config.board.initial_lanes, density, &config);
        Self::assemble(config, generator, board, density)
    }

    /// Creates a world over hand-authored lanes. Lane zero is always a field,
    /// whatever kind is supplied for it; lanes appended later are generated.
    #[must_use]
    pub fn from_lanes(config: GameConfig, seed: u64, lanes: Vec<LaneKind>) -> Self {
        let generator = LaneGenerator::new(seed, &config);
        let board = Board::from_kinds(lanes, config.board.columns);
        let density = PlayMode::Manual.traffic_density();
        Self::assemble(config, generator, board, density)
    }

    fn assemble(
        config: GameConfig,
        mut generator: LaneGenerator,
        mut board: Board,
        density: TrafficDensity,
    ) -> Self {
        let curve = StepCurve::new(&config.motion, config.board.cell_width);
        let player = GridPosition::new(0, config.board.start_column());
        board.materialize_through(player.lane() + 1, &mut generator, density, &config);
        Self {
            banner: WELCOME_BANNER,
            generator,
            board,
            density,
            player,
            queue: MoveQueue::default(),
            curve,
            phase: SessionPhase::NotStarted,
            mode: PlayMode::Manual,
            now: Duration::ZERO,
            last_move_at: Duration::ZERO,
            collision_handled: false,
            config,
        }
    }

    fn evaluate(&self, direction: Direction) -> Result<GridPosition, MoveRejection> {
        if self.phase != SessionPhase::Playing {
            return Err(MoveRejection::SessionInactive);
        }
        if !self.queue.is_empty() {
            return Err(MoveRejection::StepInFlight);
        }

        let columns = self.config.board.columns;
        let target = self
            .queue
            .tentative(self.player, columns)
            .and_then(|tentative| direction.step_from(tentative, columns))
            .ok_or(MoveRejection::BoardEdge)?;

        // The lane ahead exists from construction on; every accepted forward
        // move appends the next one.
        let lane = self
            .board
            .lane(target.lane())
            .ok_or(MoveRejection::LaneNotGenerated)?;
        if lane.is_column_blocked(target.column()) {
            return Err(MoveRejection::Blocked);
        }
        Ok(target)
    }

    fn request_move(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let target = match self.evaluate(direction) {
            Ok(target) => target,
            Err(reason) => {
                debug!(?direction, %reason, "move rejected");
                out_events.push(Event::MoveRejected { direction, reason });
                return;
            }
        };

        let was_idle = self.queue.is_empty();
        self.queue.push(direction, self.now);
        self.last_move_at = self.now;
        out_events.push(Event::MoveQueued { direction, target });
        if was_idle {
            out_events.push(Event::StepStarted {
                direction,
                from: self.player,
            });
        }

        if direction == Direction::Forward {
            let index = self
                .board
                .append_lane(&mut self.generator, self.density, &self.config);
            out_events.push(Event::LaneAppended { index });
        }
    }

    fn advance_step(&mut self, out_events: &mut Vec<Event>) {
        let columns = self.config.board.columns;
        while let Some(direction) = self.queue.complete_due(self.now, self.curve.duration()) {
            let from = self.player;
            if let Some(to) = direction.step_from(from, columns) {
                self.player = to;
            }
            out_events.push(Event::StepCompleted {
                direction,
                from,
                to: self.player,
            });
            if let Some((next, _)) = self.queue.in_flight() {
                out_events.push(Event::StepStarted {
                    direction: next,
                    from: self.player,
                });
            }
        }
    }

    fn avatar_hitbox(&self) -> Hitbox {
        let pose = self.pose();
        let motion = &self.config.motion;
        Hitbox::new(
            self.config.board.column_center(self.player.column()) + pose.lateral_shift(),
            pose.hop(),
            motion.player_half_width,
            motion.player_half_depth,
        )
    }

    fn detect_collision(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::Playing || self.collision_handled {
            return;
        }
        let Some(lane) = self.board.lane(self.player.lane()) else {
            return;
        };
        if first_hit(&self.avatar_hitbox(), lane).is_none() {
            return;
        }

        self.phase = SessionPhase::GameOver;
        self.collision_handled = true;
        self.queue.clear();
        let score = self.player.lane();
        info!(score, mode = ?self.mode, "avatar hit by traffic");
        out_events.push(Event::GameOver {
            score,
            mode: self.mode,
        });
    }

    fn start_session(&mut self, mode: PlayMode, out_events: &mut Vec<Event>) {
        if self.phase != SessionPhase::NotStarted {
            debug!(?mode, phase = ?self.phase, "session start ignored");
            return;
        }
        self.phase = SessionPhase::Playing;
        self.mode = mode;
        self.density = mode.traffic_density();
        self.last_move_at = self.now;
        self.collision_handled = false;
        info!(?mode, "session started");
        out_events.push(Event::SessionStarted { mode });
    }

    fn reset_session(&mut self, cause: ResetCause, out_events: &mut Vec<Event>) {
        let mode = self.mode;
        self.queue.clear();
        self.board = Board::generate(
            &mut self.generator,
            self.config.board.initial_lanes,
            self.density,
            &self.config,
        );
        self.player = GridPosition::new(0, self.config.board.start_column());
        self.board.materialize_through(
            self.player.lane() + 1,
            &mut self.generator,
            self.density,
            &self.config,
        );
        self.phase = SessionPhase::NotStarted;
        self.last_move_at = self.now;
        self.collision_handled = false;
        info!(?cause, ?mode, "session reset");
        out_events.push(Event::SessionReset { cause, mode });
    }

    fn pose(&self) -> PlayerPose {
        match self.queue.in_flight() {
            Some((direction, started_at)) => {
                let elapsed = self.now.saturating_sub(started_at);
                PlayerPose::mid_step(
                    self.player,
                    direction,
                    self.curve.travel(elapsed),
                    self.curve.hop(elapsed),
                )
            }
            None => PlayerPose::at_rest(self.player),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Within a tick, traffic moves first, then the step animation advances, and
/// collisions are checked last against the positions of the same tick.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.now = world.now.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            if world.phase == SessionPhase::GameOver {
                return;
            }
            world.board.advance_traffic(dt, &world.config);
            world.advance_step(out_events);
            world.detect_collision(out_events);
        }
        Command::Move { direction } => world.request_move(direction, out_events),
        Command::StartSession { mode } => world.start_session(mode, out_events),
        Command::ResetSession { cause } => world.reset_session(cause, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use crossing_core::{
        BoardView, Direction, GameConfig, GridPosition, MoveRejection, PlayerPose,
        SessionSnapshot,
    };

    use super::{Hitbox, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Read-only view over every generated lane.
    #[must_use]
    pub fn board(world: &World) -> BoardView<'_> {
        world.board.view()
    }

    /// Settled grid position of the avatar.
    #[must_use]
    pub fn player_position(world: &World) -> GridPosition {
        world.player
    }

    /// Settled position combined with the step currently animating.
    #[must_use]
    pub fn player_pose(world: &World) -> PlayerPose {
        world.pose()
    }

    /// Collision box of the avatar in world units.
    #[must_use]
    pub fn player_hitbox(world: &World) -> Hitbox {
        world.avatar_hitbox()
    }

    /// Current score, which is the settled lane index.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.player.lane()
    }

    /// Captures the session bookkeeping.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            phase: world.phase,
            mode: world.mode,
            now: world.now,
            last_move_at: world.last_move_at,
            queued_moves: world.queue.len(),
            stepping: world.queue.in_flight().is_some(),
        }
    }

    /// Evaluates a move exactly as `Command::Move` would, without mutating
    /// the world. Returns the cell the avatar would reach.
    ///
    /// The lane ahead of the settled avatar always exists, so a forward move
    /// is judged on real lane content rather than on generation order.
    pub fn evaluate_move(world: &World, direction: Direction) -> Result<GridPosition, MoveRejection> {
        world.evaluate(direction)
    }
}
