#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Crossing engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod config;
mod lane;
mod timers;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use config::{
    AutopilotTuning, BoardTuning, ConfigError, GameConfig, LaneWeights, MotionTuning,
    SessionTuning, TrafficTuning, VehicleProfile,
};
pub use lane::{Forest, Heading, Lane, LaneKind, Obstacle, Road, Vehicle, VehicleKind};
pub use timers::{TimerToken, Timers};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Crossing.";

/// Who is driving the avatar during a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// A human submits every move.
    Manual,
    /// The autopilot plays on its own.
    Demo,
}

impl PlayMode {
    /// Traffic density used for lanes generated while this mode is active.
    #[must_use]
    pub const fn traffic_density(self) -> TrafficDensity {
        match self {
            Self::Manual => TrafficDensity::Regular,
            Self::Demo => TrafficDensity::Sparse,
        }
    }
}

/// How crowded generated road lanes are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrafficDensity {
    /// Full vehicle count per road lane.
    Regular,
    /// Reduced vehicle count used by the demo.
    Sparse,
}

/// Lifecycle phase of the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// The board is prepared but nobody is playing yet.
    NotStarted,
    /// A session is in play and accepts moves.
    Playing,
    /// The avatar was hit; the world is frozen until a reset.
    GameOver,
}

/// Reason attached to a full session reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResetCause {
    /// The host requested the reset, typically through a retry button.
    Manual,
    /// A demo session sat still for longer than the idle threshold.
    IdleTimeout,
    /// A demo session ended in a collision and the splash delay elapsed.
    DemoSplash,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the avatar hop one cell in the provided direction.
    Move {
        /// Direction of the requested hop.
        direction: Direction,
    },
    /// Starts a session on the prepared board.
    StartSession {
        /// Who drives the avatar for the session.
        mode: PlayMode,
    },
    /// Discards the current board and prepares a fresh one.
    ResetSession {
        /// Why the reset was requested.
        cause: ResetCause,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a session entered play.
    SessionStarted {
        /// Mode the session runs in.
        mode: PlayMode,
    },
    /// Announces that the world was rebuilt and returned to the start screen.
    SessionReset {
        /// Why the reset happened.
        cause: ResetCause,
        /// Mode of the session that was discarded.
        mode: PlayMode,
    },
    /// Confirms that a move passed validation and joined the queue.
    MoveQueued {
        /// Direction of the accepted move.
        direction: Direction,
        /// Cell the avatar occupies once the move completes.
        target: GridPosition,
    },
    /// Reports that a move request was dropped.
    MoveRejected {
        /// Direction of the dropped move.
        direction: Direction,
        /// Specific reason the move was refused.
        reason: MoveRejection,
    },
    /// Announces that a step animation began.
    StepStarted {
        /// Direction of the animated step.
        direction: Direction,
        /// Settled cell the step departs from.
        from: GridPosition,
    },
    /// Confirms that a step animation finished and the avatar settled.
    StepCompleted {
        /// Direction of the finished step.
        direction: Direction,
        /// Cell occupied before the step.
        from: GridPosition,
        /// Cell occupied after the step.
        to: GridPosition,
    },
    /// Confirms that a new lane was generated at the frontier.
    LaneAppended {
        /// Index of the generated lane.
        index: u32,
    },
    /// Announces that a vehicle hit the avatar.
    GameOver {
        /// Settled lane index reached before the collision.
        score: u32,
        /// Mode of the session that ended.
        mode: PlayMode,
    },
}

/// Logical hop directions available to the avatar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing lane indices.
    Forward,
    /// Toward decreasing lane indices.
    Backward,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the cell one hop away, or `None` when the hop leaves the board.
    ///
    /// Forward is unbounded because the board grows on demand; the other
    /// directions stop at lane zero and at the outer columns.
    #[must_use]
    pub fn step_from(self, from: GridPosition, columns: u32) -> Option<GridPosition> {
        match self {
            Self::Forward => Some(GridPosition::new(from.lane().checked_add(1)?, from.column())),
            Self::Backward => Some(GridPosition::new(from.lane().checked_sub(1)?, from.column())),
            Self::Left => Some(GridPosition::new(from.lane(), from.column().checked_sub(1)?)),
            Self::Right => {
                let column = from.column().checked_add(1)?;
                (column < columns).then(|| GridPosition::new(from.lane(), column))
            }
        }
    }

    /// Reports whether the hop travels along the lateral axis.
    #[must_use]
    pub const fn is_lateral(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Discrete location of the avatar on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    lane: u32,
    column: u32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(lane: u32, column: u32) -> Self {
        Self { lane, column }
    }

    /// Zero-based lane index.
    #[must_use]
    pub const fn lane(&self) -> u32 {
        self.lane
    }

    /// Zero-based column index within the lane.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum MoveRejection {
    /// No session is in play, either before the start or after a collision.
    #[error("no session is in play")]
    SessionInactive,
    /// A step is already queued or animating.
    #[error("a step is already in flight")]
    StepInFlight,
    /// The hop would leave the board.
    #[error("the move would leave the board")]
    BoardEdge,
    /// The destination column is blocked by a tree or an obstacle pillar.
    #[error("the destination column is blocked")]
    Blocked,
    /// The destination lane has not been generated yet.
    #[error("the destination lane has not been generated")]
    LaneNotGenerated,
}

/// Read-only snapshot of the session bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// Mode of the current or most recent session.
    pub mode: PlayMode,
    /// Simulated time elapsed since the world was created.
    pub now: Duration,
    /// Simulated time of the last accepted move or session start.
    pub last_move_at: Duration,
    /// Number of moves waiting in the queue, including the one in flight.
    pub queued_moves: usize,
    /// Whether a step animation is currently running.
    pub stepping: bool,
}

impl SessionSnapshot {
    /// Reports whether a demo session is in play.
    #[must_use]
    pub fn is_demo_in_play(&self) -> bool {
        self.phase == SessionPhase::Playing && self.mode == PlayMode::Demo
    }

    /// Reports whether the avatar is standing still with nothing queued.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.queued_moves == 0 && !self.stepping
    }

    /// Time elapsed since the last accepted move.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.now.saturating_sub(self.last_move_at)
    }
}

/// Derived pose of the avatar, combining the settled cell with the step in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPose {
    settled: GridPosition,
    stepping: Option<Direction>,
    travel: f32,
    hop: f32,
}

impl PlayerPose {
    /// Pose of an avatar resting on its settled cell.
    #[must_use]
    pub const fn at_rest(settled: GridPosition) -> Self {
        Self {
            settled,
            stepping: None,
            travel: 0.0,
            hop: 0.0,
        }
    }

    /// Pose of an avatar part-way through a step.
    #[must_use]
    pub const fn mid_step(settled: GridPosition, direction: Direction, travel: f32, hop: f32) -> Self {
        Self {
            settled,
            stepping: Some(direction),
            travel,
            hop,
        }
    }

    /// Last fully completed grid position.
    #[must_use]
    pub const fn settled(&self) -> GridPosition {
        self.settled
    }

    /// Direction of the step in flight, if any.
    #[must_use]
    pub const fn stepping(&self) -> Option<Direction> {
        self.stepping
    }

    /// Distance travelled along the step axis, in world units.
    #[must_use]
    pub const fn travel(&self) -> f32 {
        self.travel
    }

    /// Current hop elevation, in world units.
    #[must_use]
    pub const fn hop(&self) -> f32 {
        self.hop
    }

    /// Signed lateral displacement from the settled column centre.
    #[must_use]
    pub fn lateral_shift(&self) -> f32 {
        match self.stepping {
            Some(Direction::Left) => -self.travel,
            Some(Direction::Right) => self.travel,
            _ => 0.0,
        }
    }

    /// Signed displacement along the forward axis from the settled lane.
    #[must_use]
    pub fn forward_shift(&self) -> f32 {
        match self.stepping {
            Some(Direction::Forward) => self.travel,
            Some(Direction::Backward) => -self.travel,
            _ => 0.0,
        }
    }
}

/// Read-only view over the generated lanes.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    lanes: &'a [Lane],
    columns: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided lanes.
    #[must_use]
    pub const fn new(lanes: &'a [Lane], columns: u32) -> Self {
        Self { lanes, columns }
    }

    /// Number of columns in every lane.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of lanes generated so far.
    #[must_use]
    pub fn len(&self) -> u32 {
        u32::try_from(self.lanes.len()).unwrap_or(u32::MAX)
    }

    /// Reports whether the board holds no lanes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Index of the highest lane materialized so far.
    #[must_use]
    pub fn frontier(&self) -> Option<u32> {
        self.len().checked_sub(1)
    }

    /// Returns the lane at the provided index, if it was generated.
    #[must_use]
    pub fn lane(&self, index: u32) -> Option<&'a Lane> {
        self.lanes.get(usize::try_from(index).ok()?)
    }

    /// Iterator over the lanes in index order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Lane> + 'a {
        self.lanes.iter()
    }
}
