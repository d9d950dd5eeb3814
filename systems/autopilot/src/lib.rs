#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous play system that drives the avatar during demo sessions.
//!
//! The autopilot never touches the world directly: it decides on a timer,
//! asks the caller whether a move is legal, and submits the move as a regular
//! [`Command::Move`] so it is bound by exactly the same rules as human input.

use std::time::Duration;

use crossing_core::{
    AutopilotTuning, Command, Direction, Event, PlayMode, SessionSnapshot, TimerToken, Timers,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const LATERAL: [Direction; 2] = [Direction::Left, Direction::Right];

/// Configuration parameters required to construct the autopilot.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    decision_delay: DelayRange,
    stalled_delay: DelayRange,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration from the autopilot pacing and a seed.
    #[must_use]
    pub const fn new(tuning: &AutopilotTuning, rng_seed: u64) -> Self {
        Self {
            decision_delay: DelayRange::new(tuning.decision_min_millis, tuning.decision_max_millis),
            stalled_delay: DelayRange::new(tuning.stalled_min_millis, tuning.stalled_max_millis),
            rng_seed,
        }
    }
}

/// Half-open range of delays in milliseconds.
#[derive(Clone, Copy, Debug)]
struct DelayRange {
    min_millis: u64,
    max_millis: u64,
}

impl DelayRange {
    const fn new(min_millis: u64, max_millis: u64) -> Self {
        Self {
            min_millis,
            max_millis,
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_millis <= self.min_millis {
            return Duration::from_millis(self.min_millis);
        }
        Duration::from_millis(rng.gen_range(self.min_millis..self.max_millis))
    }
}

/// Outcome of a single autopilot decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Submit a move in the provided direction.
    Move(Direction),
    /// A step is still in flight; try again later.
    Busy,
    /// No legal move exists from the current cell.
    Stalled,
}

/// Picks the next move: forward when legal, otherwise a uniformly random legal
/// lateral move, otherwise nothing.
pub fn decide<R, F>(rng: &mut R, is_move_legal: F) -> Decision
where
    R: Rng + ?Sized,
    F: Fn(Direction) -> bool,
{
    if is_move_legal(Direction::Forward) {
        return Decision::Move(Direction::Forward);
    }

    let candidates: Vec<Direction> = LATERAL
        .iter()
        .copied()
        .filter(|direction| is_move_legal(*direction))
        .collect();
    candidates
        .choose(rng)
        .copied()
        .map_or(Decision::Stalled, Decision::Move)
}

/// Pure system that emits move commands while a demo session is in play.
#[derive(Debug)]
pub struct Autopilot {
    decision_delay: DelayRange,
    stalled_delay: DelayRange,
    rng: ChaCha8Rng,
    timers: Timers<()>,
    next_decision: Option<TimerToken>,
}

impl Autopilot {
    /// Creates a new autopilot using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            decision_delay: config.decision_delay,
            stalled_delay: config.stalled_delay,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            timers: Timers::new(),
            next_decision: None,
        }
    }

    /// Consumes world events and the session snapshot to emit move commands.
    ///
    /// `is_move_legal` must answer with the same evaluation the world applies
    /// to [`Command::Move`]. Lifecycle events cancel the pending decision
    /// before any time in the batch is applied, so no decision ever fires into
    /// a session that was started, reset or lost meanwhile.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        session: &SessionSnapshot,
        is_move_legal: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Direction) -> bool,
    {
        let mut elapsed = Duration::ZERO;
        let mut demo_started = false;
        let mut lifecycle_changed = false;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::SessionStarted { mode } => {
                    lifecycle_changed = true;
                    demo_started = *mode == PlayMode::Demo;
                }
                Event::SessionReset { .. } | Event::GameOver { .. } => {
                    lifecycle_changed = true;
                    demo_started = false;
                }
                _ => {}
            }
        }

        if lifecycle_changed {
            self.disarm();
        }

        let mut fired = Vec::new();
        self.timers.advance(elapsed, &mut fired);
        if !fired.is_empty() {
            self.next_decision = None;
        }

        if demo_started {
            self.arm(self.decision_delay);
        }

        if fired.is_empty() {
            return;
        }
        if !session.is_demo_in_play() {
            return;
        }

        let decision = if session.is_idle() {
            decide(&mut self.rng, &is_move_legal)
        } else {
            Decision::Busy
        };
        debug!(?decision, "autopilot decision");

        match decision {
            Decision::Move(direction) => {
                out.push(Command::Move { direction });
                self.arm(self.decision_delay);
            }
            Decision::Busy => self.arm(self.decision_delay),
            Decision::Stalled => self.arm(self.stalled_delay),
        }
    }

    /// Time left before the next decision, if one is scheduled.
    #[must_use]
    pub fn next_decision_in(&self) -> Option<Duration> {
        self.timers.remaining(self.next_decision?)
    }

    fn arm(&mut self, range: DelayRange) {
        let delay = range.sample(&mut self.rng);
        self.next_decision = Some(self.timers.schedule(delay, ()));
    }

    fn disarm(&mut self) {
        if let Some(token) = self.next_decision.take() {
            let _ = self.timers.cancel(token);
        }
    }
}
