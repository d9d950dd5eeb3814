#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session lifecycle system: demo auto-start, idle timeout and the splash
//! delay that returns a crashed demo to the start screen.

use std::time::Duration;

use crossing_core::{
    Command, Direction, Event, PlayMode, ResetCause, SessionPhase, SessionSnapshot,
    SessionTuning, TimerToken, Timers,
};
use tracing::info;

/// Configuration parameters required to construct the session system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    idle_timeout: Duration,
    auto_start_delay: Duration,
    demo_kickoff: Duration,
    splash_delay: Duration,
    auto_start_on_boot: bool,
}

impl Config {
    /// Creates a configuration from the lifecycle tuning.
    #[must_use]
    pub const fn new(tuning: &SessionTuning) -> Self {
        Self {
            idle_timeout: tuning.idle_timeout(),
            auto_start_delay: tuning.auto_start_delay(),
            demo_kickoff: tuning.demo_kickoff(),
            splash_delay: tuning.splash_delay(),
            auto_start_on_boot: tuning.auto_start_on_boot,
        }
    }
}

/// Deferred lifecycle actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    AutoStart,
    Kickoff,
    Splash,
}

/// Pure system that turns lifecycle events and elapsed time into session commands.
#[derive(Debug)]
pub struct Session {
    config: Config,
    timers: Timers<Task>,
    auto_start: Option<TimerToken>,
    reset_pending: bool,
    idle_reset_issued: bool,
}

impl Session {
    /// Creates the session system, arming the demo auto-start when configured.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut session = Self {
            config,
            timers: Timers::new(),
            auto_start: None,
            reset_pending: false,
            idle_reset_issued: false,
        };
        if config.auto_start_on_boot {
            session.arm_auto_start();
        }
        session
    }

    /// Consumes world events and the session snapshot to emit lifecycle commands.
    ///
    /// Pending timers are cancelled as soon as a start, reset or collision is
    /// observed, before the batch's elapsed time is applied.
    pub fn handle(&mut self, events: &[Event], session: &SessionSnapshot, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        let mut lifecycle = Vec::new();
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::SessionStarted { .. }
                | Event::SessionReset { .. }
                | Event::GameOver { .. } => lifecycle.push(*event),
                _ => {}
            }
        }

        if !lifecycle.is_empty() {
            let _ = self.timers.cancel_all();
        }

        let mut fired = Vec::new();
        self.timers.advance(elapsed, &mut fired);

        for event in lifecycle {
            self.observe(event);
        }

        for task in fired {
            self.run(task, session, out);
        }

        self.check_idle(session, out);
    }

    /// Reports whether a demo auto-start is armed.
    #[must_use]
    pub fn auto_start_armed(&self) -> bool {
        self.auto_start.is_some_and(|token| self.timers.is_pending(token))
    }

    /// Reports whether a crashed demo is waiting for its splash reset.
    #[must_use]
    pub const fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    fn observe(&mut self, event: Event) {
        match event {
            Event::SessionStarted { mode } => {
                self.reset_pending = false;
                self.idle_reset_issued = false;
                if mode == PlayMode::Demo {
                    let _ = self.timers.schedule(self.config.demo_kickoff, Task::Kickoff);
                }
            }
            Event::GameOver { mode, score } => {
                if mode == PlayMode::Demo && !self.reset_pending {
                    self.reset_pending = true;
                    info!(score, "demo crashed; returning to the start screen");
                    let _ = self.timers.schedule(self.config.splash_delay, Task::Splash);
                }
            }
            Event::SessionReset { mode, .. } => {
                self.reset_pending = false;
                self.idle_reset_issued = false;
                if mode == PlayMode::Demo {
                    self.arm_auto_start();
                }
            }
            _ => {}
        }
    }

    fn run(&mut self, task: Task, session: &SessionSnapshot, out: &mut Vec<Command>) {
        match task {
            Task::AutoStart => {
                if session.phase == SessionPhase::NotStarted {
                    info!("starting the demo");
                    out.push(Command::StartSession {
                        mode: PlayMode::Demo,
                    });
                }
            }
            Task::Kickoff => {
                if session.is_demo_in_play() {
                    out.push(Command::Move {
                        direction: Direction::Forward,
                    });
                }
            }
            Task::Splash => {
                if session.phase == SessionPhase::GameOver {
                    out.push(Command::ResetSession {
                        cause: ResetCause::DemoSplash,
                    });
                }
            }
        }
    }

    fn check_idle(&mut self, session: &SessionSnapshot, out: &mut Vec<Command>) {
        if self.idle_reset_issued || !session.is_demo_in_play() || !session.is_idle() {
            return;
        }
        if session.idle_for() <= self.config.idle_timeout {
            return;
        }
        self.idle_reset_issued = true;
        info!(idle = ?session.idle_for(), "demo idle; returning to the start screen");
        out.push(Command::ResetSession {
            cause: ResetCause::IdleTimeout,
        });
    }

    fn arm_auto_start(&mut self) {
        self.auto_start = Some(
            self.timers
                .schedule(self.config.auto_start_delay, Task::AutoStart),
        );
    }
}
