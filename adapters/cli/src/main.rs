#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless Lane Crossing session.

mod input;
mod simulation;

use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use crossing_core::{Command, GameConfig, PlayMode};
use crossing_rendering::{Presenter, TextPresenter, Viewport};
use crossing_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{input::parse_script, simulation::Simulation};

/// How the session begins once the board is ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LaunchMode {
    /// Wait on the start screen; the demo starts itself after the boot delay.
    Attract,
    /// Start the demo immediately.
    Demo,
    /// Start a hand-played session immediately.
    Manual,
}

/// Command-line arguments for the headless host.
#[derive(Debug, Parser)]
#[command(name = "crossing", about = "Runs Lane Crossing without a window.")]
struct Args {
    /// TOML file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for board generation and the autopilot.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 1_800)]
    frames: u32,
    /// Simulated duration of a single frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_millis: u64,
    /// How the session begins.
    #[arg(long, value_enum, default_value_t = LaunchMode::Attract)]
    mode: LaunchMode,
    /// Whitespace separated key presses, e.g. "start w w a d".
    #[arg(long, default_value = "")]
    keys: String,
    /// Frames between two scripted key presses.
    #[arg(long, default_value_t = 15)]
    key_interval: u32,
    /// Draws every Nth frame as text.
    #[arg(long)]
    render_every: Option<u32>,
}

/// Entry point for the Lane Crossing command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    ensure!(args.key_interval > 0, "--key-interval must be at least 1");

    let mut config = load_config(args.config.as_deref())?;
    if args.mode != LaunchMode::Attract {
        config.session.auto_start_on_boot = false;
    }
    config.validate().context("invalid configuration")?;

    let mut keys = parse_script(&args.keys)?.into_iter();
    let mut simulation = Simulation::new(config, args.seed);
    println!("{}", query::welcome_banner(simulation.world()));

    match args.mode {
        LaunchMode::Attract => {}
        LaunchMode::Demo => simulation.submit(Command::StartSession {
            mode: PlayMode::Demo,
        }),
        LaunchMode::Manual => simulation.submit(Command::StartSession {
            mode: PlayMode::Manual,
        }),
    }

    let dt = Duration::from_millis(args.frame_millis);
    let mut presenter = TextPresenter::new(io::stdout());
    for frame in 0..args.frames {
        let input = if (frame + 1) % args.key_interval == 0 {
            keys.next()
        } else {
            None
        };
        simulation.frame(dt, input);

        if let Some(every) = args.render_every.filter(|every| *every > 0) {
            if frame % every == 0 {
                let scene = simulation
                    .scene(Viewport::default())
                    .context("failed to capture scene")?;
                presenter.present(&scene)?;
            }
        }
    }

    for crash in simulation.crashes() {
        info!(score = crash.score, mode = ?crash.mode, reward = %crash.reward_code(), "game over");
    }
    let session = query::session(simulation.world());
    info!(
        events = simulation.events().len(),
        phase = ?session.phase,
        mode = ?session.mode,
        "simulation finished"
    );

    println!("score: {}", query::score(simulation.world()));
    if let Some(crash) = simulation.crashes().last() {
        println!("reward code: {}", crash.reward_code());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
