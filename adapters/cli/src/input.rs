//! Translation of host key presses into world commands.

use anyhow::{bail, Result};
use crossing_core::{Command, Direction, PlayMode, ResetCause};

/// Single action requested by the person at the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HostInput {
    /// Hop in the provided direction.
    Move(Direction),
    /// Leave the start screen and play by hand.
    Start,
    /// Return to the start screen.
    Reset,
}

impl HostInput {
    /// Command submitted to the world for this input.
    pub(crate) const fn command(self) -> Command {
        match self {
            Self::Move(direction) => Command::Move { direction },
            Self::Start => Command::StartSession {
                mode: PlayMode::Manual,
            },
            Self::Reset => Command::ResetSession {
                cause: ResetCause::Manual,
            },
        }
    }
}

/// Maps a key name or legacy key code onto a direction.
///
/// Letters are matched case-insensitively, including the Cyrillic keys that
/// share a physical position with W, A, S and D.
pub(crate) fn direction_for_key(key: &str) -> Option<Direction> {
    let direction = match key.to_lowercase().as_str() {
        "w" | "ц" | "arrowup" | "up" | "38" => Direction::Forward,
        "s" | "ы" | "arrowdown" | "down" | "40" => Direction::Backward,
        "a" | "ф" | "arrowleft" | "left" | "37" => Direction::Left,
        "d" | "в" | "arrowright" | "right" | "39" => Direction::Right,
        _ => return None,
    };
    Some(direction)
}

/// Parses a whitespace separated key script such as `"start w w a d"`.
pub(crate) fn parse_script(script: &str) -> Result<Vec<HostInput>> {
    script
        .split_whitespace()
        .map(|token| match token.to_lowercase().as_str() {
            "start" | "enter" | "space" => Ok(HostInput::Start),
            "reset" | "r" => Ok(HostInput::Reset),
            _ => match direction_for_key(token) {
                Some(direction) => Ok(HostInput::Move(direction)),
                None => bail!("unrecognised key {token:?}"),
            },
        })
        .collect()
}
