//! Tuning knobs for every adjustable aspect of the simulation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{lane::VehicleKind, TrafficDensity};

/// Aggregated tuning knobs, grouped by the subsystem that consumes them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board dimensions and lane generation.
    pub board: BoardTuning,
    /// Vehicle sizes, counts and speeds.
    pub traffic: TrafficTuning,
    /// Step animation and the avatar's collision footprint.
    pub motion: MotionTuning,
    /// Lifecycle timers.
    pub session: SessionTuning,
    /// Autonomous play pacing.
    pub autopilot: AutopilotTuning,
}

impl GameConfig {
    /// Checks that every knob holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let board = &self.board;
        if board.columns == 0 {
            return Err(ConfigError::NoColumns);
        }
        if !(board.cell_width > 0.0) {
            return Err(ConfigError::CellWidth(board.cell_width));
        }
        if board.initial_lanes < 2 {
            return Err(ConfigError::TooFewInitialLanes(board.initial_lanes));
        }
        if !(0.0..=1.0).contains(&board.obstacle_probability) {
            return Err(ConfigError::Probability(board.obstacle_probability));
        }
        if board.lane_weights.total() == 0 {
            return Err(ConfigError::NoLaneWeights);
        }
        if self.traffic.lane_speeds.is_empty() {
            return Err(ConfigError::NoLaneSpeeds);
        }
        if self.motion.step_millis == 0 {
            return Err(ConfigError::ZeroStepDuration);
        }
        let autopilot = &self.autopilot;
        if autopilot.decision_min_millis > autopilot.decision_max_millis {
            return Err(ConfigError::DelayRange("autopilot.decision"));
        }
        if autopilot.stalled_min_millis > autopilot.stalled_max_millis {
            return Err(ConfigError::DelayRange("autopilot.stalled"));
        }
        Ok(())
    }
}

/// Reasons a configuration is refused.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The board must have at least one column.
    #[error("board.columns must be at least 1")]
    NoColumns,
    /// Cells need a positive width.
    #[error("board.cell_width must be positive, got {0}")]
    CellWidth(f32),
    /// The board must start with a lane to stand on and a lane ahead.
    #[error("board.initial_lanes must be at least 2, got {0}")]
    TooFewInitialLanes(u32),
    /// Probabilities live in `0.0..=1.0`.
    #[error("board.obstacle_probability must lie in 0..=1, got {0}")]
    Probability(f64),
    /// At least one lane kind needs a positive weight.
    #[error("board.lane_weights must not all be zero")]
    NoLaneWeights,
    /// Roads need at least one speed to draw from.
    #[error("traffic.lane_speeds must not be empty")]
    NoLaneSpeeds,
    /// Steps need a positive duration.
    #[error("motion.step_millis must be positive")]
    ZeroStepDuration,
    /// A delay range has its bounds swapped.
    #[error("{0} minimum exceeds its maximum")]
    DelayRange(&'static str),
}

/// Board dimensions and lane generation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardTuning {
    /// Number of columns in every lane.
    pub columns: u32,
    /// Side length of a single cell in world units.
    pub cell_width: f32,
    /// Number of lanes generated when a board is prepared.
    pub initial_lanes: u32,
    /// Relative odds of each generated lane kind beyond lane zero.
    pub lane_weights: LaneWeights,
    /// Chance that a forest lane carries an obstacle board.
    pub obstacle_probability: f64,
    /// Lowest lane index allowed to carry an obstacle board.
    pub obstacle_min_lane: u32,
    /// Trees planted on a forest lane without an obstacle board.
    pub trees_per_forest: u32,
    /// Trees planted on a forest lane that carries an obstacle board.
    pub trees_beside_obstacle: u32,
    /// Random draws attempted before a tree falls back to a linear scan.
    pub placement_attempts: u32,
}

impl BoardTuning {
    /// Half of the board width in world units.
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.columns as f32 * self.cell_width / 2.0
    }

    /// Lateral offset of a column centre in world units.
    #[must_use]
    pub fn column_center(&self, column: u32) -> f32 {
        column as f32 * self.cell_width + self.cell_width / 2.0 - self.half_width()
    }

    /// Column in which the avatar starts every session.
    #[must_use]
    pub const fn start_column(&self) -> u32 {
        self.columns / 2
    }
}

impl Default for BoardTuning {
    fn default() -> Self {
        Self {
            columns: 17,
            cell_width: 84.0,
            initial_lanes: 10,
            lane_weights: LaneWeights::default(),
            obstacle_probability: 0.3,
            obstacle_min_lane: 3,
            trees_per_forest: 4,
            trees_beside_obstacle: 3,
            placement_attempts: 100,
        }
    }
}

/// Relative odds of each generated lane kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaneWeights {
    /// Weight of roads carrying cars.
    pub car: u32,
    /// Weight of roads carrying trucks.
    pub truck: u32,
    /// Weight of forest lanes.
    pub forest: u32,
}

impl LaneWeights {
    /// Sum of all weights.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.car.saturating_add(self.truck).saturating_add(self.forest)
    }
}

impl Default for LaneWeights {
    fn default() -> Self {
        Self {
            car: 1,
            truck: 1,
            forest: 1,
        }
    }
}

/// Vehicle sizes, counts and speeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrafficTuning {
    /// Speed factors a road lane draws from.
    pub lane_speeds: Vec<f32>,
    /// World units travelled per millisecond for each unit of lane speed.
    pub speed_scale: f32,
    /// Car dimensions and placement.
    pub car: VehicleProfile,
    /// Truck dimensions and placement.
    pub truck: VehicleProfile,
}

impl TrafficTuning {
    /// Returns the profile describing the provided vehicle kind.
    #[must_use]
    pub const fn profile(&self, kind: VehicleKind) -> &VehicleProfile {
        match kind {
            VehicleKind::Car => &self.car,
            VehicleKind::Truck => &self.truck,
        }
    }
}

impl Default for TrafficTuning {
    fn default() -> Self {
        Self {
            lane_speeds: vec![2.0, 2.5, 3.0],
            speed_scale: 0.1,
            car: VehicleProfile {
                width: 120.0,
                depth: 30.0,
                slot_span: 2,
                count: 3,
                sparse_count: 1,
            },
            truck: VehicleProfile {
                width: 210.0,
                depth: 80.0,
                slot_span: 3,
                count: 2,
                sparse_count: 1,
            },
        }
    }
}

/// Size and placement rules for one vehicle kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleProfile {
    /// Extent along the lane axis in world units.
    pub width: f32,
    /// Extent across the lane axis in world units.
    pub depth: f32,
    /// Columns spanned by one placement slot.
    pub slot_span: u32,
    /// Vehicles per lane at regular density.
    pub count: u32,
    /// Vehicles per lane at sparse density.
    pub sparse_count: u32,
}

impl VehicleProfile {
    /// Vehicles placed on a lane generated at the provided density.
    #[must_use]
    pub const fn count_for(&self, density: TrafficDensity) -> u32 {
        match density {
            TrafficDensity::Regular => self.count,
            TrafficDensity::Sparse => self.sparse_count,
        }
    }
}

/// Step animation and collision footprint of the avatar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionTuning {
    /// Duration of a single hop in milliseconds.
    pub step_millis: u64,
    /// Peak hop elevation in world units.
    pub hop_amplitude: f32,
    /// Exponent shaping the hop; small values rise fast and fall slowly.
    pub hop_exponent: f32,
    /// Half of the avatar's lateral extent in world units.
    pub player_half_width: f32,
    /// Half of the avatar's depth extent in world units.
    pub player_half_depth: f32,
}

impl MotionTuning {
    /// Duration of a single hop.
    #[must_use]
    pub const fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_millis)
    }
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            step_millis: 200,
            hop_amplitude: 16.0,
            hop_exponent: 0.1,
            player_half_width: 15.0,
            player_half_depth: 20.0,
        }
    }
}

/// Lifecycle timers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionTuning {
    /// Stillness tolerated during a demo before returning to the start screen.
    pub idle_timeout_millis: u64,
    /// Delay before the start screen launches a demo on its own.
    pub auto_start_delay_millis: u64,
    /// Delay between a demo start and its first forward hop.
    pub demo_kickoff_millis: u64,
    /// Delay between a demo collision and the return to the start screen.
    pub splash_delay_millis: u64,
    /// Whether the start screen shown at boot arms the demo auto-start.
    pub auto_start_on_boot: bool,
}

impl SessionTuning {
    /// Stillness tolerated during a demo.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_millis)
    }

    /// Delay before the demo launches from the start screen.
    #[must_use]
    pub const fn auto_start_delay(&self) -> Duration {
        Duration::from_millis(self.auto_start_delay_millis)
    }

    /// Delay before the demo's first hop.
    #[must_use]
    pub const fn demo_kickoff(&self) -> Duration {
        Duration::from_millis(self.demo_kickoff_millis)
    }

    /// Delay before a crashed demo returns to the start screen.
    #[must_use]
    pub const fn splash_delay(&self) -> Duration {
        Duration::from_millis(self.splash_delay_millis)
    }
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            idle_timeout_millis: 10_000,
            auto_start_delay_millis: 5_000,
            demo_kickoff_millis: 500,
            splash_delay_millis: 1_000,
            auto_start_on_boot: true,
        }
    }
}

/// Autonomous play pacing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutopilotTuning {
    /// Shortest delay between two decisions, in milliseconds.
    pub decision_min_millis: u64,
    /// Longest delay between two decisions, in milliseconds (exclusive).
    pub decision_max_millis: u64,
    /// Shortest delay after a decision found no legal move.
    pub stalled_min_millis: u64,
    /// Longest delay after a decision found no legal move (exclusive).
    pub stalled_max_millis: u64,
}

impl Default for AutopilotTuning {
    fn default() -> Self {
        Self {
            decision_min_millis: 1_000,
            decision_max_millis: 2_000,
            stalled_min_millis: 2_000,
            stalled_max_millis: 4_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn column_centres_are_symmetric() {
        let board = BoardTuning::default();
        assert_eq!(board.half_width(), 714.0);
        assert_eq!(board.column_center(0), -672.0);
        assert_eq!(board.column_center(16), 672.0);
        assert_eq!(board.column_center(board.start_column()), 0.0);
    }

    #[test]
    fn rejects_degenerate_boards() {
        let mut config = GameConfig::default();
        config.board.columns = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoColumns));

        let mut config = GameConfig::default();
        config.board.initial_lanes = 1;
        assert_eq!(config.validate(), Err(ConfigError::TooFewInitialLanes(1)));

        let mut config = GameConfig::default();
        config.board.lane_weights = LaneWeights {
            car: 0,
            truck: 0,
            forest: 0,
        };
        assert_eq!(config.validate(), Err(ConfigError::NoLaneWeights));
    }

    #[test]
    fn rejects_swapped_delay_ranges() {
        let mut config = GameConfig::default();
        config.autopilot.stalled_min_millis = 5_000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DelayRange("autopilot.stalled"))
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            [board]
            columns = 9

            [session]
            idle_timeout_millis = 3000
            "#,
        )
        .expect("parse config");

        assert_eq!(config.board.columns, 9);
        assert_eq!(config.board.initial_lanes, 10);
        assert_eq!(config.session.idle_timeout(), Duration::from_secs(3));
        assert_eq!(config.traffic, TrafficTuning::default());
    }

    #[test]
    fn unknown_keys_are_refused() {
        let parsed: Result<GameConfig, _> = toml::from_str("[board]\nrows = 4\n");
        assert!(parsed.is_err());
    }
}
