//! Append-only collection of lanes owned by the world.

use std::time::Duration;

use crossing_core::{BoardView, GameConfig, Lane, LaneKind, TrafficDensity};

use crate::generation::LaneGenerator;

#[derive(Clone, Debug)]
pub(crate) struct Board {
    lanes: Vec<Lane>,
    columns: u32,
}

impl Board {
    /// Generates lanes `0..count` with lane zero forced to a field.
    pub(crate) fn generate(
        generator: &mut LaneGenerator,
        count: u32,
        density: TrafficDensity,
        config: &GameConfig,
    ) -> Self {
        let lanes = (0..count)
            .map(|index| generator.lane(index, density, config))
            .collect();
        Self {
            lanes,
            columns: config.board.columns,
        }
    }

    /// Builds a board from hand-authored lane kinds, indexing them in order.
    pub(crate) fn from_kinds(kinds: Vec<LaneKind>, columns: u32) -> Self {
        let lanes = kinds
            .into_iter()
            .enumerate()
            .map(|(index, kind)| {
                let index = u32::try_from(index).unwrap_or(u32::MAX);
                if index == 0 {
                    Lane::new(0, LaneKind::Field)
                } else {
                    Lane::new(index, kind)
                }
            })
            .collect();
        Self { lanes, columns }
    }

    /// Appends exactly one lane at the frontier and returns its index.
    pub(crate) fn append_lane(
        &mut self,
        generator: &mut LaneGenerator,
        density: TrafficDensity,
        config: &GameConfig,
    ) -> u32 {
        let index = self.len();
        self.lanes.push(generator.lane(index, density, config));
        index
    }

    /// Appends lanes until `index` exists.
    pub(crate) fn materialize_through(
        &mut self,
        index: u32,
        generator: &mut LaneGenerator,
        density: TrafficDensity,
        config: &GameConfig,
    ) {
        while self.len() <= index {
            let _ = self.append_lane(generator, density, config);
        }
    }

    pub(crate) fn lane(&self, index: u32) -> Option<&Lane> {
        self.lanes.get(usize::try_from(index).ok()?)
    }

    pub(crate) fn len(&self) -> u32 {
        u32::try_from(self.lanes.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.lanes, self.columns)
    }

    pub(crate) fn advance_traffic(&mut self, dt: Duration, config: &GameConfig) {
        let half_board = config.board.half_width();
        let speed_scale = config.traffic.speed_scale;
        for lane in &mut self.lanes {
            lane.advance_traffic(dt, speed_scale, half_board);
        }
    }
}
