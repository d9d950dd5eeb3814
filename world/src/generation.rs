//! Procedural lane generation.

use crossing_core::{
    Forest, GameConfig, Heading, Lane, LaneKind, Obstacle, Road, TrafficDensity, Vehicle,
    VehicleKind,
};
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::{index::sample as sample_slots, SliceRandom},
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

const FALLBACK_LANE_SPEED: f32 = 2.0;

/// Seeded source of new lanes.
#[derive(Clone, Debug)]
pub(crate) struct LaneGenerator {
    rng: ChaCha8Rng,
    kinds: Option<WeightedIndex<u32>>,
}

/// Lane kinds sampled beyond lane zero, in weight-table order.
#[derive(Clone, Copy, Debug)]
enum Draw {
    Road(VehicleKind),
    Forest,
}

const DRAWS: [Draw; 3] = [
    Draw::Road(VehicleKind::Car),
    Draw::Road(VehicleKind::Truck),
    Draw::Forest,
];

/// Folds an untrusted probability into `0..=1`; NaN never lands.
fn coin_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

impl LaneGenerator {
    pub(crate) fn new(seed: u64, config: &GameConfig) -> Self {
        let weights = config.board.lane_weights;
        let kinds = WeightedIndex::new([weights.car, weights.truck, weights.forest]).ok();
        if kinds.is_none() {
            warn!("lane weights are all zero; generating open fields only");
        }
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            kinds,
        }
    }

    /// Generates the lane at `index`. Lane zero is always a field.
    pub(crate) fn lane(&mut self, index: u32, density: TrafficDensity, config: &GameConfig) -> Lane {
        if index == 0 {
            return Lane::new(0, LaneKind::Field);
        }

        let Some(kinds) = &self.kinds else {
            return Lane::new(index, LaneKind::Field);
        };

        let kind = match DRAWS[kinds.sample(&mut self.rng)] {
            Draw::Road(vehicle) => LaneKind::Road(self.road(vehicle, density, config)),
            Draw::Forest => LaneKind::Forest(self.forest(index, config)),
        };
        Lane::new(index, kind)
    }

    fn forest(&mut self, index: u32, config: &GameConfig) -> Forest {
        let board = &config.board;
        let columns = board.columns;
        let with_obstacle = index >= board.obstacle_min_lane
            && columns > 0
            && self.rng.gen_bool(coin_probability(board.obstacle_probability));

        let mut forest = if with_obstacle {
            let pillar = self.rng.gen_range(0..columns);
            Forest::around_obstacle(Obstacle::new(pillar), columns)
        } else {
            Forest::default()
        };

        let trees = if with_obstacle {
            board.trees_beside_obstacle
        } else {
            board.trees_per_forest
        };

        for _ in 0..trees {
            let free = place_in_free_column(&mut self.rng, columns, board.placement_attempts, |column| {
                forest.accepts_tree(column)
            });
            match free {
                Some(column) => forest.plant_tree(column),
                None => warn!(lane = index, columns, "no free column left; tree omitted"),
            }
        }

        forest
    }

    fn road(&mut self, vehicle: VehicleKind, density: TrafficDensity, config: &GameConfig) -> Road {
        let heading = if self.rng.gen_bool(0.5) {
            Heading::West
        } else {
            Heading::East
        };

        let profile = config.traffic.profile(vehicle);
        let slot_span = profile.slot_span.max(1);
        let slots = config.board.columns.div_ceil(slot_span);
        let count = profile.count_for(density).min(slots);
        let vehicles = sample_slots(&mut self.rng, slots as usize, count as usize)
            .iter()
            .map(|slot| {
                let column = slot as u32 * slot_span;
                Vehicle::new(
                    config.board.column_center(column),
                    profile.width,
                    profile.depth,
                )
            })
            .collect();

        let speed = config
            .traffic
            .lane_speeds
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_LANE_SPEED);

        Road::new(vehicle, heading, speed, vehicles)
    }
}

/// Draws a column accepted by `is_free`.
///
/// After `attempts` rejected random draws the first free column is taken by
/// linear scan; `None` means every column is taken.
pub(crate) fn place_in_free_column<R, F>(
    rng: &mut R,
    columns: u32,
    attempts: u32,
    is_free: F,
) -> Option<u32>
where
    R: Rng + ?Sized,
    F: Fn(u32) -> bool,
{
    if columns == 0 {
        return None;
    }

    for _ in 0..attempts {
        let column = rng.gen_range(0..columns);
        if is_free(column) {
            return Some(column);
        }
    }

    debug!(attempts, "random placement exhausted; scanning for a free column");
    (0..columns).find(|column| is_free(*column))
}
