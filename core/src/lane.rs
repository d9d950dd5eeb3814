//! Lane model shared by the world, systems and presentation adapters.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};

/// One row of the board, perpendicular to the direction of travel.
#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    index: u32,
    kind: LaneKind,
}

impl Lane {
    /// Creates a lane at the provided index.
    #[must_use]
    pub const fn new(index: u32, kind: LaneKind) -> Self {
        Self { index, kind }
    }

    /// Zero-based index of the lane on the board.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Content of the lane.
    #[must_use]
    pub const fn kind(&self) -> &LaneKind {
        &self.kind
    }

    /// Reports whether the avatar may not stand on the provided column.
    ///
    /// Only forest lanes block movement, and only on the obstacle pillar or
    /// on a tree. Every legality check in the engine goes through here.
    #[must_use]
    pub fn is_column_blocked(&self, column: u32) -> bool {
        match &self.kind {
            LaneKind::Forest(forest) => {
                forest
                    .obstacle
                    .map_or(false, |obstacle| obstacle.pillar_column == column)
                    || forest.occupied.contains(&column)
            }
            LaneKind::Field | LaneKind::Road(_) => false,
        }
    }

    /// Vehicles travelling along the lane; empty for fields and forests.
    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        match &self.kind {
            LaneKind::Road(road) => &road.vehicles,
            LaneKind::Field | LaneKind::Forest(_) => &[],
        }
    }

    /// Moves every vehicle on the lane forward in time.
    ///
    /// `speed_scale` converts lane speed into world units per millisecond and
    /// `half_board` is half the board width in world units.
    pub fn advance_traffic(&mut self, dt: Duration, speed_scale: f32, half_board: f32) {
        if let LaneKind::Road(road) = &mut self.kind {
            road.advance(dt, speed_scale, half_board);
        }
    }
}

/// Tagged content of a lane.
#[derive(Clone, Debug, PartialEq)]
pub enum LaneKind {
    /// Open grass with nothing on it.
    Field,
    /// Grass with trees and possibly an obstacle board.
    Forest(Forest),
    /// Asphalt carrying a single kind of vehicle.
    Road(Road),
}

/// Static obstacles placed on a forest lane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Forest {
    occupied: BTreeSet<u32>,
    reserved: BTreeSet<u32>,
    obstacle: Option<Obstacle>,
}

impl Forest {
    /// Creates a forest from explicit blocked columns and an optional obstacle.
    ///
    /// Hand-authored forests carry no placement reservation.
    #[must_use]
    pub fn new(occupied: impl IntoIterator<Item = u32>, obstacle: Option<Obstacle>) -> Self {
        let mut occupied: BTreeSet<u32> = occupied.into_iter().collect();
        if let Some(obstacle) = obstacle {
            let _ = occupied.insert(obstacle.pillar_column);
        }
        Self {
            occupied,
            reserved: BTreeSet::new(),
            obstacle,
        }
    }

    /// Creates a forest around an obstacle board, reserving the pillar and its
    /// neighbours (clamped to the board) so that no tree is planted there.
    #[must_use]
    pub fn around_obstacle(obstacle: Obstacle, columns: u32) -> Self {
        let pillar = obstacle.pillar_column;
        let mut reserved = BTreeSet::from([pillar]);
        if let Some(left) = pillar.checked_sub(1) {
            let _ = reserved.insert(left);
        }
        if pillar.saturating_add(1) < columns {
            let _ = reserved.insert(pillar + 1);
        }
        Self {
            occupied: BTreeSet::from([pillar]),
            reserved,
            obstacle: Some(obstacle),
        }
    }

    /// Reports whether a tree may be planted on the provided column.
    #[must_use]
    pub fn accepts_tree(&self, column: u32) -> bool {
        !self.occupied.contains(&column) && !self.reserved.contains(&column)
    }

    /// Plants a tree, blocking the column for movement.
    pub fn plant_tree(&mut self, column: u32) {
        let _ = self.occupied.insert(column);
    }

    /// Columns blocked by trees or the obstacle pillar.
    #[must_use]
    pub fn occupied(&self) -> &BTreeSet<u32> {
        &self.occupied
    }

    /// Columns kept free of trees around the obstacle pillar.
    #[must_use]
    pub fn reserved(&self) -> &BTreeSet<u32> {
        &self.reserved
    }

    /// Obstacle board standing on the lane, if any.
    #[must_use]
    pub const fn obstacle(&self) -> Option<Obstacle> {
        self.obstacle
    }

    /// Columns holding a tree, excluding the obstacle pillar.
    pub fn trees(&self) -> impl Iterator<Item = u32> + '_ {
        let pillar = self.obstacle.map(|obstacle| obstacle.pillar_column);
        self.occupied
            .iter()
            .copied()
            .filter(move |column| Some(*column) != pillar)
    }
}

/// Obstacle board standing on a single pillar column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Obstacle {
    /// Column blocked by the pillar.
    pub pillar_column: u32,
    /// Whether the avatar may pass under the board beside the pillar.
    pub can_pass_under: bool,
}

impl Obstacle {
    /// Creates an obstacle board whose wide panel can be passed under.
    #[must_use]
    pub const fn new(pillar_column: u32) -> Self {
        Self {
            pillar_column,
            can_pass_under: true,
        }
    }
}

/// Kind of vehicle travelling along a road lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    /// Short, shallow vehicle.
    Car,
    /// Long, deep vehicle.
    Truck,
}

/// Direction vehicles travel along a road lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    /// Toward decreasing lateral offsets.
    West,
    /// Toward increasing lateral offsets.
    East,
}

/// Moving traffic on a road lane.
#[derive(Clone, Debug, PartialEq)]
pub struct Road {
    vehicle: VehicleKind,
    heading: Heading,
    speed: f32,
    vehicles: Vec<Vehicle>,
}

impl Road {
    /// Creates a road lane carrying the provided vehicles.
    #[must_use]
    pub fn new(vehicle: VehicleKind, heading: Heading, speed: f32, vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicle,
            heading,
            speed,
            vehicles,
        }
    }

    /// Kind of vehicle using the lane.
    #[must_use]
    pub const fn vehicle_kind(&self) -> VehicleKind {
        self.vehicle
    }

    /// Direction of travel.
    #[must_use]
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    /// Lane speed factor.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Vehicles in placement order.
    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    fn advance(&mut self, dt: Duration, speed_scale: f32, half_board: f32) {
        let distance = self.speed * speed_scale * dt.as_secs_f32() * 1_000.0;
        for vehicle in &mut self.vehicles {
            vehicle.advance(self.heading, distance, half_board);
        }
    }
}

/// Single vehicle on a road lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vehicle {
    offset: f32,
    width: f32,
    depth: f32,
}

impl Vehicle {
    /// Creates a vehicle centred on the provided lateral offset.
    #[must_use]
    pub const fn new(offset: f32, width: f32, depth: f32) -> Self {
        Self {
            offset,
            width,
            depth,
        }
    }

    /// Lateral centre of the vehicle in world units.
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    /// Extent along the lane axis in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Extent across the lane axis in world units.
    #[must_use]
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Moves the vehicle by `distance`, wrapping once it leaves the board by
    /// twice its own width.
    pub fn advance(&mut self, heading: Heading, distance: f32, half_board: f32) {
        let bound = half_board + self.width * 2.0;
        self.offset = match heading {
            Heading::West if self.offset < -bound => bound,
            Heading::West => self.offset - distance,
            Heading::East if self.offset > bound => -bound,
            Heading::East => self.offset + distance,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_forest_lanes_block_columns() {
        let field = Lane::new(0, LaneKind::Field);
        let road = Lane::new(
            1,
            LaneKind::Road(Road::new(VehicleKind::Car, Heading::East, 2.0, Vec::new())),
        );
        let forest = Lane::new(2, LaneKind::Forest(Forest::new([3, 9], None)));

        for column in 0..17 {
            assert!(!field.is_column_blocked(column));
            assert!(!road.is_column_blocked(column));
        }
        assert!(forest.is_column_blocked(3));
        assert!(forest.is_column_blocked(9));
        assert!(!forest.is_column_blocked(4));
    }

    #[test]
    fn obstacle_reservation_does_not_block_movement() {
        let forest = Forest::around_obstacle(Obstacle::new(8), 17);
        let lane = Lane::new(5, LaneKind::Forest(forest.clone()));

        assert!(lane.is_column_blocked(8));
        assert!(!lane.is_column_blocked(7));
        assert!(!lane.is_column_blocked(9));
        assert!(!forest.accepts_tree(7));
        assert!(!forest.accepts_tree(9));
        assert!(forest.accepts_tree(10));
    }

    #[test]
    fn obstacle_reservation_is_clamped_to_board() {
        let left_edge = Forest::around_obstacle(Obstacle::new(0), 17);
        assert_eq!(left_edge.reserved().iter().copied().collect::<Vec<_>>(), vec![0, 1]);

        let right_edge = Forest::around_obstacle(Obstacle::new(16), 17);
        assert_eq!(right_edge.reserved().iter().copied().collect::<Vec<_>>(), vec![15, 16]);
    }

    #[test]
    fn trees_exclude_the_pillar() {
        let mut forest = Forest::around_obstacle(Obstacle::new(4), 17);
        forest.plant_tree(11);
        forest.plant_tree(0);
        assert_eq!(forest.trees().collect::<Vec<_>>(), vec![0, 11]);
    }

    #[test]
    fn vehicles_wrap_past_the_bound() {
        let mut westbound = Vehicle::new(-400.0, 100.0, 30.0);
        westbound.advance(Heading::West, 10.0, 190.0);
        assert_eq!(westbound.offset(), 390.0);

        let mut eastbound = Vehicle::new(0.0, 100.0, 30.0);
        eastbound.advance(Heading::East, 10.0, 190.0);
        assert_eq!(eastbound.offset(), 10.0);
    }

    #[test]
    fn traffic_advances_with_lane_speed() {
        let vehicles = vec![Vehicle::new(0.0, 120.0, 30.0)];
        let mut lane = Lane::new(
            3,
            LaneKind::Road(Road::new(VehicleKind::Car, Heading::West, 2.0, vehicles)),
        );
        lane.advance_traffic(Duration::from_millis(100), 0.1, 714.0);
        let offset = lane.vehicles()[0].offset();
        assert!((offset + 20.0).abs() < 1e-3, "unexpected offset {offset}");
    }
}
