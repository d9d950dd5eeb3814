//! Axis-aligned overlap tests between the avatar and traffic.

use crossing_core::Lane;

/// Axis-aligned box spanning a lateral interval and a depth interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    /// Lateral centre in world units.
    pub lateral: f32,
    /// Depth centre in world units.
    pub depth: f32,
    /// Half extent along the lateral axis.
    pub half_width: f32,
    /// Half extent along the depth axis.
    pub half_depth: f32,
}

impl Hitbox {
    /// Creates a hitbox centred on the provided coordinates.
    #[must_use]
    pub const fn new(lateral: f32, depth: f32, half_width: f32, half_depth: f32) -> Self {
        Self {
            lateral,
            depth,
            half_width,
            half_depth,
        }
    }

    /// Reports whether both the lateral and the depth intervals overlap.
    ///
    /// Touching edges do not count as a hit.
    #[must_use]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        let lateral = (self.lateral - other.lateral).abs() < self.half_width + other.half_width;
        let depth = (self.depth - other.depth).abs() < self.half_depth + other.half_depth;
        lateral && depth
    }
}

/// Index of the first vehicle on `lane` overlapping the avatar, if any.
///
/// Vehicles ride at depth zero; fields and forests never hit.
#[must_use]
pub fn first_hit(avatar: &Hitbox, lane: &Lane) -> Option<usize> {
    lane.vehicles().iter().position(|vehicle| {
        let hitbox = Hitbox::new(
            vehicle.offset(),
            0.0,
            vehicle.width() / 2.0,
            vehicle.depth() / 2.0,
        );
        avatar.overlaps(&hitbox)
    })
}
