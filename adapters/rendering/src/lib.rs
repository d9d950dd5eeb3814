#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Lane Crossing adapters.
//!
//! A [`Scene`] is captured from read-only world snapshots once per frame and
//! handed to a [`Presenter`]. Nothing here can mutate the simulation.

use std::{error::Error, fmt, io::Write};

use anyhow::Result as AnyResult;
use crossing_core::{
    BoardTuning, BoardView, Heading, Lane, LaneKind, PlayMode, PlayerPose, SessionPhase,
    SessionSnapshot, VehicleKind,
};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

const GRASS: Color = Color::from_rgb_u8(0xba, 0xf4, 0x55);
const ASPHALT: Color = Color::from_rgb_u8(0x45, 0x4a, 0x59);
const CAR: Color = Color::from_rgb_u8(0xeb, 0x0a, 0x1e);
const TRUCK: Color = Color::from_rgb_u8(0xb4, 0xc6, 0xfc);
const AVATAR: Color = Color::from_rgb_u8(0xff, 0xff, 0xff);

/// Surface drawn for a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Open grass.
    Field,
    /// Grass with trees and possibly an obstacle board.
    Forest,
    /// Asphalt carrying traffic.
    Road,
}

/// Vehicle positioned in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehiclePresentation {
    /// Kind of vehicle.
    pub kind: VehicleKind,
    /// Centre of the vehicle; `x` is lateral and `y` runs forward.
    pub center: Vec2,
    /// Width along the lane and depth across it.
    pub size: Vec2,
    /// Body color.
    pub color: Color,
}

/// Single lane of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct LanePresentation {
    /// Index of the lane on the board.
    pub index: u32,
    /// Surface drawn for the lane.
    pub surface: Surface,
    /// Ground color; every other grass lane is drawn slightly lighter.
    pub color: Color,
    /// Columns holding a tree.
    pub trees: Vec<u32>,
    /// Column holding the obstacle board pillar.
    pub pillar: Option<u32>,
    /// Direction traffic flows on a road.
    pub heading: Option<Heading>,
    /// Vehicles travelling along the lane.
    pub vehicles: Vec<VehiclePresentation>,
}

impl LanePresentation {
    fn capture(lane: &Lane, cell_width: f32) -> Self {
        let index = lane.index();
        let lane_y = index as f32 * cell_width;
        let grass = if index % 2 == 0 {
            GRASS
        } else {
            GRASS.lighten(0.15)
        };

        match lane.kind() {
            LaneKind::Field => Self {
                index,
                surface: Surface::Field,
                color: grass,
                trees: Vec::new(),
                pillar: None,
                heading: None,
                vehicles: Vec::new(),
            },
            LaneKind::Forest(forest) => Self {
                index,
                surface: Surface::Forest,
                color: grass,
                trees: forest.trees().collect(),
                pillar: forest.obstacle().map(|obstacle| obstacle.pillar_column),
                heading: None,
                vehicles: Vec::new(),
            },
            LaneKind::Road(road) => {
                let kind = road.vehicle_kind();
                let color = match kind {
                    VehicleKind::Car => CAR,
                    VehicleKind::Truck => TRUCK,
                };
                let vehicles = road
                    .vehicles()
                    .iter()
                    .map(|vehicle| VehiclePresentation {
                        kind,
                        center: Vec2::new(vehicle.offset(), lane_y),
                        size: Vec2::new(vehicle.width(), vehicle.depth()),
                        color,
                    })
                    .collect();
                Self {
                    index,
                    surface: Surface::Road,
                    color: ASPHALT,
                    trees: Vec::new(),
                    pillar: None,
                    heading: Some(road.heading()),
                    vehicles,
                }
            }
        }
    }
}

/// Avatar positioned in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarPresentation {
    /// Centre on the ground plane; `x` is lateral and `y` runs forward.
    pub center: Vec2,
    /// Current hop elevation.
    pub hop: f32,
    /// Body color.
    pub color: Color,
}

/// Number of lanes captured around the avatar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    /// Lanes captured behind the avatar's settled lane.
    pub behind: u32,
    /// Lanes captured ahead of the avatar's settled lane.
    pub ahead: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            behind: 2,
            ahead: 7,
        }
    }
}

/// Scene description combining the visible lanes, the avatar and the session.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of columns in every lane.
    pub columns: u32,
    /// Width of a single column in world units.
    pub cell_width: f32,
    /// Visible lanes in ascending index order.
    pub lanes: Vec<LanePresentation>,
    /// The avatar.
    pub avatar: AvatarPresentation,
    /// Lifecycle phase of the session.
    pub phase: SessionPhase,
    /// Mode of the session.
    pub mode: PlayMode,
    /// Settled lane index reached so far.
    pub score: u32,
}

impl Scene {
    /// Captures a scene from read-only world snapshots.
    pub fn capture(
        board: BoardView<'_>,
        pose: &PlayerPose,
        session: &SessionSnapshot,
        layout: &BoardTuning,
        viewport: Viewport,
    ) -> Result<Self, RenderingError> {
        if layout.columns == 0 {
            return Err(RenderingError::NoColumns);
        }
        if layout.cell_width.is_nan() || layout.cell_width <= 0.0 {
            return Err(RenderingError::InvalidCellWidth {
                cell_width: layout.cell_width,
            });
        }

        let settled = pose.settled();
        let first = settled.lane().saturating_sub(viewport.behind);
        let last = settled.lane().saturating_add(viewport.ahead);
        let lanes = (first..=last)
            .map_while(|index| board.lane(index))
            .map(|lane| LanePresentation::capture(lane, layout.cell_width))
            .collect();

        let center = Vec2::new(
            layout.column_center(settled.column()) + pose.lateral_shift(),
            settled.lane() as f32 * layout.cell_width + pose.forward_shift(),
        );

        Ok(Self {
            columns: layout.columns,
            cell_width: layout.cell_width,
            lanes,
            avatar: AvatarPresentation {
                center,
                hop: pose.hop(),
                color: AVATAR,
            },
            phase: session.phase,
            mode: session.mode,
            score: settled.lane(),
        })
    }

    /// Half of the board width in world units.
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.columns as f32 * self.cell_width / 2.0
    }

    /// Lateral centre of a column in world units.
    #[must_use]
    pub fn column_center(&self, column: u32) -> f32 {
        -self.half_width() + self.cell_width * (column as f32 + 0.5)
    }

    /// Visible lane at the provided index.
    #[must_use]
    pub fn lane(&self, index: u32) -> Option<&LanePresentation> {
        self.lanes.iter().find(|lane| lane.index == index)
    }

    /// Lane and column the avatar is drawn on, snapped to the nearest cell.
    #[must_use]
    pub fn avatar_cell(&self) -> (u32, u32) {
        let lane = (self.avatar.center.y / self.cell_width).round().max(0.0) as u32;
        let column = ((self.avatar.center.x + self.half_width()) / self.cell_width)
            .floor()
            .clamp(0.0, self.columns.saturating_sub(1) as f32) as u32;
        (lane, column)
    }
}

/// Sink capable of presenting Lane Crossing scenes.
pub trait Presenter {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Presenter drawing scenes as plain text, farthest lane first.
#[derive(Debug)]
pub struct TextPresenter<W> {
    out: W,
    frames: u64,
}

impl<W: Write> TextPresenter<W> {
    /// Creates a presenter writing into the provided sink.
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Number of frames presented so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Consumes the presenter, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.frames += 1;
        writeln!(
            self.out,
            "frame {} | lane {} | {:?} {:?}",
            self.frames, scene.score, scene.mode, scene.phase
        )?;
        self.out.write_all(render_text(scene).as_bytes())?;
        Ok(())
    }
}

/// Draws the scene as text rows, one per lane, farthest lane first.
///
/// `.` is grass, `T` a tree, `|` an obstacle pillar, `<` or `>` asphalt
/// pointing the way traffic flows, `c` a car, `H` a truck and `@` the avatar.
#[must_use]
pub fn render_text(scene: &Scene) -> String {
    let (avatar_lane, avatar_column) = scene.avatar_cell();
    let mut text = String::new();

    for lane in scene.lanes.iter().rev() {
        for column in 0..scene.columns {
            let glyph = if lane.index == avatar_lane && column == avatar_column {
                '@'
            } else {
                glyph_at(scene, lane, column)
            };
            text.push(glyph);
        }
        text.push('\n');
    }
    text
}

fn glyph_at(scene: &Scene, lane: &LanePresentation, column: u32) -> char {
    match lane.surface {
        Surface::Field => '.',
        Surface::Forest if lane.pillar == Some(column) => '|',
        Surface::Forest if lane.trees.contains(&column) => 'T',
        Surface::Forest => '.',
        Surface::Road => {
            let center = scene.column_center(column);
            let covering = lane
                .vehicles
                .iter()
                .find(|vehicle| (vehicle.center.x - center).abs() < vehicle.size.x / 2.0);
            match covering.map(|vehicle| vehicle.kind) {
                Some(VehicleKind::Car) => 'c',
                Some(VehicleKind::Truck) => 'H',
                None => match lane.heading {
                    Some(Heading::West) => '<',
                    Some(Heading::East) | None => '>',
                },
            }
        }
    }
}

/// Errors that can occur when capturing scenes.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The board has no columns to draw.
    NoColumns,
    /// Cell width must be positive to map world units onto columns.
    InvalidCellWidth {
        /// Provided width that failed validation.
        cell_width: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColumns => write!(f, "the board has no columns"),
            Self::InvalidCellWidth { cell_width } => {
                write!(f, "cell_width must be positive (received {cell_width})")
            }
        }
    }
}

impl Error for RenderingError {}
