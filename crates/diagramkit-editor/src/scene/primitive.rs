//! Visual primitives held by a scene.
//!
//! A primitive is geometry in its own local space plus a [`Placement`]
//! mapping it into the world. Path-based shapes keep the points they were
//! built from and record a `path_offset` (the top-left of those points):
//!
//! ```text
//! world = placement.matrix() · (local − path_offset)
//! ```
//!
//! Freshly built paths are placed at `path_offset`, so their world vertices
//! equal the construction points until something moves them.

use lyon::algorithms::hit_test::hit_test_path;
use lyon::math::point;
use lyon::path::{FillRule, Path};
use serde::{Deserialize, Serialize};

use crate::geometry::{bounding_box, distance_to_segment, Bounds, Point};
use crate::transform::{Affine, Placement};

/// Minimum pick distance, in local units, for thin strokes.
const HIT_TOLERANCE: f64 = 4.0;

/// Scene-assigned handle of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(u64);

impl PrimitiveId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Paint attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    /// Dash pattern; empty for a solid stroke
    pub dash: Vec<f64>,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            dash: Vec::new(),
            opacity: 1.0,
        }
    }
}

/// How the scene lets the user interact with a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interactivity {
    /// Can become the active selection
    pub selectable: bool,
    /// Receives pointer events and takes part in hit testing
    pub evented: bool,
    /// Shows move/scale/rotate controls when active
    pub has_controls: bool,
}

impl Interactivity {
    /// Whole-shape manipulation: select, drag, scale, rotate.
    pub const INTERACTIVE: Interactivity = Interactivity {
        selectable: true,
        evented: true,
        has_controls: true,
    };

    /// Draggable marker without transform controls.
    pub const HANDLE: Interactivity = Interactivity {
        selectable: true,
        evented: true,
        has_controls: false,
    };

    /// Visible only.
    pub const INERT: Interactivity = Interactivity {
        selectable: false,
        evented: false,
        has_controls: false,
    };

    pub fn is_interactive(&self) -> bool {
        self.selectable || self.evented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Content and layout of an editable text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub underline: bool,
    pub align: TextAlign,
    /// Inline editing with a caret is active
    pub editing: bool,
    /// Selected character range while editing
    pub selection: Option<(usize, usize)>,
}

impl TextContent {
    /// Layout box estimated from character count and font size.
    ///
    /// There is no font engine behind the scene, so the width assumes an
    /// average glyph advance of 0.6 em and a line height of 1.16 em.
    pub fn approximate_size(&self) -> (f64, f64) {
        let lines: Vec<&str> = self.text.split('\n').collect();
        let longest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        (
            longest as f64 * self.font_size * 0.6,
            lines.len() as f64 * self.font_size * 1.16,
        )
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Geometry of a primitive in local space.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveShape {
    /// Closed polygon
    Polygon { points: Vec<Point> },
    /// Open path of straight segments
    Path { points: Vec<Point> },
    /// Circle centered on the local origin
    Circle { radius: f64 },
    /// Single segment, used for edge guides
    Line { from: Point, to: Point },
    /// Editable text box anchored at its top-left
    Text(TextContent),
    /// Decoded bitmap anchored at its top-left
    Image { src: String, width: f64, height: f64 },
    /// Composite; members keep their ids and are placed relative to the group
    Group { members: Vec<(PrimitiveId, Primitive)> },
}

/// A visual object the scene can render and hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: PrimitiveShape,
    pub placement: Placement,
    pub path_offset: Point,
    pub style: Style,
    pub interactivity: Interactivity,
}

impl Primitive {
    fn new(shape: PrimitiveShape, placement: Placement, path_offset: Point) -> Self {
        Self {
            shape,
            placement,
            path_offset,
            style: Style::default(),
            interactivity: Interactivity::INTERACTIVE,
        }
    }

    /// Closed polygon through `points`; `None` for fewer than three points.
    pub fn polygon(points: &[Point]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let origin = bounding_box(points)?.min();
        Some(Self::new(
            PrimitiveShape::Polygon {
                points: points.to_vec(),
            },
            Placement::at(origin.x, origin.y),
            origin,
        ))
    }

    /// Open path through `points`; `None` for fewer than two points.
    pub fn open_path(points: &[Point]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let origin = bounding_box(points)?.min();
        Some(Self::new(
            PrimitiveShape::Path {
                points: points.to_vec(),
            },
            Placement::at(origin.x, origin.y),
            origin,
        ))
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(
            PrimitiveShape::Circle { radius },
            Placement::at(center.x, center.y),
            Point::default(),
        )
    }

    pub fn line(from: Point, to: Point) -> Self {
        Self::new(
            PrimitiveShape::Line { from, to },
            Placement::default(),
            Point::default(),
        )
    }

    pub fn text(content: TextContent, left: f64, top: f64) -> Self {
        Self::new(
            PrimitiveShape::Text(content),
            Placement::at(left, top),
            Point::default(),
        )
    }

    pub fn image(src: impl Into<String>, width: f64, height: f64, placement: Placement) -> Self {
        Self::new(
            PrimitiveShape::Image {
                src: src.into(),
                width,
                height,
            },
            placement,
            Point::default(),
        )
    }

    pub fn group(members: Vec<(PrimitiveId, Primitive)>, origin: Point) -> Self {
        Self::new(
            PrimitiveShape::Group { members },
            Placement::at(origin.x, origin.y),
            Point::default(),
        )
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_interactivity(mut self, interactivity: Interactivity) -> Self {
        self.interactivity = interactivity;
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.shape, PrimitiveShape::Group { .. })
    }

    pub fn matrix(&self) -> Affine {
        self.placement.matrix()
    }

    /// World position of the placement origin; the center of a circle.
    pub fn origin(&self) -> Point {
        self.placement.origin()
    }

    pub fn local_to_world(&self, local: Point) -> Point {
        self.matrix().transform_point(local - self.path_offset)
    }

    /// `None` when the placement collapses the primitive.
    pub fn world_to_local(&self, world: Point) -> Option<Point> {
        let inverse = self.matrix().invert()?;
        Some(inverse.transform_point(world) + self.path_offset)
    }

    /// Construction points of a polygon or path.
    pub fn vertices(&self) -> Option<&[Point]> {
        match &self.shape {
            PrimitiveShape::Polygon { points } | PrimitiveShape::Path { points } => Some(points),
            _ => None,
        }
    }

    /// Vertices of a polygon or path with the current placement applied.
    pub fn world_vertices(&self) -> Vec<Point> {
        let matrix = self.matrix();
        self.vertices()
            .map(|points| {
                points
                    .iter()
                    .map(|p| matrix.transform_point(*p - self.path_offset))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Polygon or path outline in world space as a lyon path, for renderers.
    pub fn world_path(&self) -> Option<Path> {
        let closed = matches!(self.shape, PrimitiveShape::Polygon { .. });
        let vertices = self.world_vertices();
        build_path(&vertices, closed)
    }

    fn local_outline(&self) -> Vec<Point> {
        match &self.shape {
            PrimitiveShape::Polygon { points } | PrimitiveShape::Path { points } => points.clone(),
            PrimitiveShape::Circle { radius } => {
                Bounds::new(-radius, -radius, *radius, *radius).corners().to_vec()
            }
            PrimitiveShape::Line { from, to } => vec![*from, *to],
            PrimitiveShape::Text(content) => {
                let (w, h) = content.approximate_size();
                Bounds::new(0.0, 0.0, w, h).corners().to_vec()
            }
            PrimitiveShape::Image { width, height, .. } => {
                Bounds::new(0.0, 0.0, *width, *height).corners().to_vec()
            }
            PrimitiveShape::Group { .. } => Vec::new(),
        }
    }

    /// Axis-aligned world bounds of the transformed outline.
    pub fn world_bounds(&self) -> Option<Bounds> {
        if let PrimitiveShape::Group { members } = &self.shape {
            let matrix = self.matrix();
            let corners: Vec<Point> = members
                .iter()
                .filter_map(|(_, member)| member.world_bounds())
                .flat_map(|b| b.corners())
                .map(|p| matrix.transform_point(p))
                .collect();
            return bounding_box(&corners);
        }

        let outline: Vec<Point> = self
            .local_outline()
            .into_iter()
            .map(|p| self.local_to_world(p))
            .collect();
        bounding_box(&outline)
    }

    /// Whether a world point lands on this primitive.
    pub fn contains_point(&self, world: Point) -> bool {
        let Some(local) = self.world_to_local(world) else {
            return false;
        };
        let reach = (self.style.stroke_width / 2.0).max(HIT_TOLERANCE);

        match &self.shape {
            PrimitiveShape::Polygon { points } => {
                let inside = build_path(points, true).is_some_and(|path| {
                    hit_test_path(
                        &point(local.x as f32, local.y as f32),
                        path.iter(),
                        FillRule::EvenOdd,
                        0.1,
                    )
                });
                inside || near_polyline(points, true, local, reach)
            }
            PrimitiveShape::Path { points } => near_polyline(points, false, local, reach),
            PrimitiveShape::Circle { radius } => {
                local.distance_to(&Point::default()) <= radius + self.style.stroke_width / 2.0
            }
            PrimitiveShape::Line { from, to } => distance_to_segment(local, *from, *to) <= reach,
            PrimitiveShape::Text(content) => {
                let (w, h) = content.approximate_size();
                Bounds::new(0.0, 0.0, w, h).contains(local)
            }
            PrimitiveShape::Image { width, height, .. } => {
                Bounds::new(0.0, 0.0, *width, *height).contains(local)
            }
            PrimitiveShape::Group { members } => {
                members.iter().any(|(_, member)| member.contains_point(local))
            }
        }
    }
}

fn build_path(points: &[Point], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = Path::builder();
    builder.begin(point(first.x as f32, first.y as f32));
    for p in rest {
        builder.line_to(point(p.x as f32, p.y as f32));
    }
    builder.end(closed);
    Some(builder.build())
}

fn near_polyline(points: &[Point], closed: bool, p: Point, reach: f64) -> bool {
    let open_hit = points
        .windows(2)
        .any(|pair| distance_to_segment(p, pair[0], pair[1]) <= reach);
    let closing_hit = closed
        && match (points.first(), points.last()) {
            (Some(first), Some(last)) => distance_to_segment(p, *last, *first) <= reach,
            _ => false,
        };
    open_hit || closing_hit
}
