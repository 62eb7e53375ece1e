//! Plane geometry helpers: points, bounding boxes, segment distance and the
//! polygon shape presets.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Sub};

/// A point in model space, which is the scene's world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        midpoint(*self, *other)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Exact midpoint of two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn min(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

/// Bounding box of a point list, `None` when the list is empty.
pub fn bounding_box(points: &[Point]) -> Option<Bounds> {
    let first = points.first()?;
    let mut bounds = Bounds::new(first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    Some(bounds)
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Vertex layouts a polygon can be regenerated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePreset {
    /// Points are user-defined and never regenerated
    #[default]
    Freeform,
    Triangle,
    Square,
    Diamond,
    Parallelogram,
    Pentagon,
    Hexagon,
    Circle,
}

impl std::fmt::Display for ShapePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Freeform => "freeform",
            Self::Triangle => "triangle",
            Self::Square => "square",
            Self::Diamond => "diamond",
            Self::Parallelogram => "parallelogram",
            Self::Pentagon => "pentagon",
            Self::Hexagon => "hexagon",
            Self::Circle => "circle",
        };
        write!(f, "{}", name)
    }
}

/// Regenerate the vertices of `preset` inside `bounds`.
///
/// The shape is centered on the box and sized by half of its larger side.
/// Returns `None` for [`ShapePreset::Freeform`], whose points are kept.
pub fn preset_points(
    preset: ShapePreset,
    bounds: &Bounds,
    circle_segments: usize,
) -> Option<Vec<Point>> {
    let c = bounds.center();
    let s = bounds.width().max(bounds.height()) / 2.0;

    let on_circle = |count: usize, phase: f64| -> Vec<Point> {
        (0..count)
            .map(|i| {
                let angle = i as f64 * 2.0 * PI / count as f64 + phase;
                Point::new(c.x + s * angle.cos(), c.y + s * angle.sin())
            })
            .collect()
    };

    let points = match preset {
        ShapePreset::Freeform => return None,
        ShapePreset::Triangle => vec![
            Point::new(c.x, c.y - s),
            Point::new(c.x - s * 0.866, c.y + s * 0.5),
            Point::new(c.x + s * 0.866, c.y + s * 0.5),
        ],
        ShapePreset::Square => vec![
            Point::new(c.x - s, c.y - s),
            Point::new(c.x + s, c.y - s),
            Point::new(c.x + s, c.y + s),
            Point::new(c.x - s, c.y + s),
        ],
        ShapePreset::Diamond => vec![
            Point::new(c.x, c.y - s),
            Point::new(c.x + s, c.y),
            Point::new(c.x, c.y + s),
            Point::new(c.x - s, c.y),
        ],
        ShapePreset::Parallelogram => vec![
            Point::new(c.x - s * 0.8, c.y - s),
            Point::new(c.x + s * 1.2, c.y - s),
            Point::new(c.x + s, c.y + s),
            Point::new(c.x - s * 0.2, c.y + s),
        ],
        ShapePreset::Pentagon => on_circle(5, -PI / 2.0),
        ShapePreset::Hexagon => on_circle(6, 0.0),
        ShapePreset::Circle => on_circle(circle_segments.max(3), 0.0),
    };
    Some(points)
}
