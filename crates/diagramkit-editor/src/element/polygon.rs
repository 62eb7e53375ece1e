//! Closed polygon elements.

use diagramkit_core::{EditError, ElementKind, Result};
use diagramkit_settings::{AppearanceSettings, Config, NodeColors};
use serde::{Deserialize, Serialize};

use super::vertex::{Topology, VertexElement, VertexKind};
use crate::geometry::{bounding_box, preset_points, Point, ShapePreset};
use crate::scene::{Primitive, SceneGraph, Style};

/// Properties of a polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolygonProps {
    pub points: Vec<Point>,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub has_border: bool,
    pub transparent_fill: bool,
    pub shape_type: ShapePreset,
}

impl PolygonProps {
    /// Default square with colors taken from `appearance`.
    pub fn from_appearance(appearance: &AppearanceSettings) -> Self {
        Self {
            points: vec![
                Point::new(200.0, 150.0),
                Point::new(400.0, 150.0),
                Point::new(400.0, 350.0),
                Point::new(200.0, 350.0),
            ],
            fill_color: appearance.polygon_fill.clone(),
            stroke_color: appearance.polygon_stroke.clone(),
            stroke_width: appearance.polygon_stroke_width,
            has_border: true,
            transparent_fill: false,
            shape_type: ShapePreset::Freeform,
        }
    }

    /// Axis-aligned square of half side `half` around `center`.
    pub fn square(center: Point, half: f64, appearance: &AppearanceSettings) -> Self {
        Self {
            points: vec![
                Point::new(center.x - half, center.y - half),
                Point::new(center.x + half, center.y - half),
                Point::new(center.x + half, center.y + half),
                Point::new(center.x - half, center.y + half),
            ],
            ..Self::from_appearance(appearance)
        }
    }
}

impl Default for PolygonProps {
    fn default() -> Self {
        Self::from_appearance(&AppearanceSettings::default())
    }
}

/// Partial update of [`PolygonProps`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonPatch {
    pub points: Option<Vec<Point>>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub has_border: Option<bool>,
    pub transparent_fill: Option<bool>,
    pub shape_type: Option<ShapePreset>,
}

impl PolygonPatch {
    fn changes_geometry(&self) -> bool {
        self.points.is_some() || self.shape_type.is_some()
    }

    /// Copy every set field into `props`. Presets are not expanded here.
    pub fn apply_to(self, props: &mut PolygonProps) {
        if let Some(points) = self.points {
            props.points = points;
        }
        if let Some(fill) = self.fill_color {
            props.fill_color = fill;
        }
        if let Some(stroke) = self.stroke_color {
            props.stroke_color = stroke;
        }
        if let Some(width) = self.stroke_width {
            props.stroke_width = width;
        }
        if let Some(border) = self.has_border {
            props.has_border = border;
        }
        if let Some(transparent) = self.transparent_fill {
            props.transparent_fill = transparent;
        }
        if let Some(preset) = self.shape_type {
            props.shape_type = preset;
        }
    }
}

impl From<PolygonProps> for PolygonPatch {
    fn from(props: PolygonProps) -> Self {
        Self {
            points: Some(props.points),
            fill_color: Some(props.fill_color),
            stroke_color: Some(props.stroke_color),
            stroke_width: Some(props.stroke_width),
            has_border: Some(props.has_border),
            transparent_fill: Some(props.transparent_fill),
            shape_type: Some(props.shape_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonKind;

impl VertexKind for PolygonKind {
    type Props = PolygonProps;

    const KIND: ElementKind = ElementKind::Polygon;
    const TOPOLOGY: Topology = Topology::Closed;
    const MIN_POINTS: usize = 3;

    fn points(props: &PolygonProps) -> &[Point] {
        &props.points
    }

    fn points_mut(props: &mut PolygonProps) -> &mut Vec<Point> {
        &mut props.points
    }

    fn shape(points: &[Point]) -> Option<Primitive> {
        Primitive::polygon(points)
    }

    fn body_style(props: &PolygonProps, _config: &Config) -> Style {
        Style {
            fill: (!props.transparent_fill).then(|| props.fill_color.clone()),
            stroke: props.has_border.then(|| props.stroke_color.clone()),
            stroke_width: if props.has_border {
                props.stroke_width
            } else {
                0.0
            },
            ..Style::default()
        }
    }

    fn node_colors(config: &Config) -> &NodeColors {
        &config.appearance.polygon_nodes
    }
}

pub type PolygonElement = VertexElement<PolygonKind>;

impl VertexElement<PolygonKind> {
    /// Merge `patch` into the polygon.
    ///
    /// A new point list or shape preset rebuilds the body from the element's
    /// live geometry, so nothing the user did with the transform controls is
    /// lost. Style-only changes restyle the body in place.
    pub fn update(&mut self, scene: &mut dyn SceneGraph, patch: PolygonPatch) -> Result<()> {
        self.base().ensure_alive()?;
        let geometry = patch.changes_geometry();

        let mut points = if geometry {
            self.current_points(scene)
        } else {
            Vec::new()
        };
        if let Some(replacement) = patch.points.clone() {
            points = replacement;
        }
        if let Some(preset) = patch.shape_type {
            let segments = self.base().config().editor.circle_segments;
            if let Some(generated) =
                bounding_box(&points).and_then(|b| preset_points(preset, &b, segments))
            {
                points = generated;
            }
        }
        if geometry && points.len() < PolygonKind::MIN_POINTS {
            return Err(EditError::MinimumPoints {
                kind: ElementKind::Polygon,
                minimum: PolygonKind::MIN_POINTS,
            }
            .into());
        }

        PolygonPatch {
            points: None,
            ..patch
        }
        .apply_to(self.props_mut());

        if geometry {
            self.replace_points(scene, points)?;
        } else {
            self.restyle_body(scene);
        }
        scene.request_render();
        self.base().notify_update();
        Ok(())
    }
}
