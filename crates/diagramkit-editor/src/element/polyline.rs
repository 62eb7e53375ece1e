//! Open polyline elements, optionally colored by equipment status.

use diagramkit_core::{EditError, ElementKind, LineStatus, Result};
use diagramkit_settings::{AppearanceSettings, Config, NodeColors};
use serde::{Deserialize, Serialize};

use super::vertex::{Topology, VertexElement, VertexKind};
use crate::geometry::Point;
use crate::scene::{Primitive, SceneGraph, Style};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolylineProps {
    pub points: Vec<Point>,
    pub stroke_color: String,
    pub stroke_width: f64,
    /// When set, the status color replaces `stroke_color`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LineStatus>,
}

impl PolylineProps {
    /// Horizontal two-point line of half length `half` centered on `center`.
    pub fn horizontal(center: Point, half: f64, appearance: &AppearanceSettings) -> Self {
        Self {
            points: vec![
                Point::new(center.x - half, center.y),
                Point::new(center.x + half, center.y),
            ],
            stroke_color: appearance.polyline_stroke.clone(),
            stroke_width: appearance.polyline_stroke_width,
            status: None,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Stroke actually drawn.
    pub fn effective_stroke<'a>(&'a self, config: &'a Config) -> &'a str {
        match self.status {
            Some(status) => config.appearance.status_colors.color_for(status),
            None => &self.stroke_color,
        }
    }
}

impl Default for PolylineProps {
    fn default() -> Self {
        Self::horizontal(Point::new(400.0, 300.0), 75.0, &AppearanceSettings::default())
    }
}

/// Partial update of [`PolylineProps`]. `status: Some(None)` clears the status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylinePatch {
    pub points: Option<Vec<Point>>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub status: Option<Option<LineStatus>>,
}

impl PolylinePatch {
    pub fn apply_to(self, props: &mut PolylineProps) {
        if let Some(points) = self.points {
            props.points = points;
        }
        if let Some(stroke) = self.stroke_color {
            props.stroke_color = stroke;
        }
        if let Some(width) = self.stroke_width {
            props.stroke_width = width;
        }
        if let Some(status) = self.status {
            props.status = status;
        }
    }
}

impl From<PolylineProps> for PolylinePatch {
    fn from(props: PolylineProps) -> Self {
        Self {
            points: Some(props.points),
            stroke_color: Some(props.stroke_color),
            stroke_width: Some(props.stroke_width),
            status: Some(props.status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolylineKind;

impl VertexKind for PolylineKind {
    type Props = PolylineProps;

    const KIND: ElementKind = ElementKind::Polyline;
    const TOPOLOGY: Topology = Topology::Open;
    const MIN_POINTS: usize = 2;

    fn points(props: &PolylineProps) -> &[Point] {
        &props.points
    }

    fn points_mut(props: &mut PolylineProps) -> &mut Vec<Point> {
        &mut props.points
    }

    fn shape(points: &[Point]) -> Option<Primitive> {
        Primitive::open_path(points)
    }

    fn body_style(props: &PolylineProps, config: &Config) -> Style {
        Style {
            fill: None,
            stroke: Some(props.effective_stroke(config).to_string()),
            stroke_width: props.stroke_width,
            ..Style::default()
        }
    }

    fn node_colors(config: &Config) -> &NodeColors {
        &config.appearance.polyline_nodes
    }
}

pub type PolylineElement = VertexElement<PolylineKind>;

impl VertexElement<PolylineKind> {
    pub fn update(&mut self, scene: &mut dyn SceneGraph, patch: PolylinePatch) -> Result<()> {
        self.base().ensure_alive()?;
        if patch
            .points
            .as_ref()
            .is_some_and(|points| points.len() < PolylineKind::MIN_POINTS)
        {
            return Err(EditError::MinimumPoints {
                kind: ElementKind::Polyline,
                minimum: PolylineKind::MIN_POINTS,
            }
            .into());
        }

        let points = patch.points.clone();
        PolylinePatch {
            points: None,
            ..patch
        }
        .apply_to(self.props_mut());

        match points {
            Some(points) => self.replace_points(scene, points)?,
            None => self.restyle_body(scene),
        }
        scene.request_render();
        self.base().notify_update();
        Ok(())
    }

    pub fn status(&self) -> Option<LineStatus> {
        self.props().status
    }

    pub fn segment_count(&self) -> usize {
        self.props().segment_count()
    }
}
