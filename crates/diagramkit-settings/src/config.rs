//! Configuration and settings management for DiagramKit
//!
//! Configuration is organized into two sections:
//! - Editor settings (canvas size, placement offsets, marker sizes)
//! - Appearance settings (default colors, node color coding, fill palette,
//!   status colors for polylines)
//!
//! Files are stored as JSON or TOML, picked by extension.

use diagramkit_core::LineStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Canvas and marker geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Canvas width; new elements are placed around its center
    pub canvas_width: f64,
    /// Canvas height
    pub canvas_height: f64,
    /// Offset applied per existing element so new elements do not stack exactly
    pub placement_step: f64,
    /// Half side length of the default square polygon
    pub polygon_half_extent: f64,
    /// Half length of the default two-point polyline
    pub polyline_half_length: f64,
    /// Radius of node markers
    pub node_radius: f64,
    /// Radius of edge midpoint handles
    pub edge_handle_radius: f64,
    /// Stroke width of node markers
    pub node_stroke_width: f64,
    /// Stroke width of edge handles
    pub edge_handle_stroke_width: f64,
    /// Stroke width of dashed edge guides
    pub edge_guide_width: f64,
    /// Dash pattern of edge guides
    pub edge_guide_dash: Vec<f64>,
    /// Vertex count of the circle shape preset
    pub circle_segments: usize,
    /// Maximum entries in the recent files list
    pub recent_files_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            placement_step: 30.0,
            polygon_half_extent: 100.0,
            polyline_half_length: 75.0,
            node_radius: 10.0,
            edge_handle_radius: 8.0,
            node_stroke_width: 3.0,
            edge_handle_stroke_width: 2.0,
            edge_guide_width: 2.0,
            edge_guide_dash: vec![5.0, 5.0],
            circle_segments: 32,
            recent_files_limit: 10,
        }
    }
}

impl EditorSettings {
    /// Center of the canvas, the anchor for default placement
    pub fn canvas_center(&self) -> (f64, f64) {
        (self.canvas_width / 2.0, self.canvas_height / 2.0)
    }
}

/// Node marker colors for one element kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeColors {
    /// The selected node
    pub selected: String,
    /// First and last node of an open path
    pub endpoint: String,
    /// Every other node
    pub interior: String,
}

impl NodeColors {
    /// Pick the color for a node.
    pub fn color(&self, selected: bool, endpoint: bool) -> &str {
        if selected {
            &self.selected
        } else if endpoint {
            &self.endpoint
        } else {
            &self.interior
        }
    }
}

/// Stroke colors that override a polyline's own color when it carries a status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusColors {
    pub running: String,
    pub idle: String,
    pub off: String,
    pub alarm: String,
    pub maintenance: String,
    pub breakdown: String,
    pub disconnected: String,
}

impl Default for StatusColors {
    fn default() -> Self {
        Self {
            running: "#16a34a".to_string(),
            idle: "#ca8a04".to_string(),
            off: "#ca8a04".to_string(),
            alarm: "#dc2626".to_string(),
            maintenance: "#2563eb".to_string(),
            breakdown: "#374151".to_string(),
            disconnected: "#4b5563".to_string(),
        }
    }
}

impl StatusColors {
    pub fn color_for(&self, status: LineStatus) -> &str {
        match status {
            LineStatus::Running => &self.running,
            LineStatus::Idle => &self.idle,
            LineStatus::Off => &self.off,
            LineStatus::Alarm => &self.alarm,
            LineStatus::Maintenance => &self.maintenance,
            LineStatus::Breakdown => &self.breakdown,
            LineStatus::Disconnected => &self.disconnected,
        }
    }
}

/// Default colors and fonts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    /// Polygon fill when none is given
    pub polygon_fill: String,
    /// Polygon border color
    pub polygon_stroke: String,
    /// Polygon border width
    pub polygon_stroke_width: f64,
    /// Polyline stroke color
    pub polyline_stroke: String,
    /// Polyline stroke width
    pub polyline_stroke_width: f64,
    /// Text color
    pub text_color: String,
    /// Text font family
    pub font_family: String,
    /// Text font size
    pub font_size: f64,
    /// Outline of node markers
    pub marker_stroke: String,
    /// Dashed edge guide and edge handle outline
    pub edge_guide: String,
    /// Edge handle fill
    pub edge_handle_fill: String,
    /// Fill colors handed out to new polygons in turn
    pub fill_palette: Vec<String>,
    /// Polygon nodes: selected vs. unselected
    pub polygon_nodes: NodeColors,
    /// Polyline nodes: selected, endpoint, interior
    pub polyline_nodes: NodeColors,
    /// Polyline status colors
    pub status_colors: StatusColors,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            polygon_fill: "#3b82f6".to_string(),
            polygon_stroke: "#1e40af".to_string(),
            polygon_stroke_width: 3.0,
            polyline_stroke: "#22c55e".to_string(),
            polyline_stroke_width: 3.0,
            text_color: "#ffffff".to_string(),
            font_family: "Arial".to_string(),
            font_size: 24.0,
            marker_stroke: "#ffffff".to_string(),
            edge_guide: "#60a5fa".to_string(),
            edge_handle_fill: "rgba(96, 165, 250, 0.3)".to_string(),
            fill_palette: [
                "#3b82f6", "#ef4444", "#22c55e", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4",
                "#f97316",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            polygon_nodes: NodeColors {
                selected: "#22c55e".to_string(),
                endpoint: "#ef4444".to_string(),
                interior: "#ef4444".to_string(),
            },
            polyline_nodes: NodeColors {
                selected: "#fbbf24".to_string(),
                endpoint: "#22c55e".to_string(),
                interior: "#ef4444".to_string(),
            },
            status_colors: StatusColors::default(),
        }
    }
}

impl AppearanceSettings {
    /// Palette color for the n-th new element, cycling.
    pub fn palette_color(&self, n: usize) -> &str {
        if self.fill_palette.is_empty() {
            return &self.polygon_fill;
        }
        &self.fill_palette[n % self.fill_palette.len()]
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recently opened design files, most recent first
    pub recent_files: Vec<PathBuf>,
    /// Canvas and marker geometry
    pub editor: EditorSettings,
    /// Colors and fonts
    pub appearance: AppearanceSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location: `<config_dir>/diagramkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("diagramkit").join("config.toml"))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when the file is missing or unusable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Using default settings: {}", e);
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) if e.is_bad_content() => {
                tracing::warn!("Ignoring malformed settings at {}: {}", path.display(), e);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Could not read settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let editor = &self.editor;
        if editor.canvas_width <= 0.0 || editor.canvas_height <= 0.0 {
            return Err(SettingsError::invalid(
                "editor.canvas",
                "canvas dimensions must be > 0",
            ));
        }

        if editor.placement_step < 0.0 {
            return Err(SettingsError::invalid(
                "editor.placement_step",
                "must not be negative",
            ));
        }

        if editor.polygon_half_extent <= 0.0 || editor.polyline_half_length <= 0.0 {
            return Err(SettingsError::invalid(
                "editor.default_size",
                "default element sizes must be > 0",
            ));
        }

        if editor.node_radius <= 0.0 || editor.edge_handle_radius <= 0.0 {
            return Err(SettingsError::invalid(
                "editor.marker_radius",
                "marker radii must be > 0",
            ));
        }

        if editor.edge_guide_dash.iter().any(|d| *d < 0.0) {
            return Err(SettingsError::invalid(
                "editor.edge_guide_dash",
                "dash lengths must not be negative",
            ));
        }

        if editor.circle_segments < 3 {
            return Err(SettingsError::invalid(
                "editor.circle_segments",
                "a circle preset needs at least 3 segments",
            ));
        }

        let appearance = &self.appearance;
        if appearance.polygon_stroke_width < 0.0 || appearance.polyline_stroke_width < 0.0 {
            return Err(SettingsError::invalid(
                "appearance.stroke_width",
                "must not be negative",
            ));
        }

        if appearance.font_size <= 0.0 {
            return Err(SettingsError::invalid(
                "appearance.font_size",
                "must be > 0",
            ));
        }

        if appearance.fill_palette.is_empty() {
            return Err(SettingsError::invalid(
                "appearance.fill_palette",
                "palette must contain at least one color",
            ));
        }

        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.editor.recent_files_limit);
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
