//! DiagramKit Settings Crate
//!
//! Editor defaults, colors and their JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{AppearanceSettings, Config, EditorSettings, NodeColors, StatusColors};
pub use error::{SettingsError, SettingsResult};
