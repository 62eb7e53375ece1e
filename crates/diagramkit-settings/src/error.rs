//! Error types for the settings crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value failed [`Config::validate`](crate::Config::validate).
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Config files must end in `.json` or `.toml`.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("No configuration directory on this platform")]
    NoConfigDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl SettingsError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the file was read but its contents are unusable.
    pub fn is_bad_content(&self) -> bool {
        matches!(
            self,
            Self::InvalidSetting { .. } | Self::Json(_) | Self::TomlParse(_)
        )
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;
