use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThemeError>;

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    #[error("Malformed theme file for {name}: {source}")]
    MalformedTheme {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Theme already exists: {0}")]
    ThemeExists(String),

    #[error("Invalid theme name: {0:?}")]
    InvalidThemeName(String),

    #[error("Project root is not a readable directory: {}", .0.display())]
    InvalidProjectRoot(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
