use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. Gameplay itself never errors; it rejects and logs.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl GameError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
