use std::{ io, path::PathBuf };

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unrecognised command: {0}")]
    Unknown(String),
    #[error("expected four layer sizes between 1 and 4, got {0:?}")]
    BadSizes(String),
    #[error("expected connection layers between 0 and 4, got {0:?}")]
    BadLayers(String),
}
