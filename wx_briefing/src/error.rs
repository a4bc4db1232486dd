use std::io;

use config::ConfigError;
use thiserror::Error;
pub(crate) type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug, Error)]
pub(crate) enum ApplicationError {
    #[error("Error regarding config: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("System input/output error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse airport file: {0}")]
    AirportFileError(#[from] toml::de::Error),
    #[error("Failed to parse product JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to render briefing: {0}")]
    TemplateError(#[from] askama::Error),
    #[error("Failed to parse file in a known encoding: {0}")]
    EncodingError(String),
    #[error("Airport {0} is not in the airport file")]
    UnknownAirport(String),
    #[error("Could not find a config directory for this platform")]
    NoConfigDirectory,
}
