use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Player not found in export: {0}")]
    PlayerNotFound(String),

    #[error("No matches available for this analysis")]
    NoMatches,

    #[error("No matches found for champion: {0}")]
    ChampionNotFound(String),

    #[error("Malformed match record: {0}")]
    MalformedMatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
