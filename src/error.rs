use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Invalid Riot ID: game name and tag line are required")]
    InvalidRiotId,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Account error: {0}")]
    AccountError(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown champion: {0}")]
    UnknownChampion(String),

    #[error("Unknown summoner spell: {0}")]
    UnknownSpell(String),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("League client is not running")]
    LcuNotRunning,

    #[error("League client request failed: {0}")]
    LcuError(String),

    #[error("Riot Client automation failed: {0}")]
    Automation(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::JsonError(e.to_string())
    }
}
