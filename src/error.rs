use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spotify not authenticated. Visit /auth to authenticate")]
    Unauthenticated,

    #[error("Spotify API error: {0}")]
    SpotifyApi(#[from] rspotify::ClientError),

    #[error("{0}")]
    RemoteApi(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Authorization rejected: {0}")]
    AuthMismatch(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Wraps a failed remote call with the step that was being attempted.
    pub fn remote(step: &str, err: AppError) -> Self {
        AppError::RemoteApi(format!("{}: {}", step, err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
