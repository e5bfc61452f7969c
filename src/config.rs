use crate::error::{AppError, Result};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
pub const DEFAULT_TOKEN_FILE: &str = ".spotify_token.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub default_playlist: Option<String>,
    pub default_device: Option<String>,
    pub token_file: String,
    pub api_access_token: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let spotify_client_id = non_empty("SPOTIFY_CLIENT_ID")
            .ok_or_else(|| AppError::Config("SPOTIFY_CLIENT_ID not set".into()))?;

        let spotify_client_secret = non_empty("SPOTIFY_CLIENT_SECRET")
            .ok_or_else(|| AppError::Config("SPOTIFY_CLIENT_SECRET not set".into()))?;

        let spotify_redirect_uri =
            non_empty("SPOTIFY_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        let token_file =
            non_empty("SPOTIFY_TOKEN_FILE").unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri,
            default_playlist: non_empty("SPOTIFY_PLAYLIST_ID"),
            default_device: non_empty("SPOTIFY_DEVICE_NAME"),
            token_file,
            api_access_token: non_empty("API_ACCESS_TOKEN"),
            port,
        })
    }

    /// The HTTP API refuses to start without a shared access token.
    pub fn require_api_access_token(&self) -> Result<&str> {
        self.api_access_token.as_deref().ok_or_else(|| {
            AppError::Config(
                "API_ACCESS_TOKEN environment variable is required for server mode".into(),
            )
        })
    }
}
