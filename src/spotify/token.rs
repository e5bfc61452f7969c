use rspotify::Token;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{AppError, Result};

/// The credential file shared by every run of the tool.
///
/// Writes are left to rspotify's token cache, which replaces the whole file
/// after each authorization and refresh. The format is rspotify's `Token`
/// serialized as JSON.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the stored token. Expired tokens are returned as is; the client
    /// refreshes them on first use.
    pub fn load(&self) -> Result<Token> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            AppError::Auth(format!(
                "No saved token at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let token: Token = serde_json::from_str(&raw).map_err(|e| {
            AppError::Auth(format!(
                "Saved token at {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Loaded Spotify token from {}", self.path.display());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::HashSet;

    fn sample_token() -> Token {
        Token {
            access_token: "test-access-token".to_string(),
            expires_in: Duration::seconds(3600),
            expires_at: Some(Utc::now() + Duration::seconds(3600)),
            refresh_token: Some("test-refresh-token".to_string()),
            scopes: HashSet::from(["user-modify-playback-state".to_string()]),
        }
    }

    #[test]
    fn test_load_saved_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let token = sample_token();
        fs::write(&path, serde_json::to_string(&token).unwrap()).unwrap();

        let loaded = TokenStore::new(&path).load().unwrap();

        assert_eq!(loaded.access_token, "test-access-token");
        assert_eq!(loaded.refresh_token.as_deref(), Some("test-refresh-token"));
        assert!(loaded.scopes.contains("user-modify-playback-state"));
    }

    #[test]
    fn test_missing_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("absent.json"));

        assert!(matches!(store.load(), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_malformed_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(TokenStore::new(&path).load(), Err(AppError::Auth(_))));
    }
}
