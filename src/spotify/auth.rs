use axum::{http::StatusCode, routing::get, Router};
use rspotify::{prelude::*, scopes, AuthCodeSpotify, Credentials, OAuth, Token};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Config, DEFAULT_PORT};
use crate::error::{AppError, Result};
use crate::server::query::QueryValues;
use crate::spotify::client::SpotifyClient;

/// How long the CLI waits for the browser to come back to the redirect URI.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

pub const AUTH_SUCCESS_MESSAGE: &str = "Authentication successful! You can close this window.";

/// Query parameters Spotify appends to the redirect URI.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    pub fn from_query(query: &QueryValues) -> Self {
        Self {
            code: query.get("code").map(str::to_string),
            state: query.get("state").map(str::to_string),
            error: query.get("error").map(str::to_string),
        }
    }
}

/// A received callback and the channel its browser reply waits on.
type PendingCallback = (CallbackParams, oneshot::Sender<std::result::Result<(), String>>);

/// Authorization code flow against Spotify's accounts service.
pub struct Authenticator {
    creds: Credentials,
    oauth: OAuth,
    token_file: PathBuf,
}

impl Authenticator {
    pub fn new(config: &Config) -> Self {
        let creds = Credentials::new(&config.spotify_client_id, &config.spotify_client_secret);

        // The default OAuth carries a freshly generated random state.
        let oauth = OAuth {
            redirect_uri: config.spotify_redirect_uri.clone(),
            scopes: scopes!(
                "user-read-playback-state",
                "user-modify-playback-state",
                "user-read-currently-playing",
                "playlist-read-private",
                "playlist-read-collaborative"
            ),
            ..Default::default()
        };

        Self {
            creds,
            oauth,
            token_file: PathBuf::from(&config.token_file),
        }
    }

    pub fn state(&self) -> &str {
        &self.oauth.state
    }

    fn client_config(&self) -> rspotify::Config {
        rspotify::Config {
            token_cached: true,
            token_refreshing: true,
            cache_path: self.token_file.clone(),
            ..Default::default()
        }
    }

    fn unauthorized_client(&self) -> AuthCodeSpotify {
        AuthCodeSpotify::with_config(self.creds.clone(), self.oauth.clone(), self.client_config())
    }

    pub fn authorize_url(&self) -> Result<String> {
        Ok(self.unauthorized_client().get_authorize_url(false)?)
    }

    pub fn verify_state(&self, state: Option<&str>) -> Result<()> {
        match state {
            Some(state) if state == self.oauth.state => Ok(()),
            Some(state) => Err(AppError::AuthMismatch(format!(
                "State mismatch: {} != {}",
                state, self.oauth.state
            ))),
            None => Err(AppError::AuthMismatch("missing state parameter".into())),
        }
    }

    /// Exchanges the callback's authorization code for a token.
    ///
    /// The state is checked before anything is sent to Spotify. On success
    /// rspotify writes the new token to the credential file.
    pub async fn exchange(&self, params: &CallbackParams) -> Result<SpotifyClient> {
        self.verify_state(params.state.as_deref())?;

        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            return Err(AppError::AuthMismatch(format!(
                "Spotify denied authorization: {}",
                error
            )));
        }

        let code = params
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::AuthMismatch("missing authorization code".into()))?;

        let client = self.unauthorized_client();
        client
            .request_token(code)
            .await
            .map_err(|e| AppError::AuthMismatch(format!("Couldn't get token: {}", e)))?;

        info!("Saved Spotify token to {}", self.token_file.display());
        Ok(SpotifyClient::new(client))
    }

    /// Rebuilds a client around a previously stored token.
    pub fn restore(&self, token: Token) -> SpotifyClient {
        SpotifyClient::new(AuthCodeSpotify::from_token_with_config(
            token,
            self.creds.clone(),
            self.oauth.clone(),
            self.client_config(),
        ))
    }

    /// Runs the browser flow from a terminal: prints the authorization URL,
    /// listens on the redirect URI for a single callback and exchanges its code.
    pub async fn authorize_interactively(&self) -> Result<SpotifyClient> {
        let authorize_url = self.authorize_url()?;
        let redirect = Url::parse(&self.oauth.redirect_uri)
            .map_err(|e| AppError::Config(format!("Invalid redirect URI: {}", e)))?;
        let host = redirect.host_str().unwrap_or("127.0.0.1").to_string();
        let port = redirect.port_or_known_default().unwrap_or(DEFAULT_PORT);

        let listener = TcpListener::bind((host.as_str(), port)).await.map_err(|e| {
            AppError::Auth(format!("Cannot listen on {}:{} for the callback: {}", host, port, e))
        })?;
        debug!("Waiting for OAuth callback on {}:{}{}", host, port, redirect.path());

        let (params_tx, params_rx) = oneshot::channel::<PendingCallback>();
        let params_tx = Arc::new(Mutex::new(Some(params_tx)));
        let app = Router::new().route(
            redirect.path(),
            get(move |query: QueryValues| {
                let params_tx = params_tx.clone();
                async move {
                    let Some(tx) = params_tx.lock().ok().and_then(|mut slot| slot.take()) else {
                        return (StatusCode::CONFLICT, "Authorization already handled".to_string());
                    };
                    let (reply_tx, reply_rx) = oneshot::channel();
                    if tx.send((CallbackParams::from_query(&query), reply_tx)).is_err() {
                        return (StatusCode::GONE, "Authorization no longer pending".to_string());
                    }
                    match reply_rx.await {
                        Ok(Ok(())) => (StatusCode::OK, AUTH_SUCCESS_MESSAGE.to_string()),
                        Ok(Err(e)) => (StatusCode::FORBIDDEN, format!("Failed to get token: {}", e)),
                        Err(_) => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Authorization was abandoned".to_string(),
                        ),
                    }
                }
            }),
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        println!("Please visit this URL to authenticate:");
        println!("{}", authorize_url);

        let received = tokio::time::timeout(CALLBACK_TIMEOUT, params_rx).await;

        // The browser only hears back once the code exchange has finished.
        let outcome = match received {
            Ok(Ok((params, reply_tx))) => {
                let outcome = self.exchange(&params).await;
                let _ = reply_tx.send(outcome.as_ref().map(|_| ()).map_err(|e| e.to_string()));
                outcome
            }
            Ok(Err(_)) => Err(AppError::Auth("Callback listener stopped".into())),
            Err(_) => Err(AppError::Auth(format!(
                "No authorization received within {} seconds",
                CALLBACK_TIMEOUT.as_secs()
            ))),
        };

        let _ = shutdown_tx.send(());
        if tokio::time::timeout(Duration::from_secs(5), server).await.is_err() {
            warn!("Callback listener did not shut down cleanly");
        }

        outcome
    }
}
