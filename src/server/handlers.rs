use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::player::PlaybackRequest;
use crate::server::query::QueryValues;
use crate::server::AppState;
use crate::spotify::auth::AUTH_SUCCESS_MESSAGE;
use crate::spotify::CallbackParams;

pub const ROOT_MESSAGE: &str = "app coming soon....";

/// JSON envelope returned by the `/api/v1` routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// A failed API call, rendered as a JSON envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Invalid or missing access token".to_string(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthMismatch(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

/// The `token` query parameter wins; otherwise the `Authorization` header,
/// with any `Bearer ` prefix removed.
fn presented_token<'a>(query_token: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    query_token.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_authorized(state: &AppState, query_token: Option<&str>, headers: &HeaderMap) -> bool {
    presented_token(query_token, headers)
        .is_some_and(|token| constant_time_eq(token.as_bytes(), state.api_token.as_bytes()))
}

pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// GET /auth - send the browser to Spotify's consent page.
pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryValues,
) -> Response {
    if !is_authorized(&state, query.get("token"), &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Invalid or missing access token",
        )
            .into_response();
    }

    match state.authenticator.authorize_url() {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            error!("Failed to build authorization URL: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /callback - Spotify redirects here after the user consents.
pub async fn callback(
    State(state): State<AppState>,
    query: QueryValues,
) -> Response {
    let params = CallbackParams::from_query(&query);
    match state.authenticator.exchange(&params).await {
        Ok(client) => {
            state.commander.session().replace(Arc::new(client)).await;
            info!("Spotify authorization completed");
            AUTH_SUCCESS_MESSAGE.into_response()
        }
        Err(e) => {
            warn!("OAuth callback rejected: {}", e);
            (StatusCode::FORBIDDEN, format!("Failed to get token: {}", e)).into_response()
        }
    }
}

/// GET /api/v1/play?playlist=<name|id|url>&device=<name|id>&shuffle=<true|false>
pub async fn play(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryValues,
) -> Result<Json<ApiResponse>, ApiError> {
    if !is_authorized(&state, query.get("token"), &headers) {
        return Err(ApiError::unauthorized());
    }

    let playlist = query
        .get("playlist")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("playlist parameter is required".into()))?;

    let request = PlaybackRequest {
        device: query.get("device").unwrap_or_default().to_string(),
        playlist: playlist.to_string(),
        shuffle: query
            .get("shuffle")
            .is_some_and(|s| s.eq_ignore_ascii_case("true")),
    };

    let message = state.commander.play(&request).await.inspect_err(|e| {
        error!("Play request for {:?} failed: {}", request.playlist, e);
    })?;

    Ok(Json(ApiResponse::ok(message)))
}

/// GET /api/v1/pause
pub async fn pause(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: QueryValues,
) -> Result<Json<ApiResponse>, ApiError> {
    if !is_authorized(&state, query.get("token"), &headers) {
        return Err(ApiError::unauthorized());
    }

    let message = state.commander.pause().await.inspect_err(|e| {
        error!("Pause request failed: {}", e);
    })?;

    Ok(Json(ApiResponse::ok(message)))
}
