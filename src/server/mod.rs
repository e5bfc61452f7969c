pub mod handlers;
pub mod query;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::Result;
use crate::player::PlaybackCommander;
use crate::spotify::Authenticator;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub commander: PlaybackCommander,
    pub authenticator: Arc<Authenticator>,
    pub api_token: Arc<str>,
}

impl AppState {
    pub fn new(
        commander: PlaybackCommander,
        authenticator: Authenticator,
        api_token: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            commander,
            authenticator: Arc::new(authenticator),
            api_token: api_token.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/auth", get(handlers::authorize))
        .route("/callback", get(handlers::callback))
        .route("/api/v1/play", get(handlers::play))
        .route("/api/v1/pause", get(handlers::pause))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}

/// Serve the HTTP API on all interfaces until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    println!("Starting API server on port {}...", port);
    println!("Endpoints:");
    println!("  GET /api/v1/play?device=<name>&playlist=<name|id|url>&shuffle=<true|false>");
    println!("  GET /api/v1/pause");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
