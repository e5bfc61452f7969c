use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{AppError, Result};
use crate::spotify::SpotifyRemote;

/// Shared handle to the authenticated Spotify client.
///
/// Clones share one slot. Requests take a snapshot of the current client and
/// keep using it even if an OAuth callback swaps in a new one meanwhile.
#[derive(Clone, Default)]
pub struct Session {
    remote: Arc<RwLock<Option<Arc<dyn SpotifyRemote>>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(remote: Arc<dyn SpotifyRemote>) -> Self {
        Self {
            remote: Arc::new(RwLock::new(Some(remote))),
        }
    }

    /// The current client, or `Unauthenticated` when nobody has logged in yet.
    pub async fn current(&self) -> Result<Arc<dyn SpotifyRemote>> {
        self.remote
            .read()
            .await
            .clone()
            .ok_or(AppError::Unauthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.remote.read().await.is_some()
    }

    pub async fn replace(&self, remote: Arc<dyn SpotifyRemote>) {
        *self.remote.write().await = Some(remote);
        info!("Spotify session replaced");
    }
}
