use async_trait::async_trait;

use crate::error::Result;
use crate::spotify::models::{CurrentUser, Device, PlaylistDetails, PlaylistSummary};

/// The Spotify Web API operations this crate depends on.
///
/// `SpotifyClient` implements it against the real service; tests substitute
/// an in-memory double.
#[async_trait]
pub trait SpotifyRemote: Send + Sync {
    async fn current_user(&self) -> Result<CurrentUser>;

    /// One page of the current user's playlists.
    async fn playlists_page(&self, limit: u32, offset: u32) -> Result<Vec<PlaylistSummary>>;

    async fn devices(&self) -> Result<Vec<Device>>;

    async fn playlist(&self, playlist_id: &str) -> Result<PlaylistDetails>;

    /// Plays `spotify:playlist:<playlist_id>` on the device, starting at the
    /// zero-based track `position`.
    async fn start_playback(&self, device_id: &str, playlist_id: &str, position: u32)
        -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn set_shuffle(&self, enabled: bool) -> Result<()>;
}
