use async_trait::async_trait;
use rspotify::{
    model::{Offset, PlayContextId, PlaylistId},
    prelude::*,
    AuthCodeSpotify,
};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::spotify::models::{CurrentUser, Device, PlaylistDetails, PlaylistSummary};
use crate::spotify::remote::SpotifyRemote;

/// Authenticated Spotify Web API client.
///
/// The wrapped `AuthCodeSpotify` refreshes its token on demand and rewrites
/// the credential file whenever it does.
pub struct SpotifyClient {
    client: AuthCodeSpotify,
}

impl SpotifyClient {
    pub fn new(client: AuthCodeSpotify) -> Self {
        Self { client }
    }

    fn playlist_id(playlist_id: &str) -> Result<PlaylistId<'_>> {
        PlaylistId::from_id(playlist_id)
            .map_err(|e| AppError::RemoteApi(format!("Invalid playlist ID {}: {}", playlist_id, e)))
    }
}

#[async_trait]
impl SpotifyRemote for SpotifyClient {
    async fn current_user(&self) -> Result<CurrentUser> {
        let user = self.client.current_user().await?;
        let id = user.id.id().to_string();

        Ok(CurrentUser {
            display_name: user.display_name.unwrap_or_else(|| id.clone()),
            id,
        })
    }

    async fn playlists_page(&self, limit: u32, offset: u32) -> Result<Vec<PlaylistSummary>> {
        let page = self
            .client
            .current_user_playlists_manual(Some(limit), Some(offset))
            .await?;

        debug!(
            "Fetched {} playlists at offset {} (total {})",
            page.items.len(),
            offset,
            page.total
        );

        Ok(page
            .items
            .into_iter()
            .map(|playlist| PlaylistSummary {
                id: playlist.id.id().to_string(),
                name: playlist.name,
                owner: playlist
                    .owner
                    .display_name
                    .unwrap_or_else(|| playlist.owner.id.id().to_string()),
                track_count: playlist.tracks.total,
            })
            .collect())
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        let devices = self.client.device().await?;

        Ok(devices
            .into_iter()
            .map(|device| Device {
                id: device.id.unwrap_or_default(),
                name: device.name,
                device_type: format!("{:?}", device._type),
                is_active: device.is_active,
            })
            .collect())
    }

    async fn playlist(&self, playlist_id: &str) -> Result<PlaylistDetails> {
        let id = Self::playlist_id(playlist_id)?;
        let playlist = self.client.playlist(id, None, None).await?;

        Ok(PlaylistDetails {
            id: playlist_id.to_string(),
            name: playlist.name,
            track_count: playlist.tracks.total,
        })
    }

    async fn start_playback(
        &self,
        device_id: &str,
        playlist_id: &str,
        position: u32,
    ) -> Result<()> {
        let context = PlayContextId::Playlist(Self::playlist_id(playlist_id)?);
        let device = (!device_id.is_empty()).then_some(device_id);
        // rspotify 0.13 carries the track index in a Duration and sends its
        // millisecond count as the offset position.
        let offset = Offset::Position(chrono::Duration::milliseconds(i64::from(position)));

        self.client
            .start_context_playback(context, device, Some(offset), None)
            .await?;
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.client.pause_playback(None).await?;
        Ok(())
    }

    async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.client.shuffle(enabled, None).await?;
        Ok(())
    }
}
