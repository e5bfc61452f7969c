use rand::Rng;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::player::device::select_device;
use crate::resolver::resolve_playlist_id;
use crate::session::Session;

/// Spotify rejects a shuffle toggle until the new context is actually
/// playing, so shuffle is enabled this long after playback starts.
pub const SHUFFLE_SETTLE_DELAY: Duration = Duration::from_millis(500);

pub const PAUSED_MESSAGE: &str = "Playback paused";

/// One play command as received from the CLI or the HTTP API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackRequest {
    /// Device name or ID; empty means "whatever is active".
    pub device: String,
    /// Playlist link, ID or name.
    pub playlist: String,
    pub shuffle: bool,
}

/// Starts and pauses playback on behalf of the CLI and the HTTP API.
#[derive(Clone)]
pub struct PlaybackCommander {
    session: Session,
    settle_delay: Duration,
}

impl PlaybackCommander {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            settle_delay: SHUFFLE_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start the requested playlist without writing any progress output.
    pub async fn play(&self, request: &PlaybackRequest) -> Result<String> {
        self.play_with_output(request, &mut io::sink()).await
    }

    /// Start the requested playlist, narrating device choice and playlist
    /// lookup to `out`. Returns the status line to show the caller.
    pub async fn play_with_output<W: Write + Send>(
        &self,
        request: &PlaybackRequest,
        out: &mut W,
    ) -> Result<String> {
        let remote = self.session.current().await?;

        let devices = remote
            .devices()
            .await
            .map_err(|e| AppError::remote("failed to get devices", e))?;

        writeln!(out, "Available devices:")?;
        for (i, device) in devices.iter().enumerate() {
            writeln!(
                out,
                "{}. {} ({}) - Active: {}",
                i + 1,
                device.name,
                device.device_type,
                device.is_active
            )?;
        }

        let selection = select_device(&devices, &request.device)?;
        let device = selection.device;

        if selection.matched_hint {
            writeln!(out, "Using specified device: {}", device.name)?;
        } else if !request.device.is_empty() {
            writeln!(
                out,
                "Device '{}' not found. Using device: {}",
                request.device, device.name
            )?;
        } else {
            writeln!(out, "Using device: {}", device.name)?;
        }

        let playlist_id = resolve_playlist_id(remote.as_ref(), &request.playlist, out)
            .await
            .map_err(|e| AppError::remote("failed to resolve playlist", e))?;

        let playlist = remote
            .playlist(&playlist_id)
            .await
            .map_err(|e| AppError::remote("failed to get playlist", e))?;

        if !request.shuffle {
            remote
                .start_playback(&device.id, &playlist_id, 0)
                .await
                .map_err(|e| AppError::remote("failed to start playback", e))?;

            info!("Started \"{}\" on {} from track 1", playlist.name, device.name);
            return Ok(format!(
                "Now playing \"{}\" on {} (starting at track 1)",
                playlist.name, device.name
            ));
        }

        let offset = random_offset(playlist.track_count);
        remote
            .start_playback(&device.id, &playlist_id, offset)
            .await
            .map_err(|e| AppError::remote("failed to start playback", e))?;

        info!(
            "Started \"{}\" on {} at track {} of {}",
            playlist.name,
            device.name,
            offset + 1,
            playlist.track_count
        );

        tokio::time::sleep(self.settle_delay).await;

        // Playback is already running; a failed toggle is only worth a warning.
        match remote.set_shuffle(true).await {
            Ok(()) => writeln!(out, "Shuffle mode enabled")?,
            Err(e) => {
                warn!("Failed to enable shuffle: {}", e);
                writeln!(out, "Warning: Failed to enable shuffle: {}", e)?;
            }
        }

        Ok(format!(
            "Now playing \"{}\" on {} (shuffle enabled, starting at track {} of {})",
            playlist.name,
            device.name,
            offset + 1,
            playlist.track_count
        ))
    }

    pub async fn pause(&self) -> Result<String> {
        let remote = self.session.current().await?;

        remote
            .pause()
            .await
            .map_err(|e| AppError::remote("failed to pause playback", e))?;

        info!("Playback paused");
        Ok(PAUSED_MESSAGE.to_string())
    }
}

/// Uniform start position in `[0, track_count)`. An empty playlist starts
/// at 0 and Spotify decides what to do with it.
fn random_offset(track_count: u32) -> u32 {
    if track_count == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..track_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::remote::mock::{Call, MockRemote};
    use crate::spotify::Device;
    use std::sync::Arc;

    fn commander_for(remote: &Arc<MockRemote>) -> PlaybackCommander {
        PlaybackCommander::new(Session::authenticated(remote.clone()))
            .with_settle_delay(Duration::ZERO)
    }

    fn request(device: &str, playlist: &str, shuffle: bool) -> PlaybackRequest {
        PlaybackRequest {
            device: device.to_string(),
            playlist: playlist.to_string(),
            shuffle,
        }
    }

    fn started_position(remote: &MockRemote) -> u32 {
        remote
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::StartPlayback { position, .. } => Some(position),
                _ => None,
            })
            .expect("playback was not started")
    }

    #[test]
    fn test_settle_delay_is_half_a_second() {
        assert_eq!(SHUFFLE_SETTLE_DELAY, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_play_from_first_track() {
        let remote = Arc::new(MockRemote::default());

        let message = commander_for(&remote)
            .play(&request("", "Test Playlist", false))
            .await
            .unwrap();

        assert_eq!(
            message,
            "Now playing \"Test Playlist\" on Living Room Speaker (starting at track 1)"
        );
        assert_eq!(
            remote.calls(),
            vec![
                Call::Devices,
                Call::PlaylistsPage { limit: 50, offset: 0 },
                Call::Playlist("playlist123".to_string()),
                Call::StartPlayback {
                    device_id: "device123".to_string(),
                    playlist_id: "playlist123".to_string(),
                    position: 0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_shuffle_offset_within_track_count() {
        for _ in 0..25 {
            let remote = Arc::new(MockRemote {
                track_count: 10,
                ..Default::default()
            });

            let message = commander_for(&remote)
                .play(&request("", "37i9dQZF1DXcBWIGoYBM5M", true))
                .await
                .unwrap();

            let position = started_position(&remote);
            assert!(position < 10);
            assert!(message.contains(&format!("track {} of 10", position + 1)));
            assert!(message.contains("shuffle enabled"));
            assert_eq!(remote.calls().last(), Some(&Call::Shuffle(true)));
        }
    }

    #[tokio::test]
    async fn test_shuffle_on_empty_playlist_starts_at_zero() {
        let remote = Arc::new(MockRemote {
            track_count: 0,
            ..Default::default()
        });

        commander_for(&remote)
            .play(&request("", "37i9dQZF1DXcBWIGoYBM5M", true))
            .await
            .unwrap();

        assert_eq!(started_position(&remote), 0);
    }

    #[tokio::test]
    async fn test_shuffle_failure_is_not_fatal() {
        let remote = Arc::new(MockRemote {
            shuffle_error: Some("Restriction violated".to_string()),
            ..Default::default()
        });
        let mut out = Vec::new();

        let message = commander_for(&remote)
            .play_with_output(&request("", "37i9dQZF1DXcBWIGoYBM5M", true), &mut out)
            .await
            .unwrap();

        assert!(message.starts_with("Now playing \"Test Playlist\""));
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("Warning: Failed to enable shuffle"));
    }

    #[tokio::test]
    async fn test_start_failure_is_fatal() {
        let remote = Arc::new(MockRemote {
            play_error: Some("Player command failed".to_string()),
            ..Default::default()
        });

        let err = commander_for(&remote)
            .play(&request("", "37i9dQZF1DXcBWIGoYBM5M", true))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("failed to start playback"));
        assert!(!remote.calls().contains(&Call::Shuffle(true)));
    }

    #[tokio::test]
    async fn test_no_devices_fails_before_resolution() {
        let remote = Arc::new(MockRemote {
            devices: Vec::new(),
            ..Default::default()
        });

        let err = commander_for(&remote)
            .play(&request("", "Test Playlist", false))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(remote.calls(), vec![Call::Devices]);
    }

    #[tokio::test]
    async fn test_device_error_propagates() {
        let remote = Arc::new(MockRemote {
            devices_error: Some("Service unavailable".to_string()),
            ..Default::default()
        });

        let err = commander_for(&remote)
            .play(&request("", "Test Playlist", false))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to get devices: Service unavailable");
    }

    #[tokio::test]
    async fn test_playlist_lookup_error_propagates() {
        let remote = Arc::new(MockRemote {
            playlist_error: Some("Not found".to_string()),
            ..Default::default()
        });

        let err = commander_for(&remote)
            .play(&request("", "37i9dQZF1DXcBWIGoYBM5M", false))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("failed to get playlist"));
    }

    #[tokio::test]
    async fn test_plays_on_hinted_device() {
        let remote = Arc::new(MockRemote {
            devices: vec![
                Device::mock("device1", "Device One", false),
                Device::mock("device2", "Device Two", false),
                Device::mock("device3", "Target Speaker", false),
            ],
            ..Default::default()
        });
        let mut out = Vec::new();

        commander_for(&remote)
            .play_with_output(
                &request("Target Speaker", "37i9dQZF1DXcBWIGoYBM5M", false),
                &mut out,
            )
            .await
            .unwrap();

        assert!(remote.calls().contains(&Call::StartPlayback {
            device_id: "device3".to_string(),
            playlist_id: "37i9dQZF1DXcBWIGoYBM5M".to_string(),
            position: 0,
        }));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Available devices:"));
        assert!(text.contains("1. Device One (Speaker) - Active: false"));
        assert!(text.contains("3. Target Speaker (Speaker) - Active: false"));
        assert!(text.contains("Using specified device: Target Speaker"));
    }

    #[tokio::test]
    async fn test_play_requires_session() {
        let commander = PlaybackCommander::new(Session::new());

        let err = commander
            .play(&request("", "Test Playlist", false))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_pause() {
        let remote = Arc::new(MockRemote::default());

        let message = commander_for(&remote).pause().await.unwrap();

        assert_eq!(message, "Playback paused");
        assert_eq!(remote.calls(), vec![Call::Pause]);
    }

    #[tokio::test]
    async fn test_pause_error_propagates() {
        let remote = Arc::new(MockRemote {
            pause_error: Some("No active device".to_string()),
            ..Default::default()
        });

        let err = commander_for(&remote).pause().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to pause playback: No active device");
    }

    #[tokio::test]
    async fn test_pause_requires_session() {
        let err = PlaybackCommander::new(Session::new()).pause().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Spotify not authenticated. Visit /auth to authenticate"
        );
    }
}
