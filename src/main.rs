use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use colored::Colorize;
use std::io;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spotify_shortcut::display::{print_debug_json, print_devices, print_playlists};
use spotify_shortcut::resolver::fetch_all_playlists;
use spotify_shortcut::server::{self, AppState};
use spotify_shortcut::spotify::{CurrentUser, SpotifyRemote};
use spotify_shortcut::{
    Authenticator, Config, PlaybackCommander, PlaybackRequest, Session, SpotifyClient, TokenStore,
};

#[derive(Parser)]
#[command(name = "spotify-shortcut")]
#[command(about = "Play Spotify playlists on Connect devices from the command line or an HTTP API")]
#[command(version)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
struct Cli {
    /// Playlist name, ID or URL to play
    #[arg(long, env = "SPOTIFY_PLAYLIST_ID")]
    playlist: Option<String>,

    /// Device name or ID to play on
    #[arg(long, env = "SPOTIFY_DEVICE_NAME")]
    device: Option<String>,

    /// Enable shuffle mode and start at a random track
    #[arg(long)]
    shuffle: bool,

    /// Pause playback
    #[arg(long, group = "mode")]
    pause: bool,

    /// List available Spotify Connect devices and exit
    #[arg(long, group = "mode")]
    devices: bool,

    /// List your Spotify playlists and exit
    #[arg(long, group = "mode")]
    playlists: bool,

    /// Start as HTTP API server
    #[arg(long, group = "mode")]
    server: bool,

    /// Print raw API responses for debugging
    #[arg(long)]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

enum Mode {
    Play(PlaybackRequest),
    Pause,
    Devices,
    Playlists,
    Server,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.verbose || self.debug {
            "debug"
        } else {
            "info"
        }
    }

    fn mode(&self, config: &Config) -> Result<Mode> {
        if self.server {
            return Ok(Mode::Server);
        }
        if self.pause {
            return Ok(Mode::Pause);
        }
        if self.devices {
            return Ok(Mode::Devices);
        }
        if self.playlists {
            return Ok(Mode::Playlists);
        }

        // clap hands an empty environment variable over as `Some("")`.
        let Some(playlist) = non_empty(&self.playlist).or_else(|| config.default_playlist.clone())
        else {
            bail!("SPOTIFY_PLAYLIST_ID is required. Use --playlist or set it in .env");
        };

        Ok(Mode::Play(PlaybackRequest {
            device: non_empty(&self.device)
                .or_else(|| config.default_device.clone())
                .unwrap_or_default(),
            playlist,
            shuffle: self.shuffle,
        }))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn setup_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::new(level))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // clap reads env defaults, so .env has to be loaded before parsing.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_tracing(cli.log_level());

    let config = Config::from_env().context("Failed to load configuration")?;
    let mode = cli.mode(&config)?;

    let authenticator = Authenticator::new(&config);
    let store = TokenStore::new(&config.token_file);

    match mode {
        Mode::Server => run_server(&config, authenticator, &store).await,
        Mode::Playlists => {
            let (remote, _) = connect(&authenticator, &store).await?;
            list_playlists(remote.as_ref(), cli.debug).await
        }
        Mode::Devices => {
            let (remote, _) = connect(&authenticator, &store).await?;
            list_devices(remote.as_ref(), cli.debug).await
        }
        Mode::Pause => {
            let (remote, _) = connect(&authenticator, &store).await?;
            let commander = PlaybackCommander::new(Session::authenticated(remote));
            let message = commander.pause().await.context("Failed to pause")?;
            println!("{}", message.green());
            Ok(())
        }
        Mode::Play(request) => {
            let (remote, _) = connect(&authenticator, &store).await?;
            if cli.debug {
                let devices = remote.devices().await.context("Failed to get devices")?;
                print_debug_json("Device", &devices);
            }

            let commander = PlaybackCommander::new(Session::authenticated(remote));
            let message = commander
                .play_with_output(&request, &mut io::stdout())
                .await
                .context("Failed to play playlist")?;
            println!("{}", message.green());
            Ok(())
        }
    }
}

/// Reuse the saved token when it still works, otherwise walk the user
/// through the browser authorization.
async fn connect(
    authenticator: &Authenticator,
    store: &TokenStore,
) -> Result<(Arc<dyn SpotifyRemote>, CurrentUser)> {
    match store.load() {
        Ok(token) => {
            let client = authenticator.restore(token);
            match client.current_user().await {
                Ok(user) => return Ok(authenticated(client, user)),
                Err(e) => warn!("Token may be expired, re-authenticating: {}", e),
            }
        }
        Err(e) => debug!("{}", e),
    }

    let client = authenticator
        .authorize_interactively()
        .await
        .context("Spotify authorization failed")?;
    let user = client
        .current_user()
        .await
        .context("Failed to get user info")?;

    Ok(authenticated(client, user))
}

fn authenticated(client: SpotifyClient, user: CurrentUser) -> (Arc<dyn SpotifyRemote>, CurrentUser) {
    println!("Authenticated as: {}", user.display_name.green());
    (Arc::new(client), user)
}

async fn list_playlists(remote: &dyn SpotifyRemote, debug: bool) -> Result<()> {
    let playlists = fetch_all_playlists(remote)
        .await
        .context("Failed to fetch playlists")?;

    if debug {
        print_debug_json("Playlist", &playlists);
    }
    print_playlists(&playlists);
    Ok(())
}

async fn list_devices(remote: &dyn SpotifyRemote, debug: bool) -> Result<()> {
    let devices = remote.devices().await.context("Failed to get devices")?;

    if debug {
        print_debug_json("Device", &devices);
    }
    if devices.is_empty() {
        bail!("No Spotify Connect devices found. Make sure a device is active.");
    }
    print_devices(&devices);
    Ok(())
}

/// In server mode a saved token is optional; without one the user signs in
/// through `/auth`.
async fn run_server(config: &Config, authenticator: Authenticator, store: &TokenStore) -> Result<()> {
    let api_token = config.require_api_access_token()?.to_string();
    let session = Session::new();

    match store.load() {
        Ok(token) => {
            let client = authenticator.restore(token);
            match client.current_user().await {
                Ok(user) => {
                    println!("Authenticated as: {}", user.display_name.green());
                    session.replace(Arc::new(client)).await;
                }
                Err(e) => {
                    warn!("Saved token rejected: {}", e);
                    println!(
                        "{}",
                        "Existing token expired. Visit /auth to re-authenticate.".yellow()
                    );
                }
            }
        }
        Err(e) => {
            debug!("{}", e);
            println!("{}", "No Spotify token found. Visit /auth to authenticate.".yellow());
        }
    }

    let state = AppState::new(PlaybackCommander::new(session), authenticator, api_token);
    server::serve(state, config.port)
        .await
        .context("Failed to start API server")
}
