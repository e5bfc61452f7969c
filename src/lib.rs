pub mod config;
pub mod display;
pub mod error;
pub mod player;
pub mod resolver;
pub mod server;
pub mod session;
pub mod spotify;

pub use config::Config;
pub use error::{AppError, Result};
pub use player::{PlaybackCommander, PlaybackRequest};
pub use resolver::{resolve_playlist_id, resolve_playlist_id_quiet};
pub use session::Session;
pub use spotify::{Authenticator, SpotifyClient, SpotifyRemote, TokenStore};
