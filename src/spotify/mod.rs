pub mod auth;
pub mod client;
pub mod models;
pub mod remote;
pub mod token;

pub use auth::{Authenticator, CallbackParams};
pub use client::SpotifyClient;
pub use models::{CurrentUser, Device, PlaylistDetails, PlaylistSummary};
pub use remote::SpotifyRemote;
pub use token::TokenStore;
