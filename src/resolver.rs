use std::io::{self, Write};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::spotify::{PlaylistSummary, SpotifyRemote};

/// Page size used when walking the user's playlist library.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

const PLAYLIST_LINK_MARKER: &str = "spotify.com/playlist/";
const BARE_ID_LENGTH: usize = 22;

/// Extract the playlist ID from a share link such as
/// `https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=...`.
/// Anything that is not a playlist link is returned unchanged.
pub fn extract_playlist_id(input: &str) -> &str {
    if !input.contains(PLAYLIST_LINK_MARKER) {
        return input;
    }

    match input.split_once("/playlist/") {
        Some((_, rest)) => rest.split_once('?').map_or(rest, |(id, _)| id),
        None => input,
    }
}

/// Spotify IDs are 22 bytes of base62. Only the byte length and the absence
/// of spaces are checked, so a 22 byte playlist name also passes.
pub fn looks_like_playlist_id(input: &str) -> bool {
    input.len() == BARE_ID_LENGTH && !input.contains(' ')
}

/// Simple Unicode case folding of one character. Characters whose case
/// mapping expands to several characters are left alone.
fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    let (Some(u), None) = (upper.next(), upper.next()) else {
        return c;
    };
    let mut lower = u.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-insensitive comparison under simple case folding, so `Σ`, `σ` and
/// a final `ς` all compare equal.
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars().map(fold_char).eq(b.chars().map(fold_char))
}

/// Walks the current user's playlists one page at a time. A page shorter
/// than the page size is the last one.
struct PlaylistPager<'a> {
    remote: &'a dyn SpotifyRemote,
    offset: u32,
    exhausted: bool,
}

impl<'a> PlaylistPager<'a> {
    fn new(remote: &'a dyn SpotifyRemote) -> Self {
        Self {
            remote,
            offset: 0,
            exhausted: false,
        }
    }

    async fn next_page(&mut self) -> Result<Option<Vec<PlaylistSummary>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .remote
            .playlists_page(PLAYLIST_PAGE_SIZE, self.offset)
            .await
            .map_err(|e| AppError::remote("failed to get playlists", e))?;

        if page.len() < PLAYLIST_PAGE_SIZE as usize {
            self.exhausted = true;
        } else {
            self.offset += PLAYLIST_PAGE_SIZE;
        }

        Ok(Some(page))
    }
}

/// Resolve a playlist link, ID or name to a playlist ID, narrating the
/// name search to `out`.
///
/// Precedence: share link, then anything shaped like an ID, then an exact
/// (case-insensitive) name or ID match in the user's library. When nothing
/// matches, the input is handed back as an ID and Spotify gets the final say.
pub async fn resolve_playlist_id<W: Write + Send>(
    remote: &dyn SpotifyRemote,
    input: &str,
    out: &mut W,
) -> Result<String> {
    if input.contains(PLAYLIST_LINK_MARKER) {
        return Ok(extract_playlist_id(input).to_string());
    }

    if looks_like_playlist_id(input) {
        return Ok(input.to_string());
    }

    writeln!(out, "Searching for playlist: \"{}\"...", input)?;

    let mut pager = PlaylistPager::new(remote);

    while let Some(page) = pager.next_page().await? {
        for playlist in &page {
            if names_match(&playlist.name, input) {
                writeln!(
                    out,
                    "Found playlist: \"{}\" (ID: {})",
                    playlist.name, playlist.id
                )?;
                return Ok(playlist.id.clone());
            }
            if playlist.id == input {
                return Ok(input.to_string());
            }
        }
    }

    writeln!(
        out,
        "No playlist found with name \"{}\", trying as ID...",
        input
    )?;
    debug!("Falling back to treating {:?} as a playlist ID", input);
    Ok(input.to_string())
}

/// Same resolution as [`resolve_playlist_id`] without any narration.
pub async fn resolve_playlist_id_quiet(remote: &dyn SpotifyRemote, input: &str) -> Result<String> {
    resolve_playlist_id(remote, input, &mut io::sink()).await
}

/// Every playlist in the current user's library, in Spotify's order.
pub async fn fetch_all_playlists(remote: &dyn SpotifyRemote) -> Result<Vec<PlaylistSummary>> {
    let mut playlists = Vec::new();
    let mut pager = PlaylistPager::new(remote);

    while let Some(page) = pager.next_page().await? {
        playlists.extend(page);
    }

    debug!("Found {} playlists", playlists.len());
    Ok(playlists)
}
