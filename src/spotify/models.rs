use serde::{Deserialize, Serialize};

/// One entry of the current user's playlist library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub track_count: u32,
}

/// Playlist metadata needed to start playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub track_count: u32,
}

/// A Spotify Connect output device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub device_type: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
}

#[cfg(test)]
impl PlaylistSummary {
    pub fn mock(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            owner: "Test User".to_string(),
            track_count: 50,
        }
    }
}

#[cfg(test)]
impl Device {
    pub fn mock(id: &str, name: &str, is_active: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            device_type: "Speaker".to_string(),
            is_active,
        }
    }
}
