use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use crate::spotify::{Device, PlaylistSummary};

pub fn print_devices(devices: &[Device]) {
    println!("\n{}", "Available Spotify Connect Devices".cyan().bold());
    println!("{}", "=".repeat(50));

    for (i, device) in devices.iter().enumerate() {
        let status = if device.is_active {
            "● Active".green()
        } else {
            "Inactive".normal()
        };
        println!(
            "{:2}. {} ({}) {}",
            i + 1,
            device.name.bold(),
            device.device_type,
            status
        );
        println!("     {}", device.id.bright_black());
    }

    println!(
        "\n{}",
        format!("Total devices: {}", devices.len()).green().bold()
    );
}

pub fn print_playlists(playlists: &[PlaylistSummary]) {
    println!("\n{}", "Your Spotify Playlists".cyan().bold());
    println!("{}", "=".repeat(50));

    if playlists.is_empty() {
        println!("{}", "No playlists found".yellow());
        return;
    }

    for (i, playlist) in playlists.iter().enumerate() {
        println!(
            "{:2}. {} ({} tracks) by {}",
            i + 1,
            playlist.name.bold(),
            playlist.track_count,
            playlist.owner
        );
        println!("     {}", playlist.id.bright_black());
    }

    println!(
        "\n{}",
        format!("Total playlists: {}", playlists.len()).green().bold()
    );
}

/// Dump raw API data for `--debug`.
pub fn print_debug_json<T: Serialize + ?Sized>(label: &str, data: &T) {
    println!("\n=== Raw {} Data ===", label);
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("Failed to serialize {} data: {}", label, e),
    }
    println!("=== End Raw Data ===");
}
