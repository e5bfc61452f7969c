use crate::error::{AppError, Result};
use crate::spotify::Device;

/// Outcome of picking a playback target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub device: &'a Device,
    /// Whether the device was chosen because it matched the hint.
    pub matched_hint: bool,
}

/// Pick the device to play on.
///
/// A non-empty hint selects the first device whose name or ID equals it
/// exactly. Without a usable hint the first active device wins, then simply
/// the first device listed.
pub fn select_device<'a>(devices: &'a [Device], hint: &str) -> Result<Selection<'a>> {
    let first = devices
        .first()
        .ok_or_else(|| AppError::NotFound("no Spotify Connect devices found".into()))?;

    if !hint.is_empty() {
        if let Some(device) = devices.iter().find(|d| d.name == hint || d.id == hint) {
            return Ok(Selection {
                device,
                matched_hint: true,
            });
        }
    }

    let device = devices.iter().find(|d| d.is_active).unwrap_or(first);
    Ok(Selection {
        device,
        matched_hint: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_matches_name_even_when_inactive() {
        let devices = vec![
            Device::mock("device1", "Device One", false),
            Device::mock("device2", "Device Two", false),
            Device::mock("device3", "Target Speaker", false),
        ];

        let selection = select_device(&devices, "Target Speaker").unwrap();

        assert_eq!(selection.device.id, "device3");
        assert!(selection.matched_hint);
    }

    #[test]
    fn test_hint_matches_id() {
        let devices = vec![
            Device::mock("device1", "Device One", true),
            Device::mock("device2", "Device Two", false),
        ];

        let selection = select_device(&devices, "device2").unwrap();
        assert_eq!(selection.device.id, "device2");
    }

    #[test]
    fn test_hint_is_case_sensitive() {
        let devices = vec![
            Device::mock("device1", "Kitchen", false),
            Device::mock("device2", "Office", true),
        ];

        let selection = select_device(&devices, "kitchen").unwrap();

        assert_eq!(selection.device.id, "device2");
        assert!(!selection.matched_hint);
    }

    #[test]
    fn test_first_active_without_hint() {
        let devices = vec![
            Device::mock("device1", "Device One", false),
            Device::mock("device2", "Device Two", true),
            Device::mock("device3", "Device Three", true),
        ];

        let selection = select_device(&devices, "").unwrap();
        assert_eq!(selection.device.id, "device2");
    }

    #[test]
    fn test_first_device_when_none_active() {
        let devices = vec![
            Device::mock("device1", "Device One", false),
            Device::mock("device2", "Device Two", false),
        ];

        let selection = select_device(&devices, "").unwrap();
        assert_eq!(selection.device.id, "device1");
    }

    #[test]
    fn test_unknown_hint_falls_back_to_active() {
        let devices = vec![
            Device::mock("device1", "Device One", false),
            Device::mock("device2", "Device Two", true),
        ];

        let selection = select_device(&devices, "Garage").unwrap();

        assert_eq!(selection.device.id, "device2");
        assert!(!selection.matched_hint);
    }

    #[test]
    fn test_empty_list_is_not_found() {
        assert!(matches!(select_device(&[], "anything"), Err(AppError::NotFound(_))));
    }
}
