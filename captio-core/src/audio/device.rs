//! Monitor (loopback) device discovery.
//!
//! System playback is captured through an OS-level "monitor" input — an
//! input device that mirrors the output mix (PulseAudio/PipeWire expose one
//! per sink as `Monitor of …`). Selection policy: the first enumerated
//! input-capable device whose name contains the case-insensitive substring
//! `"monitor"`. No fallback — captioning a microphone instead of playback
//! would be silently wrong, so the absence of a monitor device is a fatal
//! startup error.

use serde::{Deserialize, Serialize};

use crate::error::{CaptioError, Result};

/// Metadata about an audio input device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name reported by the OS.
    pub name: String,
    /// Number of input channels the device offers.
    pub max_input_channels: u16,
    /// Whether the name marks this as a playback monitor.
    pub is_monitor: bool,
}

/// Case-insensitive "monitor" substring match on a device name.
pub fn is_monitor_name(name: &str) -> bool {
    name.trim().to_ascii_lowercase().contains("monitor")
}

/// Index of the first input-capable monitor device, if any.
pub fn first_monitor_index(devices: &[DeviceInfo]) -> Option<usize> {
    devices
        .iter()
        .position(|d| d.max_input_channels > 0 && is_monitor_name(&d.name))
}

/// Apply the selection policy to an enumerated device list.
///
/// # Errors
/// `CaptioError::MonitorDeviceNotFound` when the list (possibly empty)
/// contains no input-capable monitor device.
pub fn select_monitor_device(devices: &[DeviceInfo]) -> Result<usize> {
    first_monitor_index(devices).ok_or(CaptioError::MonitorDeviceNotFound)
}

#[cfg(feature = "audio-cpal")]
fn describe_device(idx: usize, device: &cpal::Device) -> DeviceInfo {
    use cpal::traits::DeviceTrait;

    let name = device
        .name()
        .unwrap_or_else(|_| format!("Input Device {}", idx + 1));
    let max_input_channels = device
        .default_input_config()
        .map(|c| c.channels())
        .unwrap_or(0);
    let is_monitor = is_monitor_name(&name);
    DeviceInfo {
        name,
        max_input_channels,
        is_monitor,
    }
}

/// List all available audio input devices on the system.
///
/// Returns an empty `Vec` if cpal is unavailable or no devices exist.
#[cfg(feature = "audio-cpal")]
pub fn list_input_devices() -> Vec<DeviceInfo> {
    use cpal::traits::HostTrait;

    let host = cpal::default_host();
    match host.input_devices() {
        Ok(devices) => devices
            .enumerate()
            .map(|(idx, device)| describe_device(idx, &device))
            .collect(),
        Err(e) => {
            tracing::warn!("failed to enumerate input devices: {e}");
            vec![]
        }
    }
}

#[cfg(not(feature = "audio-cpal"))]
pub fn list_input_devices() -> Vec<DeviceInfo> {
    vec![]
}

/// Find the first monitor-capable input device.
///
/// Enumeration is described into `DeviceInfo`s and the choice delegated to
/// `select_monitor_device`, so the selection policy exercised by tests is
/// the one used here.
///
/// # Errors
/// `CaptioError::MonitorDeviceNotFound` when no input-capable device name
/// contains "monitor"; `CaptioError::AudioDevice` when enumeration itself
/// fails.
#[cfg(feature = "audio-cpal")]
pub fn find_monitor_device() -> Result<cpal::Device> {
    use cpal::traits::HostTrait;

    let host = cpal::default_host();
    let mut devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| CaptioError::AudioDevice(e.to_string()))?
        .collect();

    let infos: Vec<DeviceInfo> = devices
        .iter()
        .enumerate()
        .map(|(idx, device)| describe_device(idx, device))
        .collect();

    let idx = select_monitor_device(&infos)?;
    tracing::info!(device = infos[idx].name.as_str(), "monitor device selected");
    Ok(devices.swap_remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(name: &str, channels: u16) -> DeviceInfo {
        DeviceInfo {
            name: name.to_string(),
            max_input_channels: channels,
            is_monitor: is_monitor_name(name),
        }
    }

    #[test]
    fn matches_monitor_names_case_insensitively() {
        assert!(is_monitor_name("Monitor of Built-in Audio Analog Stereo"));
        assert!(is_monitor_name("alsa_output.pci-0000.analog-stereo.MONITOR"));
        assert!(!is_monitor_name("Built-in Audio Analog Stereo"));
        assert!(!is_monitor_name("USB Microphone"));
    }

    #[test]
    fn selects_first_monitor_in_enumeration_order() {
        let devices = vec![
            dev("USB Microphone", 1),
            dev("Monitor of Speakers", 2),
            dev("Monitor of Headphones", 2),
        ];
        assert_eq!(first_monitor_index(&devices), Some(1));
    }

    #[test]
    fn skips_monitor_without_input_channels() {
        let devices = vec![dev("Monitor of Speakers", 0), dev("Monitor of HDMI", 2)];
        assert_eq!(first_monitor_index(&devices), Some(1));
    }

    #[test]
    fn no_monitor_device_yields_none() {
        let devices = vec![dev("USB Microphone", 1), dev("Webcam Audio", 1)];
        assert_eq!(first_monitor_index(&devices), None);
    }

    #[test]
    fn selection_without_monitor_fails_with_device_not_found() {
        let devices = vec![dev("USB Microphone", 1), dev("Webcam Audio", 1)];
        assert!(matches!(
            select_monitor_device(&devices),
            Err(CaptioError::MonitorDeviceNotFound)
        ));
    }

    #[test]
    fn selection_on_empty_enumeration_fails_with_device_not_found() {
        assert!(matches!(
            select_monitor_device(&[]),
            Err(CaptioError::MonitorDeviceNotFound)
        ));
    }

    #[test]
    fn selection_picks_first_monitor() {
        let devices = vec![
            dev("USB Microphone", 1),
            dev("Monitor of Speakers", 2),
            dev("Monitor of Headphones", 2),
        ];
        assert_eq!(select_monitor_device(&devices).unwrap(), 1);
    }
}
