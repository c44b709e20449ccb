use cpal::traits::{DeviceTrait, HostTrait};
use tracing::debug;

use crate::error::CaptureError;

/// An input-capable device as presented to the user.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Display name; also the identifier used to open the device.
    pub name: String,
    /// Whether this is the host's default input device.
    pub is_default: bool,
}

/// List input-capable devices on the default host.
pub fn list_input_devices() -> Result<Vec<DeviceInfo>, CaptureError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host.input_devices().map_err(|e| {
        CaptureError::DeviceUnavailable(format!("cannot enumerate input devices: {e}"))
    })?;

    let mut infos = Vec::new();
    for device in devices {
        let name = device.name().unwrap_or_else(|_| "unknown device".to_string());
        let is_default = Some(&name) == default_name.as_ref();
        infos.push(DeviceInfo { name, is_default });
    }
    debug!(count = infos.len(), "enumerated input devices");
    Ok(infos)
}

/// Resolve a configured device name to an input device.
///
/// Matches the name as a substring so short configured names like
/// "pipewire" work; `None` resolves to the host default.
pub(super) fn find_input_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
    let host = cpal::default_host();
    match name {
        Some(wanted) => {
            let mut devices = host.input_devices().map_err(|e| {
                CaptureError::DeviceUnavailable(format!("cannot enumerate input devices: {e}"))
            })?;
            devices
                .find(|d| d.name().map(|n| n.contains(wanted)).unwrap_or(false))
                .ok_or_else(|| {
                    CaptureError::DeviceUnavailable(format!(
                        "no input device matching '{wanted}'"
                    ))
                })
        }
        None => host.default_input_device().ok_or_else(|| {
            CaptureError::DeviceUnavailable("no default input device".to_string())
        }),
    }
}
