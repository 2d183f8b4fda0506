use super::device::Device;
use super::error::Error;
use super::error::Result;

/// Check that `device` accepts `command` before anything is sent.
///
/// Callers try the command right after this passes, so a miss is an error the
/// user hears about, unlike [`Device::has_capability`] which callers branch on.
pub fn require_command(device: &Device, command: &str) -> Result<()> {
    if device.has_command(command) {
        tracing::debug!("{} supports {}", device.label, command);
        return Ok(());
    }
    Err(Error::CommandNotSupported {
        device: device.label.clone(),
        command: command.to_string(),
    })
}
