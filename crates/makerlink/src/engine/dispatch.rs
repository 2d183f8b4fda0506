//! On/off and set-level dispatch.
//!
//! Set-level branches on the kind of device:
//! - thermostats take either a mode name or a numeric setpoint for the mode
//!   they are currently in
//! - anything else needs `setLevel`

use std::collections::BTreeSet;

use tracing::debug;

use super::device::Device;
use super::device::THERMOSTAT;
use super::dialog::Dialog;
use super::dialog::DialogKey;
use super::error::Error;
use super::error::Result;
use super::session::Session;
use super::validate::require_command;
use crate::hub::HubClient;

pub const SET_LEVEL: &str = "setLevel";
pub const SET_THERMOSTAT_MODE: &str = "setThermostatMode";
pub const SET_COOLING_SETPOINT: &str = "setCoolingSetpoint";
pub const SET_HEATING_SETPOINT: &str = "setHeatingSetpoint";

const SUPPORTED_THERMOSTAT_MODES: &str = "supportedThermostatModes";
const THERMOSTAT_MODE: &str = "thermostatMode";

/// Parse a mode list such as `[cool, heat, off]` or `["cool","heat"]`
pub fn parse_mode_list(raw: &str) -> BTreeSet<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|m| m.trim().trim_matches('"').trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

impl<C: HubClient + ?Sized> Session<'_, C> {
    /// Turn a device on or off, confirming unless `silent`
    pub async fn switch(&self, text: &str, command: &str, silent: bool) -> Result<()> {
        debug!("In on/off intent with command {}", command);
        let device = self.resolve_device(text).await?;
        require_command(&device, command)?;
        self.send_command(&device, command, None).await?;
        if !silent {
            self.speaker
                .speak(Dialog::new(DialogKey::Ok).with("device", &device.label));
        }
        Ok(())
    }

    /// Set a level, thermostat mode or setpoint, then resync the catalog
    pub async fn set_level(&self, text: &str, level: &str) -> Result<()> {
        let device = self.resolve_device(text).await?;
        let level = level.trim();

        let dispatched = if device.has_capability(THERMOSTAT) {
            self.set_thermostat(&device, level).await?
        } else if device.has_command(SET_LEVEL) {
            self.set_with(&device, SET_LEVEL, level).await?;
            true
        } else {
            return Err(Error::UnsupportedDevice {
                device: device.label.clone(),
            });
        };

        if dispatched {
            self.resync(&device).await;
        }
        Ok(())
    }

    /// Returns whether a command was sent; a thermostat in a mode without a
    /// setpoint only reports its mode.
    async fn set_thermostat(&self, device: &Device, level: &str) -> Result<bool> {
        let modes = device
            .attribute(SUPPORTED_THERMOSTAT_MODES)
            .map(parse_mode_list)
            .unwrap_or_default();
        debug!("Supported modes for {}: {:?}, level {}", device.label, modes, level);

        if modes.contains(level) {
            require_command(device, SET_THERMOSTAT_MODE)?;
            self.send_command(device, SET_THERMOSTAT_MODE, Some(level))
                .await?;
            self.speaker.speak(
                Dialog::new(DialogKey::ThermostatMode)
                    .with("device", &device.label)
                    .with("level", level),
            );
            return Ok(true);
        }

        if !level.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(Error::InvalidValue {
                device: device.label.clone(),
                value: level.to_string(),
            });
        }

        let mode = device.attribute(THERMOSTAT_MODE).unwrap_or("unknown");
        let command = if mode.contains("cool") {
            SET_COOLING_SETPOINT
        } else if mode.contains("heat") {
            SET_HEATING_SETPOINT
        } else {
            self.speaker.speak(
                Dialog::new(DialogKey::ThermostatCurrentMode)
                    .with("device", &device.label)
                    .with("mode", mode)
                    .with("level", level),
            );
            return Ok(false);
        };

        self.set_with(device, command, level).await?;
        Ok(true)
    }

    async fn set_with(&self, device: &Device, command: &str, level: &str) -> Result<()> {
        require_command(device, command)?;
        self.send_command(device, command, Some(level)).await?;
        self.speaker
            .speak(Dialog::new(DialogKey::Ok).with("device", &device.label));
        Ok(())
    }
}
