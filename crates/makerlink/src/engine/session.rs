use tracing::debug;
use tracing::info;
use tracing::warn;

use super::catalog::DeviceCatalog;
use super::device::Device;
use super::dialog::Dialog;
use super::dialog::DialogKey;
use super::dialog::Speaker;
use super::error::Error;
use super::error::Result;
use super::resolver;
use crate::config::HubConfig;
use crate::hub::command_path;
use crate::hub::HubClient;
use crate::hub::HubTransport;

/// Everything one intent needs, borrowed from the engine for its duration.
pub struct Session<'a, C: HubClient + ?Sized> {
    pub config: &'a HubConfig,
    pub transport: &'a HubTransport<C>,
    pub catalog: &'a DeviceCatalog,
    pub speaker: &'a Speaker,
}

impl<C: HubClient + ?Sized> Session<'_, C> {
    /// Resolve spoken text to a device, fetching the catalog on first use
    pub async fn resolve_device(&self, text: &str) -> Result<Device> {
        let catalog = self
            .catalog
            .ensure_retrieved(self.transport, &self.config.app_id)
            .await?;
        let label = resolver::resolve_device(&catalog, text, self.config.min_fuzzy_score)?;
        catalog
            .device_by_label(&label)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound {
                text: text.to_string(),
            })
    }

    pub fn resolve_attribute(&self, text: &str) -> Result<String> {
        resolver::resolve_attribute(
            &self.config.attribute_defaults,
            text,
            self.config.min_fuzzy_score,
        )
    }

    /// Run a command on the hub. Synthetic devices succeed without a request.
    pub async fn send_command(
        &self,
        device: &Device,
        command: &str,
        value: Option<&str>,
    ) -> Result<()> {
        if device.is_synthetic() {
            debug!("Skipping {} on synthetic device {}", command, device.id);
            return Ok(());
        }

        let path = command_path(&self.config.app_id, &device.id, command, value);
        debug!("URL for switching device {}", path);
        // The response body carries nothing we use
        self.transport.get(&path).await?;
        info!("Sent {} {:?} to {} ({})", command, value, device.label, device.id);
        Ok(())
    }

    /// Bring the catalog back in line with the hub after a state change
    pub async fn resync(&self, device: &Device) {
        if device.is_synthetic() {
            return;
        }
        if let Err(e) = self
            .catalog
            .refresh(self.transport, &self.config.app_id)
            .await
        {
            warn!("Refresh after command to {} failed: {}", device.label, e);
        }
    }

    /// Speak an attribute's last known value.
    ///
    /// Without a named device the attribute's configured default device is
    /// used. A named device that does not resolve is reported first, then the
    /// default device answers. Values come from the cached catalog.
    pub async fn query_attribute(&self, attr_text: &str, device_text: Option<&str>) -> Result<()> {
        let attr = self.resolve_attribute(attr_text)?;

        let named = match device_text {
            Some(text) => match self.resolve_device(text).await {
                Ok(device) => Some(device),
                Err(e @ Error::DeviceNotFound { .. }) => {
                    e.log();
                    self.speaker.speak(e.dialog());
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };
        let device = match named {
            Some(device) => device,
            None => {
                let label = self
                    .config
                    .attribute_defaults
                    .default_device(&attr)
                    .ok_or_else(|| Error::AttributeNotFound {
                        text: attr_text.to_string(),
                    })?;
                self.resolve_device(label).await?
            }
        };

        debug!("Found attribute={}, device={}", attr, device.label);
        let dialog = match device.attribute(&attr) {
            Some(value) => Dialog::new(DialogKey::Attribute)
                .with("device", &device.label)
                .with("attr", &attr)
                .with("value", value),
            None => Dialog::new(DialogKey::AttributeNotSupported)
                .with("device", &device.label)
                .with("attr", &attr),
        };
        self.speaker.speak(dialog);
        Ok(())
    }

    /// Refresh the catalog and announce how many hub devices it holds
    pub async fn rescan(&self) -> Result<()> {
        let count = self
            .catalog
            .refresh(self.transport, &self.config.app_id)
            .await?;
        self.speaker
            .speak(Dialog::new(DialogKey::Rescan).with("count", count));
        Ok(())
    }

    /// Announce every hub device, skipping synthetic ones
    pub async fn list_devices(&self) -> Result<()> {
        let catalog = self
            .catalog
            .ensure_retrieved(self.transport, &self.config.app_id)
            .await?;
        for (number, device) in catalog.hub_devices().enumerate() {
            self.speaker.speak(
                Dialog::new(DialogKey::ListDevices)
                    .with("number", number + 1)
                    .with("name", &device.label)
                    .with("id", &device.id),
            );
        }
        Ok(())
    }
}
