use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::device::parse_devices;
use super::device::synthetic_devices;
use super::device::Device;
use super::error::Error;
use super::error::Result;
use crate::hub::devices_path;
use crate::hub::HubClient;
use crate::hub::HubTransport;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Malformed device list from hub: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// In-memory model of the hub's devices.
///
/// Every label maps to an id present in `by_id`. The synthetic test devices
/// are always present, with hub devices overlaid on top of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    by_id: BTreeMap<String, Device>,
    by_label: BTreeMap<String, String>,
    retrieved: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        let mut catalog = Self {
            by_id: BTreeMap::new(),
            by_label: BTreeMap::new(),
            retrieved: false,
        };
        for device in synthetic_devices() {
            catalog.insert(device);
        }
        catalog
    }
}

impl Catalog {
    /// Build a retrieved catalog from a hub device list.
    pub fn from_hub(devices: Vec<Device>) -> Self {
        let mut catalog = Self::default();
        for device in devices {
            catalog.insert(device);
        }
        catalog.retrieved = true;
        catalog
    }

    /// Insert a device; a repeated label or id replaces the earlier entry.
    fn insert(&mut self, device: Device) {
        if let Some(previous) = self.by_id.get(&device.id) {
            if self.by_label.get(&previous.label) == Some(&device.id) {
                self.by_label.remove(&previous.label);
            }
        }
        if let Some(shadowed) = self
            .by_label
            .insert(device.label.clone(), device.id.clone())
        {
            if shadowed != device.id {
                debug!(
                    "Duplicate label {:?}: {} replaces {}",
                    device.label, device.id, shadowed
                );
            }
        }
        self.by_id.insert(device.id.clone(), device);
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.by_id.get(id)
    }

    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.by_label.get(label).map(String::as_str)
    }

    pub fn device_by_label(&self, label: &str) -> Option<&Device> {
        self.id_for_label(label).and_then(|id| self.device(id))
    }

    /// All labels, including synthetic devices, in lexicographic order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_label.keys().map(String::as_str)
    }

    /// Devices that came from the hub, ordered by label
    pub fn hub_devices(&self) -> impl Iterator<Item = &Device> {
        self.by_label
            .values()
            .filter_map(|id| self.by_id.get(id))
            .filter(|d| !d.is_synthetic())
    }

    pub fn hub_device_count(&self) -> usize {
        self.hub_devices().count()
    }

    /// Whether any refresh has succeeded
    pub fn is_retrieved(&self) -> bool {
        self.retrieved
    }
}

/// Holder for the current catalog.
///
/// Readers take a snapshot; a refresh swaps in a whole new catalog, so a
/// partially built one is never visible.
#[derive(Default)]
pub struct DeviceCatalog {
    current: ArcSwap<Catalog>,
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Drop everything learned from the hub
    pub fn reset(&self) {
        self.current.store(Arc::default());
    }

    /// Pull the device list from the hub and replace the catalog.
    ///
    /// Returns the number of hub devices. On any failure the previous
    /// catalog stays in place.
    pub async fn refresh<C: HubClient + ?Sized>(
        &self,
        transport: &HubTransport<C>,
        app_id: &str,
    ) -> Result<usize> {
        let body = transport.get(&devices_path(app_id)).await?;
        let devices = parse_devices(&body).map_err(|e| {
            debug!("Error parsing device list: {}", e);
            CatalogError::Malformed(e)
        })?;

        let catalog = Catalog::from_hub(devices);
        let count = catalog.hub_device_count();
        self.current.store(Arc::new(catalog));

        info!("Catalog refreshed with {} hub devices", count);
        Ok(count)
    }

    /// Return the catalog, refreshing first if it was never retrieved.
    ///
    /// A malformed payload is not fatal here: resolution carries on against
    /// the catalog already held. Transport failures propagate.
    pub async fn ensure_retrieved<C: HubClient + ?Sized>(
        &self,
        transport: &HubTransport<C>,
        app_id: &str,
    ) -> Result<Arc<Catalog>> {
        let current = self.snapshot();
        if current.is_retrieved() {
            return Ok(current);
        }

        match self.refresh(transport, app_id).await {
            Ok(_) => {}
            Err(Error::Catalog(e)) => warn!("Continuing with cached devices: {}", e),
            Err(e) => return Err(e),
        }
        Ok(self.snapshot())
    }
}
