use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::info;
use tracing::warn;

use super::catalog::Catalog;
use super::catalog::DeviceCatalog;
use super::dialog::Dialog;
use super::dialog::DialogReceiver;
use super::dialog::Speaker;
use super::error::Error;
use super::error::Result;
use super::intent::Intent;
use super::session::Session;
use crate::config::ConfigError;
use crate::config::HubConfig;
use crate::config::HubSettings;
use crate::hub::HubClient;
use crate::hub::HubTransport;

/// A validated configuration and the transport built from it
struct Hub<C: HubClient> {
    config: HubConfig,
    transport: HubTransport<C>,
}

/// makerlink engine
///
/// Resolves intents against the device catalog, dispatches commands to the
/// hub, and collects the dialogs each intent produces.
pub struct Engine<C: HubClient> {
    client: Arc<C>,

    /// Current hub configuration; `None` until valid settings are applied
    hub: ArcSwapOption<Hub<C>>,

    catalog: DeviceCatalog,

    speaker: Speaker,

    /// Dialogs spoken during the current intent. Holding this lock is what
    /// serializes intents: one runs to completion before the next starts.
    dialogs: Mutex<DialogReceiver>,
}

impl<C: HubClient> Engine<C> {
    /// Create an unconfigured engine
    pub fn new(client: Arc<C>) -> Self {
        let (speaker, dialogs) = Speaker::channel();
        Self {
            client,
            hub: ArcSwapOption::empty(),
            catalog: DeviceCatalog::new(),
            speaker,
            dialogs: Mutex::new(dialogs),
        }
    }

    /// Replace the hub configuration.
    ///
    /// Invalid settings leave the engine unconfigured until a valid snapshot
    /// arrives. Either way the device catalog starts over.
    pub async fn apply_config(&self, settings: &HubSettings) -> Result<(), ConfigError> {
        let _guard = self.dialogs.lock().await;
        self.catalog.reset();

        match HubConfig::resolve(settings, self.client.as_ref()).await {
            Ok(config) => {
                info!(
                    "Hub configured: address={}, app_id={}, fuzzy={}",
                    config.address, config.app_id, config.min_fuzzy_score
                );
                let transport =
                    HubTransport::new(self.client.clone(), &config, self.speaker.clone());
                self.hub.store(Some(Arc::new(Hub { config, transport })));
                Ok(())
            }
            Err(e) => {
                warn!("Rejected hub settings: {}", e);
                self.hub.store(None);
                Err(e)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.hub.load().is_some()
    }

    /// Snapshot of the device catalog
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    /// Handle one intent and return everything it wants spoken, in order.
    pub async fn handle_intent(&self, intent: Intent) -> Vec<Dialog> {
        let mut dialogs = self.dialogs.lock().await;
        info!("Handling {} intent", intent.name());

        if let Err(e) = self.run(intent).await {
            e.log();
            self.speaker.speak(e.dialog());
        }

        let mut spoken = Vec::new();
        while let Ok(dialog) = dialogs.try_recv() {
            spoken.push(dialog);
        }
        spoken
    }

    async fn run(&self, intent: Intent) -> Result<()> {
        let Some(hub) = self.hub.load_full() else {
            return Err(Error::NotConfigured);
        };
        let session = Session {
            config: &hub.config,
            transport: &hub.transport,
            catalog: &self.catalog,
            speaker: &self.speaker,
        };

        match intent {
            Intent::On { device, how } => session.switch(&device, "on", how.is_some()).await,
            Intent::Off { device, how } => session.switch(&device, "off", how.is_some()).await,
            Intent::Level { device, level } => session.set_level(&device, &level).await,
            Intent::Attribute { attr, device } => {
                session.query_attribute(&attr, device.as_deref()).await
            }
            Intent::Rescan => session.rescan().await,
            Intent::ListDevices => session.list_devices().await,
        }
    }
}
