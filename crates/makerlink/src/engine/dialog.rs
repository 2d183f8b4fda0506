//! Dialog events sent back to the voice host.
//!
//! The engine never returns answers directly; everything the user hears is a
//! dialog key plus named substitution values, spoken by the host.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::Serializer;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

/// Keys of the dialogs the host knows how to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
pub enum DialogKey {
    #[strum(serialize = "ok")]
    Ok,
    #[strum(serialize = "thermostat.mode")]
    ThermostatMode,
    #[strum(serialize = "thermostat.current.mode")]
    ThermostatCurrentMode,
    #[strum(serialize = "attr")]
    Attribute,
    #[strum(serialize = "attr.not.supported")]
    AttributeNotSupported,
    #[strum(serialize = "rescan")]
    Rescan,
    #[strum(serialize = "list.devices")]
    ListDevices,
    #[strum(serialize = "url.backup")]
    UrlBackup,
    #[strum(serialize = "url.error")]
    UrlError,
    #[strum(serialize = "device.not.supported")]
    DeviceNotSupported,
    #[strum(serialize = "command.not.supported")]
    CommandNotSupported,
    #[strum(serialize = "level.not.supported")]
    LevelNotSupported,
    #[strum(serialize = "invalid.value")]
    InvalidValue,
    #[strum(serialize = "catalog.error")]
    CatalogError,
    #[strum(serialize = "not.configured")]
    NotConfigured,
}

fn serialize_key<S: Serializer>(key: &DialogKey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(key.as_ref())
}

/// One thing for the host to say
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    #[serde(serialize_with = "serialize_key")]
    pub key: DialogKey,
    pub data: BTreeMap<String, String>,
    /// Spoken through the host's error dialog path
    pub error: bool,
}

impl Dialog {
    pub fn new(key: DialogKey) -> Self {
        Self {
            key,
            data: BTreeMap::new(),
            error: false,
        }
    }

    pub fn error(key: DialogKey) -> Self {
        Self {
            error: true,
            ..Self::new(key)
        }
    }

    /// Add a substitution value
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.data.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }
}

pub type DialogReceiver = mpsc::UnboundedReceiver<Dialog>;

/// Handle for emitting dialogs, cheap to clone
#[derive(Debug, Clone)]
pub struct Speaker {
    tx: mpsc::UnboundedSender<Dialog>,
}

impl Speaker {
    pub fn channel() -> (Self, DialogReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn speak(&self, dialog: Dialog) {
        debug!("Speaking {} {:?}", dialog.key, dialog.data);
        if let Err(e) = self.tx.send(dialog) {
            warn!("Dropped dialog {}: receiver closed", e.0.key);
        }
    }
}
