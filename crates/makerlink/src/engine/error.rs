//! Errors that end an intent, and the dialog each one is spoken as.

use tracing::debug;
use tracing::warn;

use super::catalog::CatalogError;
use super::dialog::Dialog;
use super::dialog::DialogKey;
use crate::hub::TransportError;

/// Errors that can occur while handling an intent
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Hub settings are missing or invalid
    #[error("Hub settings are not configured")]
    NotConfigured,

    /// No catalog label scored above the minimum
    #[error("No device matches {text:?}")]
    DeviceNotFound { text: String },

    /// No configured attribute scored above the minimum
    #[error("No attribute matches {text:?}")]
    AttributeNotFound { text: String },

    #[error("Device {device} does not support command {command}")]
    CommandNotSupported { device: String, command: String },

    /// The device has no command that can take a level
    #[error("Device {device} cannot be set to a level")]
    UnsupportedDevice { device: String },

    #[error("{value:?} is not a valid value for {device}")]
    InvalidValue { device: String, value: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// The error dialog that explains this failure to the user
    pub fn dialog(&self) -> Dialog {
        match self {
            Error::NotConfigured => Dialog::error(DialogKey::NotConfigured),
            Error::DeviceNotFound { text } => {
                Dialog::error(DialogKey::DeviceNotSupported).with("device", text)
            }
            Error::AttributeNotFound { text } => Dialog::error(DialogKey::AttributeNotSupported)
                .with("device", "any device in settings")
                .with("attr", text),
            Error::CommandNotSupported { device, command } => {
                Dialog::error(DialogKey::CommandNotSupported)
                    .with("device", device)
                    .with("command", command)
            }
            Error::UnsupportedDevice { device } => {
                Dialog::error(DialogKey::LevelNotSupported).with("device", device)
            }
            Error::InvalidValue { device, value } => Dialog::error(DialogKey::InvalidValue)
                .with("device", device)
                .with("level", value),
            Error::Catalog(_) => Dialog::error(DialogKey::CatalogError),
            Error::Transport(_) => Dialog::error(DialogKey::UrlError),
        }
    }

    /// Log at a level matching who is at fault: user misses at debug, hub trouble at warn
    pub fn log(&self) {
        match self {
            Error::Catalog(_) | Error::Transport(_) => warn!("Intent failed: {}", self),
            _ => debug!("Intent failed: {}", self),
        }
    }
}
