use serde::Deserialize;
use serde::Serialize;

/// A parsed request from the voice host.
///
/// Text fields hold what the user said, not canonical names; resolution to
/// hub devices and attributes happens in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, strum::IntoStaticStr)]
#[serde(tag = "intent", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// "turn on the kitchen light"
    On {
        device: String,
        /// Present when the user asked for no confirmation ("quietly")
        #[serde(default)]
        how: Option<String>,
    },

    /// "turn off the kitchen light"
    Off {
        device: String,
        #[serde(default)]
        how: Option<String>,
    },

    /// "set the thermostat to 68", "set the dimmer to 40"
    Level {
        device: String,
        #[serde(deserialize_with = "crate::de::scalar")]
        level: String,
    },

    /// "what's the temperature", "what is the level of the dimmer"
    Attribute {
        attr: String,
        #[serde(default)]
        device: Option<String>,
    },

    /// "rescan devices"
    Rescan,

    /// "list devices"
    ListDevices,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
