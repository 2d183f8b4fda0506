//! Hub settings as delivered by the settings collaborator, and their validated form.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ConfigError;
use crate::hub::resolve_host;
use crate::hub::HubClient;

/// Attribute that always resolves, backed by the synthetic `testAttrDev` device.
pub const TEST_ATTRIBUTE: &str = "testattr";
const TEST_ATTRIBUTE_DEVICE: &str = "testAttrDev";

fn default_fallback_host() -> String {
    "hubitat.local".to_string()
}

/// Raw hub settings. Every field is optional until validated into a [`HubConfig`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HubSettings {
    #[serde(default)]
    pub access_token: Option<String>,

    /// Hostname or IP address of the hub on the local network
    #[serde(default)]
    pub local_address: Option<String>,

    #[serde(default)]
    pub minimum_fuzzy_score: Option<i64>,

    #[serde(
        default,
        rename = "hubitat_maker_api_app_id",
        alias = "maker_api_app_id",
        deserialize_with = "crate::de::optional_scalar"
    )]
    pub maker_api_app_id: Option<String>,

    /// Comma separated attribute names, e.g. `"temperature, humidity"`
    #[serde(default)]
    pub attr_name: Option<String>,

    /// Comma separated default device labels, positionally matching `attr_name`
    #[serde(default)]
    pub dev_name: Option<String>,

    /// Hostname tried once when the hub stops answering on `local_address`
    #[serde(default = "default_fallback_host")]
    pub fallback_host: String,
}

/// Attribute name → label of the device queried when none is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefaults {
    entries: BTreeMap<String, String>,
}

impl AttributeDefaults {
    /// Build the table from the two CSV settings.
    ///
    /// Quotes are dropped and entries trimmed. Lists of different lengths are
    /// rejected rather than truncated.
    pub fn from_csv(attributes: &str, devices: &str) -> Result<Self, ConfigError> {
        let attributes = split_csv(attributes);
        let devices = split_csv(devices);

        if attributes.len() != devices.len() {
            return Err(ConfigError::AttributeDefaultsMismatch {
                attributes: attributes.len(),
                devices: devices.len(),
            });
        }

        let mut entries: BTreeMap<String, String> = attributes.into_iter().zip(devices).collect();
        entries.insert(TEST_ATTRIBUTE.to_string(), TEST_ATTRIBUTE_DEVICE.to_string());

        Ok(Self { entries })
    }

    /// Attribute names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn default_device(&self, attribute: &str) -> Option<&str> {
        self.entries.get(attribute).map(String::as_str)
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.replace(['"', '\''], "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A complete, validated hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub access_token: String,

    /// Resolved address of the hub
    pub address: IpAddr,

    /// Fuzzy match scores must be strictly greater than this to be accepted
    pub min_fuzzy_score: u8,

    pub app_id: String,

    pub attribute_defaults: AttributeDefaults,

    pub fallback_host: String,
}

impl HubConfig {
    /// Validate settings and resolve the hub address.
    ///
    /// Fails if any field is missing or blank, if the score is outside 0–100,
    /// if the attribute lists disagree in length, or if the address does not
    /// resolve.
    pub async fn resolve<C: HubClient + ?Sized>(
        settings: &HubSettings,
        client: &C,
    ) -> Result<Self, ConfigError> {
        let access_token = required(&settings.access_token, "access_token")?;
        let local_address = required(&settings.local_address, "local_address")?;
        let score = settings
            .minimum_fuzzy_score
            .ok_or(ConfigError::MissingSetting("minimum_fuzzy_score"))?;
        let min_fuzzy_score = u8::try_from(score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or(ConfigError::InvalidScore(score))?;
        let app_id = required(&settings.maker_api_app_id, "hubitat_maker_api_app_id")?;
        let attribute_defaults = AttributeDefaults::from_csv(
            required(&settings.attr_name, "attr_name")?,
            required(&settings.dev_name, "dev_name")?,
        )?;

        let address = resolve_host(client, local_address).await.map_err(|e| {
            ConfigError::InvalidAddress {
                address: local_address.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(
            "Validated hub settings: address={}, fuzzy={}, app_id={}, attributes={:?}",
            address, min_fuzzy_score, app_id, attribute_defaults
        );

        Ok(Self {
            access_token: access_token.to_string(),
            address,
            min_fuzzy_score,
            app_id: app_id.to_string(),
            attribute_defaults,
            fallback_host: settings.fallback_host.clone(),
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingSetting(name))
}
