use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;

/// Ids with this prefix are synthetic devices that never reach the hub.
pub const SYNTHETIC_PREFIX: &str = "**test";

pub const THERMOSTAT: &str = "Thermostat";

/// A snapshot of one hub device.
///
/// Devices are never patched; a catalog refresh replaces all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    /// Human-readable name, the key for fuzzy matching
    pub label: String,
    pub commands: BTreeSet<String>,
    pub capabilities: BTreeSet<String>,
    /// Current attribute values rendered as text
    pub attributes: BTreeMap<String, String>,
}

impl Device {
    pub fn has_command(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with(SYNTHETIC_PREFIX)
    }
}

fn synthetic(label: &str, commands: &[&str], attributes: &[(&str, &str)]) -> Device {
    Device {
        id: format!("**{}", label),
        label: label.to_string(),
        commands: commands.iter().map(|c| c.to_string()).collect(),
        capabilities: BTreeSet::new(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// Devices present in every catalog, for exercising resolution and dispatch
/// without a hub.
pub fn synthetic_devices() -> Vec<Device> {
    vec![
        synthetic("testOnDev", &["on"], &[]),
        synthetic("testOnOffDev", &["on", "off"], &[]),
        synthetic("testLevelDev", &["on", "off", "setLevel"], &[]),
        synthetic("testAttrDev", &[], &[("testattr", "99")]),
    ]
}

/// Command entry: `{"command": "on", "type": [...]}` or a bare `"on"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HubCommand {
    Named { command: String },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct HubAttribute {
    name: String,
    #[serde(rename = "currentValue", default)]
    current_value: serde_json::Value,
}

/// Attributes arrive as a list of `{name, currentValue}` from the device
/// endpoints and as a flat object from some firmware's `devices/all`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HubAttributes {
    List(Vec<HubAttribute>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl Default for HubAttributes {
    fn default() -> Self {
        HubAttributes::List(Vec::new())
    }
}

/// Device object as returned by `GET /apps/api/{app}/devices/all`
#[derive(Debug, Deserialize)]
struct HubDevice {
    #[serde(deserialize_with = "crate::de::scalar")]
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    commands: Vec<HubCommand>,
    /// Mostly capability names; some firmware mixes in attribute descriptor objects
    #[serde(default)]
    capabilities: Vec<serde_json::Value>,
    #[serde(default)]
    attributes: HubAttributes,
}

/// Render an attribute value as text; `null` means the attribute has no value.
fn render_value(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<HubDevice> for Device {
    fn from(hub: HubDevice) -> Self {
        let label = hub
            .label
            .filter(|l| !l.is_empty())
            .or(hub.name)
            .unwrap_or_else(|| hub.id.clone());

        let commands = hub
            .commands
            .into_iter()
            .map(|c| match c {
                HubCommand::Named { command } => command,
                HubCommand::Plain(command) => command,
            })
            .collect();

        let capabilities = hub
            .capabilities
            .into_iter()
            .filter_map(|c| match c {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect();

        let attributes = match hub.attributes {
            HubAttributes::List(list) => list
                .into_iter()
                .filter_map(|a| render_value(a.current_value).map(|v| (a.name, v)))
                .collect(),
            HubAttributes::Map(map) => map
                .into_iter()
                .filter_map(|(k, v)| render_value(v).map(|v| (k, v)))
                .collect(),
        };

        Device {
            id: hub.id,
            label,
            commands,
            capabilities,
            attributes,
        }
    }
}

/// Parse a `devices/all` response body.
pub fn parse_devices(body: &str) -> Result<Vec<Device>, serde_json::Error> {
    let devices: Vec<HubDevice> = serde_json::from_str(body)?;
    Ok(devices.into_iter().map(Device::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_list_format() {
        let body = r#"[{
            "id": "12",
            "name": "Generic Zigbee Thermostat",
            "label": "Hallway Thermostat",
            "type": "Generic Zigbee Thermostat",
            "capabilities": ["Thermostat", "TemperatureMeasurement", {"attributes": [{"name": "temperature"}]}],
            "attributes": [
                {"name": "supportedThermostatModes", "currentValue": "[cool, heat, off]", "dataType": "JSON_OBJECT"},
                {"name": "temperature", "currentValue": 71.5, "dataType": "NUMBER"},
                {"name": "humidity", "currentValue": null, "dataType": "NUMBER"}
            ],
            "commands": [{"command": "setCoolingSetpoint", "type": ["NUMBER"]}, {"command": "off"}]
        }]"#;

        let devices = parse_devices(body).unwrap();
        assert_eq!(devices.len(), 1);

        let d = &devices[0];
        assert_eq!(d.id, "12");
        assert_eq!(d.label, "Hallway Thermostat");
        assert!(d.has_capability(THERMOSTAT));
        assert_eq!(d.capabilities.len(), 2);
        assert!(d.has_command("setCoolingSetpoint"));
        assert!(d.has_command("off"));
        assert_eq!(d.attribute("supportedThermostatModes"), Some("[cool, heat, off]"));
        assert_eq!(d.attribute("temperature"), Some("71.5"));
        assert_eq!(d.attribute("humidity"), None);
        assert!(!d.is_synthetic());
    }

    #[test]
    fn test_parse_flat_attributes_and_plain_commands() {
        let body = r#"[{
            "id": 5,
            "label": "",
            "name": "Living Room Light",
            "attributes": {"switch": "off", "level": 40},
            "commands": ["on", "off"]
        }]"#;

        let devices = parse_devices(body).unwrap();
        let d = &devices[0];
        assert_eq!(d.id, "5");
        assert_eq!(d.label, "Living Room Light");
        assert_eq!(d.attribute("switch"), Some("off"));
        assert_eq!(d.attribute("level"), Some("40"));
        assert!(d.has_command("on"));
        assert!(d.capabilities.is_empty());
    }

    #[test]
    fn test_parse_malformed_payloads() {
        assert!(parse_devices("<html>Unauthorized</html>").is_err());
        assert!(parse_devices(r#"{"id": "1"}"#).is_err());
        assert!(parse_devices(r#"[{"label": "no id"}]"#).is_err());
        assert_eq!(parse_devices("[]").unwrap(), Vec::new());
    }

    #[test]
    fn test_synthetic_devices() {
        let devices = synthetic_devices();
        assert_eq!(devices.len(), 4);
        assert!(devices.iter().all(Device::is_synthetic));

        let level = devices.iter().find(|d| d.label == "testLevelDev").unwrap();
        assert_eq!(level.id, "**testLevelDev");
        assert!(level.has_command("setLevel"));

        let attr = devices.iter().find(|d| d.label == "testAttrDev").unwrap();
        assert_eq!(attr.attribute("testattr"), Some("99"));
    }
}
