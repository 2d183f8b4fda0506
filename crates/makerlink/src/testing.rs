//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::config::AttributeDefaults;
use crate::config::HubConfig;
use crate::config::HubSettings;
use crate::engine::Engine;
use crate::hub::MockHubClient;

/// `devices/all` body for a small house: a switch, a thermostat in cool mode
/// and a dimmer.
pub const HUB_DEVICES: &str = r#"[
    {
        "id": "5",
        "name": "Generic Zigbee Switch",
        "label": "Living Room Light",
        "capabilities": ["Switch", "Refresh"],
        "attributes": [
            {"name": "switch", "currentValue": "off", "dataType": "ENUM"}
        ],
        "commands": [{"command": "on"}, {"command": "off"}, {"command": "refresh"}]
    },
    {
        "id": "12",
        "name": "Generic Zigbee Thermostat",
        "label": "Hallway Thermostat",
        "capabilities": ["Thermostat", "TemperatureMeasurement"],
        "attributes": [
            {"name": "supportedThermostatModes", "currentValue": "[cool, heat, off]", "dataType": "JSON_OBJECT"},
            {"name": "thermostatMode", "currentValue": "cool", "dataType": "ENUM"},
            {"name": "temperature", "currentValue": 71.5, "dataType": "NUMBER"}
        ],
        "commands": [
            {"command": "setThermostatMode", "type": ["ENUM"]},
            {"command": "setCoolingSetpoint", "type": ["NUMBER"]},
            {"command": "setHeatingSetpoint", "type": ["NUMBER"]}
        ]
    },
    {
        "id": "7",
        "name": "Generic Zigbee Dimmer",
        "label": "Kitchen Dimmer",
        "capabilities": ["Switch", "SwitchLevel"],
        "attributes": [
            {"name": "level", "currentValue": 40, "dataType": "NUMBER"},
            {"name": "switch", "currentValue": "on", "dataType": "ENUM"}
        ],
        "commands": [{"command": "on"}, {"command": "off"}, {"command": "setLevel", "type": ["NUMBER"]}]
    }
]"#;

pub fn settings() -> HubSettings {
    HubSettings {
        access_token: Some("secret".to_string()),
        local_address: Some("192.168.1.20".to_string()),
        minimum_fuzzy_score: Some(70),
        maker_api_app_id: Some("42".to_string()),
        attr_name: Some("temperature".to_string()),
        dev_name: Some("Hallway Thermostat".to_string()),
        fallback_host: "hubitat.local".to_string(),
    }
}

pub fn hub_config() -> HubConfig {
    HubConfig {
        access_token: "secret".to_string(),
        address: "192.168.1.20".parse().unwrap(),
        min_fuzzy_score: 70,
        app_id: "42".to_string(),
        attribute_defaults: AttributeDefaults::from_csv("temperature", "Hallway Thermostat")
            .unwrap(),
        fallback_host: "hubitat.local".to_string(),
    }
}

/// An engine configured with [`settings`], talking to a mock hub that serves
/// [`HUB_DEVICES`] and resolves `hubitat.local` to 192.168.1.99.
pub async fn configured_engine() -> (Engine<MockHubClient>, Arc<MockHubClient>) {
    let client = Arc::new(MockHubClient::new().with_host("hubitat.local", "192.168.1.99"));
    client.set_response("/apps/api/42/devices/all", HUB_DEVICES);

    let engine = Engine::new(client.clone());
    engine.apply_config(&settings()).await.unwrap();
    (engine, client)
}
