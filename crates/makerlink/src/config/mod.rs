#[allow(clippy::module_inception)]
mod config;
mod settings;

pub use config::*;
pub use settings::AttributeDefaults;
pub use settings::HubConfig;
pub use settings::HubSettings;
pub use settings::TEST_ATTRIBUTE;
