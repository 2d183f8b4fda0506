pub mod api;
pub mod config;
mod de;
pub mod engine;
pub mod hub;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use config::HubSettings;
pub use config::LogLevel;
pub use engine::Dialog;
pub use engine::DialogKey;
pub use engine::Engine;
pub use engine::Intent;
pub use hub::ReqwestHubClient;
