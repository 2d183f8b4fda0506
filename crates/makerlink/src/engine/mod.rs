mod catalog;
mod device;
mod dialog;
mod dispatch;
#[allow(clippy::module_inception)]
mod engine;
mod error;
mod intent;
mod resolver;
mod session;
mod validate;

pub use catalog::Catalog;
pub use catalog::CatalogError;
pub use device::Device;
pub use device::SYNTHETIC_PREFIX;
pub use dialog::Dialog;
pub use dialog::DialogKey;
pub use dialog::DialogReceiver;
pub use dialog::Speaker;
pub use engine::Engine;
pub use error::Error;
pub use error::Result;
pub use intent::Intent;
pub use resolver::token_sort_ratio;
