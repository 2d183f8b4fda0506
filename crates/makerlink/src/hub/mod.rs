//! Hub maker API access.
//!
//! Paths follow the maker API app layout: every device call is scoped by the
//! app id the hub assigned to this integration.

mod client;
mod transport;

use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;

pub use client::resolve_host;
pub use client::HubClient;
pub use client::ReqwestHubClient;
pub use client::TransportError;
#[cfg(test)]
pub use client::MockHubClient;
pub use transport::HubTransport;
pub use transport::FALLBACK_TIMEOUT;
pub use transport::PRIMARY_TIMEOUT;

/// Path listing every device exposed to the maker app
pub fn devices_path(app_id: &str) -> String {
    format!("/apps/api/{}/devices/all", app_id)
}

/// Characters escaped in a path segment, `/` and `%` included
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path running `command` on a device, with an optional argument.
///
/// The argument is spoken text and is percent-encoded as one segment.
pub fn command_path(app_id: &str, device_id: &str, command: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            "/apps/api/{}/devices/{}/{}/{}",
            app_id,
            device_id,
            command,
            utf8_percent_encode(value, PATH_SEGMENT)
        ),
        None => format!("/apps/api/{}/devices/{}/{}", app_id, device_id, command),
    }
}
