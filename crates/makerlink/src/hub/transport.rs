use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::client::resolve_host;
use super::client::HubClient;
use super::client::TransportError;
use crate::config::HubConfig;
use crate::engine::Dialog;
use crate::engine::DialogKey;
use crate::engine::Speaker;

/// Timeout for a request to the configured hub address
pub const PRIMARY_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the single retry against the fallback host
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// GETs against the hub with one fallback to an alternate hostname.
///
/// There is no retry loop: a request is tried once at the current address
/// and, if the hub could not be reached, once more at the fallback host.
/// A successful fallback lookup becomes the current address for later calls.
pub struct HubTransport<C: HubClient + ?Sized> {
    client: Arc<C>,
    access_token: String,
    address: ArcSwap<IpAddr>,
    fallback_host: String,
    speaker: Speaker,
}

impl<C: HubClient + ?Sized> HubTransport<C> {
    pub fn new(client: Arc<C>, config: &HubConfig, speaker: Speaker) -> Self {
        Self {
            client,
            access_token: config.access_token.clone(),
            address: ArcSwap::from_pointee(config.address),
            fallback_host: config.fallback_host.clone(),
            speaker,
        }
    }

    /// Address requests currently go to
    pub fn address(&self) -> IpAddr {
        **self.address.load()
    }

    /// GET `path` (e.g. `/apps/api/1/devices/all`) and return the response body
    pub async fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = url_for(self.address(), path);
        debug!("GET {}", url);

        let err = match self
            .client
            .get(&url, &self.access_token, PRIMARY_TIMEOUT)
            .await
        {
            Ok(body) => return Ok(body),
            Err(e) if !e.is_connection_failure() => return Err(e),
            Err(e) => e,
        };

        warn!(
            "Hub request failed ({}), falling back to {}",
            err, self.fallback_host
        );
        self.speaker.speak(Dialog::new(DialogKey::UrlBackup));

        let address = resolve_host(self.client.as_ref(), &self.fallback_host)
            .await
            .inspect_err(|e| debug!("Fallback lookup failed: {}", e))?;
        self.address.store(Arc::new(address));
        info!("Fell back to {} which resolved to {}", self.fallback_host, address);

        let url = url_for(address, path);
        debug!("GET {}", url);
        self.client
            .get(&url, &self.access_token, FALLBACK_TIMEOUT)
            .await
            .inspect_err(|e| debug!("Fallback request failed: {}", e))
    }
}

fn url_for(address: IpAddr, path: &str) -> String {
    match address {
        IpAddr::V4(v4) => format!("http://{}{}", v4, path),
        IpAddr::V6(v6) => format!("http://[{}]{}", v6, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DialogReceiver;
    use crate::hub::MockHubClient;
    use crate::testing;

    fn transport(client: &Arc<MockHubClient>) -> (HubTransport<MockHubClient>, DialogReceiver) {
        let (speaker, rx) = Speaker::channel();
        (HubTransport::new(client.clone(), &testing::hub_config(), speaker), rx)
    }

    #[tokio::test]
    async fn test_primary_success() {
        let client = Arc::new(MockHubClient::new());
        client.set_response("/apps/api/42/devices/all", "[]");
        let (transport, mut rx) = transport(&client);

        let body = transport.get("/apps/api/42/devices/all").await.unwrap();
        assert_eq!(body, "[]");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://192.168.1.20/apps/api/42/devices/all");
        assert_eq!(requests[0].access_token, "secret");
        assert_eq!(requests[0].timeout, PRIMARY_TIMEOUT);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fallback_after_primary_failure() {
        let client = Arc::new(MockHubClient::new().with_host("hubitat.local", "192.168.1.99"));
        client.set_unreachable("192.168.1.20");
        client.set_response("/apps/api/42/devices/all", "[]");
        let (transport, mut rx) = transport(&client);

        let body = transport.get("/apps/api/42/devices/all").await.unwrap();
        assert_eq!(body, "[]");

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "http://192.168.1.99/apps/api/42/devices/all");
        assert_eq!(requests[1].timeout, FALLBACK_TIMEOUT);
        assert_eq!(rx.try_recv().unwrap().key, DialogKey::UrlBackup);

        // The fallback address sticks for later requests
        assert_eq!(transport.address(), "192.168.1.99".parse::<IpAddr>().unwrap());
        transport.get("/apps/api/42/devices/all").await.unwrap();
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_terminal() {
        let client = Arc::new(MockHubClient::new().with_host("hubitat.local", "192.168.1.99"));
        client.set_unreachable("192.168.1.20");
        client.set_unreachable("192.168.1.99");
        let (transport, _rx) = transport(&client);

        let err = transport.get("/apps/api/42/devices/all").await.unwrap_err();
        assert!(matches!(err, TransportError::Unreachable { .. }));
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_lookup_failure_is_terminal() {
        let client = Arc::new(MockHubClient::new());
        client.set_unreachable("192.168.1.20");
        let (transport, _rx) = transport(&client);

        let err = transport.get("/apps/api/42/devices/all").await.unwrap_err();
        assert!(matches!(err, TransportError::Lookup { .. }));
        assert_eq!(client.requests().len(), 1);
    }

    #[test]
    fn test_url_for_ipv6() {
        let address: IpAddr = "fe80::1".parse().unwrap();
        assert_eq!(url_for(address, "/x"), "http://[fe80::1]/x");
    }
}
