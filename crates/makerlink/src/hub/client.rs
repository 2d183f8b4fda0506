use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Errors talking to the hub over HTTP
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request never got an answer (refused, timed out, no route)
    #[error("Request to {url} failed: {message}")]
    Unreachable { url: String, message: String },

    /// The hub answered with a non-success status
    #[error("Hub answered {url} with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to resolve {host}: {message}")]
    Lookup { host: String, message: String },
}

impl TransportError {
    /// Whether the failure means the hub could not be reached at that address.
    ///
    /// Only these failures justify trying the fallback host.
    pub fn is_connection_failure(&self) -> bool {
        !matches!(self, TransportError::Status { .. })
    }
}

/// Trait for hub HTTP operations
///
/// This trait allows for mocking the hub for testing purposes
#[async_trait]
pub trait HubClient: Send + Sync {
    /// GET `url` with the access token as a query parameter and return the body
    async fn get(
        &self,
        url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<String, TransportError>;

    /// Resolve a hostname to an address
    async fn lookup(&self, host: &str) -> Result<IpAddr, TransportError>;
}

/// Resolve `host`, short-circuiting literal IP addresses.
pub async fn resolve_host<C: HubClient + ?Sized>(
    client: &C,
    host: &str,
) -> Result<IpAddr, TransportError> {
    if let Ok(address) = host.parse::<IpAddr>() {
        return Ok(address);
    }
    let address = client.lookup(host).await?;
    debug!("Resolved {} to {}", host, address);
    Ok(address)
}

/// Real hub client implementation using reqwest
pub struct ReqwestHubClient {
    http: reqwest::Client,
}

impl ReqwestHubClient {
    pub fn new() -> anyhow::Result<Self> {
        // Per-request timeouts are applied in get(); the hub is plain HTTP on the LAN
        let http = reqwest::Client::builder()
            .user_agent(concat!("makerlink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HubClient for ReqwestHubClient {
    async fn get(
        &self,
        url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let response = self
            .http
            .get(url)
            .query(&[("access_token", access_token)])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| TransportError::Unreachable {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn lookup(&self, host: &str) -> Result<IpAddr, TransportError> {
        let lookup_error = |message: String| TransportError::Lookup {
            host: host.to_string(),
            message,
        };

        let addresses: Vec<IpAddr> = tokio::net::lookup_host((host, 80))
            .await
            .map_err(|e| lookup_error(e.to_string()))?
            .map(|a| a.ip())
            .collect();

        // The hub only listens on IPv4 in practice
        addresses
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addresses.first())
            .copied()
            .ok_or_else(|| lookup_error("no addresses returned".to_string()))
    }
}

/// A request recorded by [`MockHubClient`]
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    pub url: String,
    pub access_token: String,
    pub timeout: Duration,
}

/// Mock hub client for testing
///
/// Serves canned bodies by path, fails every request to an unreachable host,
/// and records everything it was asked for.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockHubClient {
    responses: std::sync::Mutex<std::collections::HashMap<String, String>>,
    unreachable: std::sync::Mutex<std::collections::HashSet<String>>,
    hosts: std::collections::HashMap<String, IpAddr>,
    requests: std::sync::Mutex<Vec<MockRequest>>,
}

#[cfg(test)]
impl MockHubClient {
    /// Create a new mock hub client
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `host` resolvable to `address`
    pub fn with_host(mut self, host: &str, address: &str) -> Self {
        self.hosts
            .insert(host.to_string(), address.parse().unwrap());
        self
    }

    /// Serve `body` for GETs of `path` on any reachable host
    pub fn set_response(&self, path: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), body.to_string());
    }

    /// Fail every request to `host`
    pub fn set_unreachable(&self, host: &str) {
        self.unreachable.lock().unwrap().insert(host.to_string());
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requested URLs, in order
    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[cfg(test)]
#[async_trait]
impl HubClient for MockHubClient {
    async fn get(
        &self,
        url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(MockRequest {
            url: url.to_string(),
            access_token: access_token.to_string(),
            timeout,
        });

        let rest = url.strip_prefix("http://").unwrap_or(url);
        let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));

        if self.unreachable.lock().unwrap().contains(host) {
            return Err(TransportError::Unreachable {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    async fn lookup(&self, host: &str) -> Result<IpAddr, TransportError> {
        self.hosts
            .get(host)
            .copied()
            .ok_or_else(|| TransportError::Lookup {
                host: host.to_string(),
                message: "unknown host".to_string(),
            })
    }
}
