//! Pooled HTTP transport with an explicit lifecycle.
//!
//! One `HttpTransport` exists per process. The underlying reqwest client is
//! built lazily on first use, can be torn down at any time with `close`, and
//! is rebuilt on the next fetch. In-flight requests hold their own clone of
//! the client, so a close racing an active request cannot crash it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, USER_AGENT};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;

use crate::identity::ClientSignature;
use crate::Result;

/// Transport tuning knobs.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum idle pooled connections kept per host.
    pub max_idle_per_host: usize,
    /// Total per-request timeout.
    pub timeout: Duration,
    /// Connect-phase timeout, shorter than the total.
    pub connect_timeout: Duration,
    /// Whether to verify the target's TLS certificate.
    ///
    /// Off by default: the target rotates regional frontends with
    /// occasionally mismatched certificates, and a failed handshake here
    /// only costs us a scrape, not anything sensitive. Turn this on when
    /// routing through infrastructure you do not control.
    pub verify_tls: bool,
    /// Whether to resolve hostnames through the caching hickory resolver.
    ///
    /// On by default. Mirror lookups are cached for the lifetime of the
    /// connection pool, bounded by each record's TTL, so repeated searches
    /// do not re-resolve the same handful of hostnames.
    pub dns_cache: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 20,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            verify_tls: false,
            dns_cache: true,
        }
    }
}

/// A fetched page: HTTP status plus the raw body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchedPage {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the orchestrator and the network.
///
/// The production implementation is `HttpTransport`; tests inject fakes
/// that serve canned bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the URL, presenting the given client signature.
    async fn fetch(&self, url: &str, signature: &ClientSignature) -> Result<FetchedPage>;

    /// Tears down pooled connections. No-op by default.
    async fn close(&self) {}

    /// Whether a live connection pool currently exists.
    async fn is_open(&self) -> bool {
        true
    }
}

/// Production transport backed by a pooled reqwest client.
pub struct HttpTransport {
    config: TransportConfig,
    client: RwLock<Option<Client>>,
}

impl HttpTransport {
    /// Creates a transport; the connection pool is built on first use.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
        }
    }

    /// Returns the pooled client, building it if absent.
    async fn client(&self) -> Result<Client> {
        {
            let guard = self.client.read().await;
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }

        let mut guard = self.client.write().await;
        // Another caller may have won the race while we waited for the lock.
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        debug!("building connection pool (verify_tls: {})", self.config.verify_tls);
        let client = Client::builder()
            .pool_max_idle_per_host(self.config.max_idle_per_host)
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connect_timeout)
            .danger_accept_invalid_certs(!self.config.verify_tls)
            .hickory_dns(self.config.dns_cache)
            .build()?;
        *guard = Some(client.clone());
        Ok(client)
    }

    /// Builds the browser-like header profile for one request.
    fn headers(signature: &ClientSignature) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&signature.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,es;q=0.8"),
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("none"),
        );
        headers
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, signature: &ClientSignature) -> Result<FetchedPage> {
        let client = self.client().await?;
        let response = client
            .get(url)
            .headers(Self::headers(signature))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }

    async fn close(&self) {
        let mut guard = self.client.write().await;
        if guard.take().is_some() {
            debug!("connection pool closed");
        }
    }

    async fn is_open(&self) -> bool {
        self.client.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_is_lazy() {
        let transport = HttpTransport::new(TransportConfig::default());
        assert!(!transport.is_open().await);
    }

    #[tokio::test]
    async fn test_client_build_opens_pool() {
        let transport = HttpTransport::new(TransportConfig::default());
        transport.client().await.unwrap();
        assert!(transport.is_open().await);
    }

    #[tokio::test]
    async fn test_close_drops_pool() {
        let transport = HttpTransport::new(TransportConfig::default());
        transport.client().await.unwrap();
        transport.close().await;
        assert!(!transport.is_open().await);
    }

    #[tokio::test]
    async fn test_pool_recreated_after_close() {
        let transport = HttpTransport::new(TransportConfig::default());
        transport.client().await.unwrap();
        transport.close().await;
        transport.client().await.unwrap();
        assert!(transport.is_open().await);
    }

    #[test]
    fn test_headers_carry_signature() {
        let signature = ClientSignature {
            user_agent: "test-agent/1.0".to_string(),
        };
        let headers = HttpTransport::headers(&signature);
        assert_eq!(headers.get(USER_AGENT).unwrap(), "test-agent/1.0");
        assert!(headers.get(ACCEPT).is_some());
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "navigate");
    }

    #[test]
    fn test_fetched_page_success_range() {
        let page = FetchedPage { status: 200, body: String::new() };
        assert!(page.is_success());
        let page = FetchedPage { status: 299, body: String::new() };
        assert!(page.is_success());
        let page = FetchedPage { status: 301, body: String::new() };
        assert!(!page.is_success());
        let page = FetchedPage { status: 429, body: String::new() };
        assert!(!page.is_success());
    }

    #[test]
    fn test_transport_config_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.max_idle_per_host, 20);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(!config.verify_tls);
        assert!(config.dns_cache);
    }

    #[tokio::test]
    async fn test_pool_builds_without_dns_cache() {
        let config = TransportConfig {
            dns_cache: false,
            ..TransportConfig::default()
        };
        let transport = HttpTransport::new(config);
        transport.client().await.unwrap();
        assert!(transport.is_open().await);
    }
}
