//! Search orchestration.
//!
//! `Scraper` composes the pacer, identity pool, query builder, transport,
//! block classifier and extractor into the single public `search` operation.
//! It never returns an error: every fault becomes a failure `SearchResponse`
//! with a descriptive error string.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::block;
use crate::extract;
use crate::identity::IdentityPool;
use crate::options::SearchOptions;
use crate::pacing::{Pacer, PacingConfig, PacingSnapshot};
use crate::query;
use crate::response::SearchResponse;
use crate::transport::{HttpTransport, Transport, TransportConfig};
use crate::ScrapeError;

/// Scraper tuning knobs.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Maximum fetch attempts per search, counting the first one. The block
    /// retry loop terminates once this is exhausted.
    pub max_attempts: u32,
    /// Pacing parameters.
    pub pacing: PacingConfig,
    /// Transport parameters.
    pub transport: TransportConfig,
    /// Lower bound of the extra delay before a block retry.
    pub block_retry_min: Duration,
    /// Upper bound of the extra delay before a block retry.
    pub block_retry_max: Duration,
    /// Custom user-agent set; empty keeps the defaults.
    pub user_agents: Vec<String>,
    /// Custom mirror set; empty keeps the defaults.
    pub mirrors: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pacing: PacingConfig::default(),
            transport: TransportConfig::default(),
            block_retry_min: Duration::from_secs(3),
            block_retry_max: Duration::from_secs(7),
            user_agents: Vec::new(),
            mirrors: Vec::new(),
        }
    }
}

/// Operational counters exposed by the stats facade.
#[derive(Debug, Clone, Serialize)]
pub struct ScraperStats {
    /// Current pacing state.
    pub pacing: PacingSnapshot,
    /// Whether a live connection pool exists right now.
    pub transport_open: bool,
    /// Number of configured mirrors.
    pub mirror_count: usize,
    /// Number of configured user agents.
    pub user_agent_count: usize,
}

/// The search orchestrator. One instance per process, shared by reference
/// across all facades; construct it at startup and `close` it at shutdown.
pub struct Scraper {
    config: ScraperConfig,
    identities: IdentityPool,
    pacer: Pacer,
    transport: Arc<dyn Transport>,
}

impl Scraper {
    /// Creates a scraper with a pooled HTTP transport.
    pub fn new(config: ScraperConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(config.transport.clone()));
        Self::with_transport(config, transport)
    }

    /// Creates a scraper over a caller-supplied transport.
    pub fn with_transport(config: ScraperConfig, transport: Arc<dyn Transport>) -> Self {
        let identities = IdentityPool::new()
            .with_user_agents(config.user_agents.clone())
            .with_mirrors(config.mirrors.clone());
        let pacer = Pacer::new(config.pacing.clone());
        Self {
            config,
            identities,
            pacer,
            transport,
        }
    }

    /// Performs one paced, identity-rotated search.
    ///
    /// Transport faults and non-success statuses fail without retry; block
    /// pages are retried with a fresh identity up to `max_attempts` times.
    pub async fn search(&self, options: &SearchOptions) -> SearchResponse {
        if options.term.trim().is_empty() {
            return SearchResponse::failure(&options.term, "", "invalid input: term is required");
        }

        self.pacer.wait().await;

        let max_attempts = self.config.max_attempts.max(1);
        let mut mirror = String::new();

        for attempt in 1..=max_attempts {
            let identity = self.identities.pick();
            mirror = identity.mirror.clone();
            let url = query::build_url(&identity.mirror, options);
            info!(
                "searching {:?} on {} (attempt {}/{})",
                options.term, identity.mirror, attempt, max_attempts
            );

            let page = match self.transport.fetch(&url, &identity.signature).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("fetch from {} failed: {}", identity.mirror, e);
                    return SearchResponse::failure(&options.term, identity.mirror, e.to_string());
                }
            };

            if !page.is_success() {
                warn!("{} answered HTTP {}", identity.mirror, page.status);
                return SearchResponse::failure(
                    &options.term,
                    identity.mirror,
                    ScrapeError::Status(page.status).to_string(),
                );
            }

            if block::is_blocked(&page.body) {
                warn!("block signal from {} (attempt {}/{})", identity.mirror, attempt, max_attempts);
                if attempt < max_attempts {
                    tokio::time::sleep(self.block_retry_delay()).await;
                    continue;
                }
                break;
            }

            let mut records = extract::extract(&page.body);
            debug!("extracted {} records from {}", records.len(), identity.mirror);
            records.truncate(options.num_results);
            return SearchResponse::success(&options.term, identity.mirror, records);
        }

        SearchResponse::failure(
            &options.term,
            mirror,
            ScrapeError::Blocked { attempts: max_attempts }.to_string(),
        )
    }

    /// Extra randomized delay applied before a block retry.
    fn block_retry_delay(&self) -> Duration {
        let min = self.config.block_retry_min;
        let max = self.config.block_retry_max;
        if max > min {
            let range = min.as_secs_f64()..max.as_secs_f64();
            Duration::from_secs_f64(rand::thread_rng().gen_range(range))
        } else {
            min
        }
    }

    /// Returns pacing and transport statistics.
    pub async fn stats(&self) -> ScraperStats {
        ScraperStats {
            pacing: self.pacer.snapshot().await,
            transport_open: self.transport.is_open().await,
            mirror_count: self.identities.mirror_count(),
            user_agent_count: self.identities.user_agent_count(),
        }
    }

    /// Closes the transport and zeroes the pacing state. The next search
    /// starts from a fresh pool and counter.
    pub async fn reset(&self) {
        self.transport.close().await;
        self.pacer.reset().await;
        info!("scraper reset");
    }

    /// Tears down pooled connections. Call at process shutdown.
    pub async fn close(&self) {
        self.transport.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FetchedPage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const GOOD_PAGE: &str = r#"<html><body>
        <div class="g"><a href="https://one.example/"><h3>One</h3></a><div class="st">first</div></div>
        <div class="g"><a href="https://two.example/"><h3>Two</h3></a><div class="st">second</div></div>
        <div class="g"><a href="https://three.example/"><h3>Three</h3></a><div class="st">third</div></div>
    </body></html>"#;

    const BLOCK_PAGE: &str =
        "<html><body>Our systems have detected unusual traffic from your computer network.</body></html>";

    enum Reply {
        Page(u16, &'static str),
        Error(&'static str),
    }

    struct FakeTransport {
        replies: Mutex<Vec<Reply>>,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn fetch(
            &self,
            _url: &str,
            _signature: &crate::identity::ClientSignature,
        ) -> crate::Result<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            match replies.remove(0) {
                Reply::Page(status, body) => Ok(FetchedPage {
                    status,
                    body: body.to_string(),
                }),
                Reply::Error(message) => Err(ScrapeError::Other(message.to_string())),
            }
        }
    }

    fn test_config() -> ScraperConfig {
        ScraperConfig {
            pacing: PacingConfig::unthrottled(),
            block_retry_min: Duration::ZERO,
            block_retry_max: Duration::ZERO,
            mirrors: vec!["mirror.test".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_search_success_flow() {
        let transport = FakeTransport::new(vec![Reply::Page(200, GOOD_PAGE)]);
        let scraper = Scraper::with_transport(test_config(), transport.clone());

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(response.success);
        assert_eq!(response.query, "rust");
        assert_eq!(response.source, "mirror.test");
        assert_eq!(response.results_count, 3);
        let positions: Vec<_> = response.results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_truncates_to_requested_count() {
        let transport = FakeTransport::new(vec![Reply::Page(200, GOOD_PAGE)]);
        let scraper = Scraper::with_transport(test_config(), transport);

        let options = SearchOptions::new("rust").with_num_results(2);
        let response = scraper.search(&options).await;
        assert!(response.success);
        assert_eq!(response.results.len(), 2);
        // The count reflects what the caller actually receives, not the
        // pre-truncation extraction total.
        assert_eq!(response.results_count, 2);
        assert_eq!(response.results[0].position, 1);
        assert_eq!(response.results[1].position, 2);
    }

    #[tokio::test]
    async fn test_search_non_success_status_fails_without_retry() {
        let transport = FakeTransport::new(vec![Reply::Page(429, "slow down")]);
        let scraper = Scraper::with_transport(test_config(), transport.clone());

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("HTTP 429"));
        assert!(response.results.is_empty());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_transport_fault_fails_without_retry() {
        let transport = FakeTransport::new(vec![Reply::Error("connection reset by peer")]);
        let scraper = Scraper::with_transport(test_config(), transport.clone());

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("connection reset by peer"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_retries_after_block_then_succeeds() {
        let transport = FakeTransport::new(vec![
            Reply::Page(200, BLOCK_PAGE),
            Reply::Page(200, GOOD_PAGE),
        ]);
        let scraper = Scraper::with_transport(test_config(), transport.clone());

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(response.success);
        assert_eq!(response.results_count, 3);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_search_block_retry_is_bounded() {
        let transport = FakeTransport::new(vec![
            Reply::Page(200, BLOCK_PAGE),
            Reply::Page(200, BLOCK_PAGE),
            Reply::Page(200, BLOCK_PAGE),
        ]);
        let scraper = Scraper::with_transport(test_config(), transport.clone());

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("blocked by target after 3 attempts")
        );
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_search_single_attempt_when_configured() {
        let transport = FakeTransport::new(vec![Reply::Page(200, BLOCK_PAGE)]);
        let config = ScraperConfig {
            max_attempts: 1,
            ..test_config()
        };
        let scraper = Scraper::with_transport(config, transport.clone());

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(!response.success);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_empty_term_never_reaches_transport() {
        let transport = FakeTransport::new(vec![Reply::Page(200, GOOD_PAGE)]);
        let scraper = Scraper::with_transport(test_config(), transport.clone());

        let response = scraper.search(&SearchOptions::new("   ")).await;
        assert!(!response.success);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_stats_and_reset() {
        let transport = FakeTransport::new(vec![Reply::Page(200, GOOD_PAGE)]);
        let scraper = Scraper::with_transport(test_config(), transport);

        scraper.search(&SearchOptions::new("rust")).await;
        let stats = scraper.stats().await;
        assert_eq!(stats.pacing.request_count, 1);
        assert_eq!(stats.mirror_count, 1);
        assert_eq!(stats.user_agent_count, 8);

        scraper.reset().await;
        let stats = scraper.stats().await;
        assert_eq!(stats.pacing.request_count, 0);
        assert!(stats.pacing.last_request.is_none());
    }

    #[tokio::test]
    async fn test_soft_block_extracts_to_empty_success() {
        // An undetected soft block returns a page with no result markup;
        // the call succeeds with zero records.
        let transport = FakeTransport::new(vec![Reply::Page(200, "<html><body></body></html>")]);
        let scraper = Scraper::with_transport(test_config(), transport);

        let response = scraper.search(&SearchOptions::new("rust")).await;
        assert!(response.success);
        assert_eq!(response.results_count, 0);
    }
}
