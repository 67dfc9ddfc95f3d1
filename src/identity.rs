//! Outbound identity rotation.
//!
//! Each request presents a client signature (a browser-like header profile)
//! and targets one of several regional mirrors of the same backend. Both are
//! drawn uniformly at random and independently per request, so a retry lands
//! on a different mirror with high probability.

use rand::seq::SliceRandom;

/// Default user-agent strings mimicking common browser/OS combinations.
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/120.0.0.0 Safari/537.36",
];

/// Default regional mirrors of the target service.
const DEFAULT_MIRRORS: &[&str] = &[
    "www.google.com",
    "www.google.es",
    "www.google.co.uk",
    "www.google.ca",
    "www.google.com.au",
    "www.google.de",
    "www.google.fr",
];

/// The identifying headers presented to the target service.
#[derive(Debug, Clone)]
pub struct ClientSignature {
    /// User-agent header value.
    pub user_agent: String,
}

/// One outbound identity: who we claim to be, and which mirror we talk to.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Client signature for this request.
    pub signature: ClientSignature,
    /// Mirror hostname (or full base URL) for this request.
    pub mirror: String,
}

/// Fixed, configurable pool of signatures and mirrors.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    user_agents: Vec<String>,
    mirrors: Vec<String>,
}

impl IdentityPool {
    /// Creates a pool with the default signature and mirror sets.
    pub fn new() -> Self {
        Self {
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            mirrors: DEFAULT_MIRRORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replaces the user-agent set. Empty input keeps the defaults.
    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        if !user_agents.is_empty() {
            self.user_agents = user_agents;
        }
        self
    }

    /// Replaces the mirror set. Empty input keeps the defaults.
    pub fn with_mirrors(mut self, mirrors: Vec<String>) -> Self {
        if !mirrors.is_empty() {
            self.mirrors = mirrors;
        }
        self
    }

    /// Number of configured user agents.
    pub fn user_agent_count(&self) -> usize {
        self.user_agents.len()
    }

    /// Number of configured mirrors.
    pub fn mirror_count(&self) -> usize {
        self.mirrors.len()
    }

    /// Picks a fresh identity, uniformly at random with no stickiness.
    pub fn pick(&self) -> Identity {
        let mut rng = rand::thread_rng();
        // Both sets are guaranteed non-empty by construction.
        let user_agent = self
            .user_agents
            .choose(&mut rng)
            .cloned()
            .unwrap_or_default();
        let mirror = self.mirrors.choose(&mut rng).cloned().unwrap_or_default();
        Identity {
            signature: ClientSignature { user_agent },
            mirror,
        }
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::new()
    }
}
