//! # serpscout
//!
//! A resilient search result page scraper. The target service rotates its
//! markup, rate-limits aggressively and serves block/CAPTCHA pages instead
//! of results; this library copes by pacing outbound requests, rotating
//! client identities across regional mirrors, detecting block pages with a
//! bounded retry policy, and extracting results through layout-tolerant
//! selector fallback chains.
//!
//! The single entry point is [`Scraper::search`], which never fails: every
//! fault becomes a failure [`SearchResponse`] with a descriptive error.
//! Thin facades (REST in [`server`], tool invocation in [`tools`], plus the
//! CLI binary) all consume that one contract.
//!
//! ## Example
//!
//! ```rust,no_run
//! use serpscout::{Scraper, ScraperConfig, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scraper = Scraper::new(ScraperConfig::default());
//!
//!     let options = SearchOptions::new("rust programming").with_num_results(5);
//!     let response = scraper.search(&options).await;
//!
//!     for result in &response.results {
//!         println!("{}. {} - {}", result.position, result.title, result.url);
//!     }
//!     scraper.close().await;
//! }
//! ```

mod block;
mod error;
mod extract;
mod identity;
mod options;
mod pacing;
mod query;
mod response;
mod search;
mod transport;

pub mod server;
pub mod tools;

pub use block::is_blocked;
pub use error::{Result, ScrapeError};
pub use extract::{extract, normalize_text, unwrap_redirect};
pub use identity::{ClientSignature, Identity, IdentityPool};
pub use options::{DateRange, SearchOptions, MAX_RESULTS, MIN_RESULTS};
pub use pacing::{Pacer, PacingConfig, PacingSnapshot};
pub use query::build_url;
pub use response::{ResultRecord, SearchResponse};
pub use search::{Scraper, ScraperConfig, ScraperStats};
pub use transport::{FetchedPage, HttpTransport, Transport, TransportConfig};
