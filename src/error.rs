//! Error types for the scraper library.

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors that can occur while fetching and extracting results.
///
/// The orchestrator converts every variant into a failure `SearchResponse`;
/// these only cross a public boundary at the facades (validation and tool
/// dispatch errors).
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Target answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// Target served a block/CAPTCHA page on every attempt.
    #[error("blocked by target after {attempts} attempts")]
    Blocked {
        /// Number of fetch attempts made before giving up.
        attempts: u32,
    },

    /// Malformed caller input, rejected before reaching the core.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tool facade received an unknown operation name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// JSON (de)serialization failed at a facade boundary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}
