//! Search response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single extracted search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Result title, normalized and non-empty.
    pub title: String,
    /// Destination URL; always starts with an HTTP(S) scheme.
    pub url: String,
    /// Descriptive snippet; may be empty when no layout variant matched.
    pub snippet: String,
    /// Free-text date as it appeared on the page; may be empty.
    pub date: String,
    /// 1-based rank within the response, strictly increasing with no gaps.
    pub position: u32,
}

/// Outcome of one search call.
///
/// Invariant: a failure carries no results; a success carries at most the
/// requested count, with positions `1..=len` in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Whether the search produced a usable result page.
    pub success: bool,
    /// The search term as given by the caller.
    pub query: String,
    /// Number of results returned.
    pub results_count: usize,
    /// Extracted results in page order.
    pub results: Vec<ResultRecord>,
    /// Completion time of the call.
    pub timestamp: DateTime<Utc>,
    /// Mirror hostname the response was fetched from (empty on failures
    /// that never reached a mirror).
    pub source: String,
    /// Error description when `success` is false.
    pub error: Option<String>,
}

impl SearchResponse {
    /// Builds a success response from extracted results.
    pub fn success(query: impl Into<String>, source: impl Into<String>, results: Vec<ResultRecord>) -> Self {
        Self {
            success: true,
            query: query.into(),
            results_count: results.len(),
            results,
            timestamp: Utc::now(),
            source: source.into(),
            error: None,
        }
    }

    /// Builds a failure response with an error description and no results.
    pub fn failure(query: impl Into<String>, source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.into(),
            results_count: 0,
            results: Vec::new(),
            timestamp: Utc::now(),
            source: source.into(),
            error: Some(error.into()),
        }
    }
}
